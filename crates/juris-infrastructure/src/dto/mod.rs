//! On-disk representations.
//!
//! DTOs decouple the file layout from the domain model. Each file carries a
//! top-level `version` key and is read through a `version_migrate::Migrator`,
//! so a future layout gets a migration step instead of being misread.

mod credential;
mod session;

pub use credential::{CREDENTIAL_ENTITY, CredentialV1_0_0, create_credential_migrator};
pub use session::{
    MessageDto, SESSION_CACHE_ENTITY, SessionCacheV1_0_0, SessionDto, SessionKindDto,
    create_session_cache_migrator,
};

use juris_core::error::{JurisError, Result};

/// Converts the flat JSON written by `Migrator::save_domain_flat` into a TOML document.
///
/// TOML has no null, so null members of a table are dropped; a null anywhere
/// else cannot be represented.
pub(crate) fn flat_json_to_toml(json_str: &str) -> Result<toml::Value> {
    let json: serde_json::Value = serde_json::from_str(json_str)?;
    json_to_toml(&json)
}

fn json_to_toml(json: &serde_json::Value) -> Result<toml::Value> {
    match json {
        serde_json::Value::Null => Err(JurisError::serialization("TOML", "null outside a table")),
        serde_json::Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(JurisError::serialization("TOML", format!("Unsupported JSON number: {}", n)))
            }
        }
        serde_json::Value::String(s) => Ok(toml::Value::String(s.clone())),
        serde_json::Value::Array(arr) => {
            let toml_arr: Result<Vec<toml::Value>> = arr.iter().map(json_to_toml).collect();
            Ok(toml::Value::Array(toml_arr?))
        }
        serde_json::Value::Object(obj) => {
            let mut toml_map = toml::map::Map::new();
            for (k, v) in obj.iter().filter(|(_, v)| !v.is_null()) {
                toml_map.insert(k.clone(), json_to_toml(v)?);
            }
            Ok(toml::Value::Table(toml_map))
        }
    }
}
