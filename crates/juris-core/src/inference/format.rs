//! Turns an inference payload into the text of an agent message.

use serde_json::Value;
use std::fmt::Write as _;

/// Agent reply used whenever the inference call fails.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I encountered an issue processing your request. Please try again.";

/// Formats a structured inference payload.
///
/// Layout:
///
/// ```text
/// Decision: <decision>
/// Amount: <amount>
///
/// Justification:
///   1. Clause: <clause>
///      Reason: <reason>
/// ```
///
/// Without a non-empty justification list the decision lines are replaced by
/// `Error: ...` (plus `Raw Output: ...`) when the payload carries an error, or
/// else by the pretty-printed payload, so the user never gets a blank reply.
pub fn format_inference_response(payload: &Value) -> String {
    let Some(fields) = payload.as_object() else {
        return pretty(payload);
    };

    let mut out = String::new();

    if let Some(decision) = fields.get("decision").filter(|v| is_truthy(v)) {
        let _ = writeln!(out, "Decision: {}", display_value(decision));
    }

    if let Some(amount) = fields.get("amount").filter(|v| !v.is_null()) {
        let _ = writeln!(out, "Amount: {}", display_value(amount));
    }

    match fields.get("justification").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => {
            out.push_str("\nJustification:\n");
            for (index, item) in items.iter().enumerate() {
                let _ = writeln!(out, "  {}. Clause: {}", index + 1, field_text(item, "clause"));
                let _ = writeln!(out, "     Reason: {}", field_text(item, "reason"));
            }
        }
        _ => {
            if let Some(error) = fields.get("error").filter(|v| is_truthy(v)) {
                out = format!("Error: {}\n", display_value(error));
                if let Some(raw) = fields.get("raw_output").filter(|v| is_truthy(v)) {
                    let _ = writeln!(out, "Raw Output: {}", display_value(raw));
                }
            } else {
                out = pretty(payload);
            }
        }
    }

    out
}

fn pretty(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

fn field_text(item: &Value, key: &str) -> String {
    item.get(key).map(display_value).unwrap_or_default()
}

/// Renders scalars bare (`approved`, `50000`) and everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
