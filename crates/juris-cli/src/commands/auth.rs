//! `login` and `logout`.

use crate::app::App;
use crate::render;
use anyhow::{Result, bail};
use colored::Colorize;

pub async fn login(app: &App, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            let mut rl = rustyline::DefaultEditor::new()?;
            rl.readline("Paste token: ")?
        }
    };

    match app.auth.sign_in(&token).await {
        Ok(profile) => {
            println!(
                "{}",
                format!("Signed in as {} <{}>", profile.name, profile.email).bright_green()
            );
            Ok(())
        }
        Err(e) if e.is_auth_failure() => bail!("That token was not accepted: {}", e),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(app: &App) -> Result<()> {
    app.auth.sign_out().await?;
    render::info("Signed out.");
    Ok(())
}
