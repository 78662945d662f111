//! `sessions` and `sync`.

use crate::app::App;
use crate::render;
use anyhow::Result;
use juris_core::JurisError;

pub async fn list(app: &App) -> Result<()> {
    app.conversation.load_cached().await?;
    render::session_list(&app.conversation.snapshot().await);
    Ok(())
}

pub async fn sync(app: &App) -> Result<()> {
    app.conversation.load_cached().await?;

    match app.conversation.reconcile().await {
        Ok(report) => {
            render::info(&format!(
                "{} created, {} retained, {} dropped",
                report.created.len(),
                report.retained.len(),
                report.dropped.len()
            ));
            render::session_list(&app.conversation.snapshot().await);
            Ok(())
        }
        Err(e) => {
            report_sync_failure(&e);
            Err(e.into())
        }
    }
}

/// Prints what a failed reconciliation means for the user.
pub fn report_sync_failure(error: &JurisError) {
    if error.is_auth_failure() {
        render::error("Your sign-in has expired. Run `juris login` again.");
    } else {
        render::warn(&format!(
            "Could not reach the document directory; showing cached sessions. ({})",
            error
        ));
    }
}
