use anyhow::{Context, Result, bail};
use colored::Colorize;
use copilot_application::CopilotApp;
use copilot_interaction::debug_api_key;

/// `check-key`: exits non-zero when the key is rejected.
pub async fn check(app: &CopilotApp, api_key: Option<&str>) -> Result<()> {
    let result = app.check_key(api_key).await;
    if result.ok {
        println!("{}", result.message.bright_green());
        Ok(())
    } else {
        bail!(result.message)
    }
}

/// `debug-key`: prints `{ ok, status, body }` as pretty JSON.
pub async fn debug(app: &CopilotApp, api_key: Option<&str>) -> Result<()> {
    let key = app.effective_api_key(api_key).await.unwrap_or_default();
    if key.is_empty() {
        println!("{}", "No key provided; the request is sent without one.".yellow());
    }

    let raw = debug_api_key(app.resolver(), &key).await;
    let json = serde_json::to_string_pretty(&raw).context("Failed to render diagnostic response")?;
    println!("{json}");
    Ok(())
}
