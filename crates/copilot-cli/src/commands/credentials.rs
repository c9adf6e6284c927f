//! Credential editing works from the credential file alone, so a broken
//! `config.toml` never blocks it.

use anyhow::Result;
use colored::Colorize;
use copilot_core::platform::Platform;
use copilot_infrastructure::FileCredentialStore;

use crate::render::mask_secret;

/// `platforms`: every platform with its fields and what is stored for them.
pub fn list_platforms(store: &FileCredentialStore, default_platform: Option<Platform>) {
    let stored = store.load().unwrap_or_else(|e| {
        eprintln!("{}", format!("Ignoring stored credentials: {e:#}").yellow());
        Default::default()
    });

    for platform in Platform::all() {
        let marker = if Some(platform) == default_platform {
            " (default)"
        } else {
            ""
        };
        println!("{}{}", platform.to_string().bright_magenta().bold(), marker);

        for spec in platform.fields() {
            let value = match stored.get(platform, spec.id).filter(|v| !v.is_empty()) {
                Some(value) if spec.secret => mask_secret(value).green().to_string(),
                Some(value) => value.green().to_string(),
                None if spec.required => "<missing>".yellow().to_string(),
                None => "-".bright_black().to_string(),
            };
            let hint = spec
                .placeholder
                .map(|p| format!(" e.g. {p}"))
                .unwrap_or_default();
            println!(
                "  {:<18} {:<20} {}{}",
                spec.id,
                spec.label,
                value,
                hint.bright_black()
            );
        }

        let missing = stored.missing_required(platform);
        if !missing.is_empty() && !stored.for_platform(platform).is_empty() {
            println!("  {}", format!("missing required: {}", missing.join(", ")).yellow());
        }
        println!();
    }
}

/// `set-credential`
pub fn set(store: &FileCredentialStore, platform: Platform, field: &str, value: &str) -> Result<()> {
    store.set_field(platform, field, value)?;
    println!(
        "{}",
        format!("Saved {platform}:{field} to {}", store.path().display()).bright_green()
    );
    Ok(())
}

/// `clear-credential`
pub fn clear(store: &FileCredentialStore, platform: Platform, field: &str) -> Result<()> {
    if store.clear_field(platform, field)? {
        println!("{}", format!("Removed {platform}:{field}").bright_green());
    } else {
        println!("{}", format!("Nothing stored for {platform}:{field}").bright_black());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::default_platform;
    use copilot_infrastructure::CopilotPaths;
    use tempfile::TempDir;

    #[test]
    fn test_editing_works_with_malformed_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[gemini\nmodels = 3").unwrap();
        let paths = CopilotPaths::new(Some(dir.path()));
        let store = FileCredentialStore::new(&paths).unwrap();

        set(&store, Platform::Stripe, "secretKey", "sk_test_1").unwrap();
        assert_eq!(
            store.load().unwrap().get(Platform::Stripe, "secretKey"),
            Some("sk_test_1")
        );
        assert_eq!(default_platform(&paths), None);

        clear(&store, Platform::Stripe, "secretKey").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_set_rejects_unknown_field() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(&CopilotPaths::new(Some(dir.path()))).unwrap();
        let err = set(&store, Platform::Etsy, "password", "x").unwrap_err();
        assert!(err.to_string().contains("Unknown field 'password'"));
    }
}
