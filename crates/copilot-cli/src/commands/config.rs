use anyhow::Result;
use colored::Colorize;
use copilot_core::platform::Platform;
use copilot_infrastructure::{ConfigService, CopilotPaths};

/// `init`: writes a default `config.toml` unless one exists.
pub fn init(paths: &CopilotPaths) -> Result<()> {
    let service = ConfigService::new(paths)?;
    if service.ensure_default_file()? {
        println!(
            "{}",
            format!("Wrote {}", service.path().display()).bright_green()
        );
    } else {
        println!(
            "{}",
            format!("{} already exists", service.path().display()).bright_black()
        );
    }
    Ok(())
}

/// The configured default platform, or `None` when the config cannot be read.
pub fn default_platform(paths: &CopilotPaths) -> Option<Platform> {
    match ConfigService::new(paths).and_then(|service| service.get_config()) {
        Ok(config) => Some(config.default_platform),
        Err(e) => {
            tracing::warn!("Ignoring config: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_default_platform() {
        let dir = TempDir::new().unwrap();
        let paths = CopilotPaths::new(Some(dir.path()));

        init(&paths).unwrap();
        assert!(dir.path().join("config.toml").exists());
        assert_eq!(default_platform(&paths), Some(Platform::default()));

        // second run leaves the file alone
        std::fs::write(dir.path().join("config.toml"), "default_platform = \"Etsy API\"\n").unwrap();
        init(&paths).unwrap();
        assert_eq!(default_platform(&paths), Some(Platform::Etsy));
    }
}
