use anyhow::Result;
use clap::{Parser, Subcommand};
use copilot_application::{CopilotApp, SessionOverrides};
use copilot_core::platform::Platform;
use copilot_infrastructure::{CopilotPaths, FileCredentialStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Integration Co-pilot - generate Python and Node.js integration code with Gemini", long_about = None)]
struct Cli {
    /// Directory holding config.toml, secret.json and stored credentials
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Platform the generated code targets
        #[arg(long)]
        platform: Option<Platform>,
        /// Model probed before the fallback list
        #[arg(long)]
        model: Option<String>,
        /// Gemini API key (overrides secret.json and the environment)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Validate a Gemini API key with a one-word generation
    CheckKey {
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Print the raw model metadata response for a key
    DebugKey {
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Write a default config.toml if none exists
    Init,
    /// List supported platforms and their credential fields
    Platforms,
    /// Store a platform credential field
    SetCredential {
        platform: Platform,
        field: String,
        value: String,
    },
    /// Remove a stored platform credential field
    ClearCredential { platform: Platform, field: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = CopilotPaths::new(cli.config_dir.as_deref());

    match cli.command {
        Commands::Init => commands::config::init(&paths)?,
        Commands::Platforms => commands::credentials::list_platforms(
            &FileCredentialStore::new(&paths)?,
            commands::config::default_platform(&paths),
        ),
        Commands::SetCredential {
            platform,
            field,
            value,
        } => commands::credentials::set(&FileCredentialStore::new(&paths)?, platform, &field, &value)?,
        Commands::ClearCredential { platform, field } => {
            commands::credentials::clear(&FileCredentialStore::new(&paths)?, platform, &field)?
        }
        Commands::Chat {
            platform,
            model,
            api_key,
        } => {
            let app = CopilotApp::bootstrap(cli.config_dir.as_deref())?;
            let overrides = SessionOverrides {
                platform,
                model,
                api_key,
            };
            commands::chat::run(&app, overrides).await?
        }
        Commands::CheckKey { api_key } => {
            let app = CopilotApp::bootstrap(cli.config_dir.as_deref())?;
            commands::key::check(&app, api_key.as_deref()).await?
        }
        Commands::DebugKey { api_key } => {
            let app = CopilotApp::bootstrap(cli.config_dir.as_deref())?;
            commands::key::debug(&app, api_key.as_deref()).await?
        }
    }

    Ok(())
}
