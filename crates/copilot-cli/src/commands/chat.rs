use std::borrow::Cow::{self, Borrowed, Owned};
use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;
use copilot_application::{CopilotApp, SessionError, SessionOverrides, SubmitOutcome};
use copilot_core::backend::ModelId;
use copilot_core::credentials::{mask_key, sanitize_key};
use copilot_core::platform::{Platform, ResourceType};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use strum::IntoEnumIterator;

use crate::render;

/// Example prompts shown on startup and by `/help`.
const INITIAL_SUGGESTIONS: &[&str] = &[
    "Generate Shopify code for fetching products",
    "Create Node.js code for ShipStation",
    "Explain OAuth 2.0 simply",
    "Python boilerplate for Stripe API",
];

const COMMANDS: &[&str] = &["/new", "/platform", "/model", "/key", "/help", "/quit"];

/// rustyline helper: completes slash commands and platform names.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
    platforms: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
            platforms: Platform::all().map(|p| p.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if let Some(partial) = line.strip_prefix("/platform ") {
            let partial = partial.to_ascii_lowercase();
            let candidates = self
                .platforms
                .iter()
                .filter(|name| name.to_ascii_lowercase().starts_with(&partial))
                .map(|name| Pair {
                    display: name.clone(),
                    replacement: name.clone(),
                })
                .collect();
            return Ok(("/platform ".len(), candidates));
        }

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// A parsed REPL line.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Message(&'a str),
    New,
    Platform(Option<&'a str>),
    Model(Option<&'a str>),
    Key(Option<&'a str>),
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Input::Message(trimmed);
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };
    match command {
        "/new" => Input::New,
        "/platform" => Input::Platform(Some(rest).filter(|r| !r.is_empty())),
        "/model" => Input::Model(Some(rest).filter(|r| !r.is_empty())),
        "/key" => Input::Key(Some(rest).filter(|r| !r.is_empty())),
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        other => Input::Unknown(other),
    }
}

/// Suggestions for the current platform, followed by the general examples.
fn suggestions(platform: Platform) -> Vec<String> {
    ResourceType::iter()
        .map(|resource| {
            format!(
                "Generate {platform} code for fetching {}",
                resource.to_string().to_lowercase()
            )
        })
        .chain(INITIAL_SUGGESTIONS.iter().map(|s| s.to_string()))
        .collect()
}

fn print_help(platform: Platform) {
    println!("{}", "Commands:".bright_yellow());
    println!("  {}  start a new conversation", "/new".bright_cyan());
    println!("  {}  show or switch the target platform", "/platform [name]".bright_cyan());
    println!("  {}  show or pin the model ('default' unpins)", "/model [name]".bright_cyan());
    println!("  {}  use this API key; no value goes back to secret.json/env", "/key [value]".bright_cyan());
    println!("  {}  show this help", "/help".bright_cyan());
    println!("  {}  exit", "/quit".bright_cyan());
    println!("{}", "Try asking:".bright_yellow());
    for suggestion in suggestions(platform) {
        println!("  {}", format!("- {suggestion}").bright_black());
    }
    println!();
}

pub async fn run(app: &CopilotApp, overrides: SessionOverrides) -> Result<()> {
    let session = app.new_session(overrides);

    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Integration Co-pilot ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Platform: {}. Type '/help' for commands, '/quit' to exit.",
            session.platform().await
        )
        .bright_black()
    );
    println!();
    for turn in session.turns().await {
        render::print_turn(&turn);
    }
    for suggestion in INITIAL_SUGGESTIONS {
        println!("{}", format!("- {suggestion}").bright_black());
    }
    println!();

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let input = parse_input(&line);
                if !matches!(input, Input::Key(_)) {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match input {
                    Input::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Input::Help => print_help(session.platform().await),
                    Input::New => {
                        session.reset().await;
                        println!("{}", "Started a new conversation.".bright_green());
                        for turn in session.turns().await {
                            render::print_turn(&turn);
                        }
                    }
                    Input::Platform(None) => {
                        println!("Current platform: {}", session.platform().await.to_string().bold());
                        let names: Vec<String> = Platform::all().map(|p| p.to_string()).collect();
                        println!("{}", format!("Available: {}", names.join(", ")).bright_black());
                    }
                    Input::Platform(Some(name)) => match Platform::from_str(name) {
                        Ok(platform) => {
                            session.set_platform(platform).await;
                            // stored credentials may have changed since startup
                            session.set_credentials(app.load_credentials()).await;
                            println!("{}", format!("Platform set to {platform}.").bright_green());
                        }
                        Err(_) => {
                            println!("{}", format!("Unknown platform: {name}").yellow());
                        }
                    },
                    Input::Model(None) => match session.preferred_model().await {
                        Some(model) => println!("Pinned model: {}", model.to_string().bold()),
                        None => println!(
                            "{}",
                            "No model pinned; using the resolved fallback model.".bright_black()
                        ),
                    },
                    Input::Model(Some(name)) => {
                        if name.eq_ignore_ascii_case("default") {
                            session.set_preferred_model(None).await;
                            println!("{}", "Model unpinned.".bright_green());
                        } else {
                            session.set_preferred_model(Some(ModelId::from(name))).await;
                            println!("{}", format!("Model pinned to {name}.").bright_green());
                        }
                    }
                    Input::Key(value) => match value.and_then(sanitize_key) {
                        Some(key) => {
                            println!("{}", format!("Using API key {}.", mask_key(&key)).bright_green());
                            session.set_api_key(Some(key)).await;
                        }
                        None => {
                            session.set_api_key(None).await;
                            println!(
                                "{}",
                                "Session key cleared; using secret.json or the environment.".bright_green()
                            );
                        }
                    },
                    Input::Unknown(command) => {
                        println!("{}", format!("Unknown command: {command}").bright_black());
                    }
                    Input::Message(text) => {
                        println!("{}", format!("> {text}").green());
                        match session.submit(text).await {
                            Ok(SubmitOutcome::Replied(turn)) => render::print_turn(&turn),
                            Ok(SubmitOutcome::Failed { turn, error }) => {
                                render::print_turn(&turn);
                                if error.is_retryable() {
                                    println!("{}", "Resubmit the message to retry.".bright_black());
                                }
                            }
                            Ok(SubmitOutcome::Discarded) => {}
                            Err(SessionError::Busy) => {
                                println!("{}", "Still working on the previous request.".yellow());
                            }
                            Err(SessionError::EmptyPrompt) => {}
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
