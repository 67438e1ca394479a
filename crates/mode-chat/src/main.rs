//! mode-chat
//!
//! Single-conversation terminal front end for the flight desk. Drives one
//! `ModeSession` through `submit_turn` and `change_mode`.

mod args;
mod commands;
mod console;

use std::io::Write as _;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flight_desk::MockInventory;
use mode_core::{AgentConfig, LlmProvider, ModeAgent, ModeError, ModeSession, ModelConfig, Presentation};
use mode_runtime::OllamaProvider;

use crate::args::Args;
use crate::commands::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    // Initialize LLM provider
    let provider = Arc::new(OllamaProvider::from_env());

    // Verify Ollama connection
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!(url = %provider.config().url(), "✓ Connected to Ollama");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - turns will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    let mut model = ModelConfig::new(&args.model);
    if let Some(temperature) = args.temperature {
        model = model.with_temperature(temperature);
    }

    let registry = flight_desk::registry(Arc::new(MockInventory::new()), &model)?;
    for id in registry.ids() {
        tracing::info!("  • mode {}", id);
    }

    let mut config = AgentConfig::from_env();
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }

    let agent = ModeAgent::builder()
        .registry(registry)
        .provider(provider)
        .config(config)
        .build()?;

    let mut session = agent.start_session(&args.mode, args.arguments.clone())?;
    println!("Connected to the flight desk ({}). Type /help for commands.", session.current_mode());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&session)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(commands::ParseError::Empty) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            Command::Say(text) => {
                let outcome = agent.submit_turn(&mut session, text).await;
                report(outcome, args.json);
            }
            Command::Mode { target, arguments } => {
                let outcome = agent.change_mode(&mut session, &target, arguments).await;
                report(outcome, args.json);
            }
            Command::Modes => {
                for id in agent.registry().ids() {
                    let marker = if id == session.current_mode() { "*" } else { " " };
                    let description = agent
                        .registry()
                        .resolve(id.as_str())
                        .map(|d| d.description().to_string())
                        .unwrap_or_default();
                    println!("{marker} {:<12} {description}", id.as_str());
                }
            }
            Command::History => {
                for (index, message) in session.conversation().iter().enumerate() {
                    println!("{}", console::history_line(index, message));
                }
            }
            Command::Help => println!("{}", commands::HELP),
            Command::Quit => break,
        }
    }

    session.end();
    tracing::info!(
        session = %session.id(),
        turns = session.presentation().len(),
        transitions = session.transitions().len(),
        seconds = session.duration().num_seconds(),
        "Session ended"
    );
    Ok(())
}

fn prompt(session: &ModeSession) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}> ", session.current_mode())?;
    stdout.flush()
}

fn report(outcome: mode_core::Result<Presentation>, json: bool) {
    match outcome {
        Ok(presentation) if json => match serde_json::to_string_pretty(&presentation) {
            Ok(raw) => println!("{raw}"),
            Err(e) => println!("{}", ModeError::from(e).user_message()),
        },
        Ok(presentation) => println!("{}", console::render(&presentation)),
        Err(e) => {
            tracing::debug!(error = %e, "Turn failed");
            println!("{}", e.user_message());
            if e.is_retryable() {
                println!("(nothing was changed; you can send that again)");
            }
        }
    }
}
