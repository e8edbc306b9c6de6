//! Glossa - from natural language to code.
//!
//! Thin terminal front-end: reads user input, renders session events, and
//! collects decisions for pending interrupts. All orchestration lives in
//! glossa-core.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use glossa_core::agents::build_workflow;
use glossa_core::ai::{HttpTransport, ModelConfig, ModelGateway, ProviderId};
use glossa_core::config::{config_dir, ApiConfig, AppConfig};
use glossa_core::interrupt::{HumanDecision, Interrupt};
use glossa_core::net::HttpProbe;
use glossa_core::session::{ExecutionSession, SessionEvent, SessionInput};
use glossa_core::storage::SqliteCheckpointStore;

#[derive(Parser)]
#[command(name = "glossa", about = "Build software by describing it", version)]
struct Cli {
    /// Working directory for generated files (default: current directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Session id to resume (default: a fresh session)
    #[arg(long)]
    session: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Store API credentials for a provider
    Configure {
        /// Provider: anthropic, openai, or google_genai
        provider: String,
        /// Model id to use with this provider
        model: String,
        /// API key
        api_key: String,
        /// Optional base URL override
        #[arg(long)]
        base_url: Option<String>,
    },
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    let log_dir = config_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("glossa.log"))?;

    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

fn parse_provider(name: &str) -> anyhow::Result<ProviderId> {
    ProviderId::all()
        .iter()
        .copied()
        .find(|p| p.storage_key() == name.to_lowercase())
        .with_context(|| {
            let known: Vec<_> = ProviderId::all().iter().map(|p| p.storage_key()).collect();
            format!("unknown provider '{name}'; known providers: {}", known.join(", "))
        })
}

fn configure(provider: &str, model: &str, api_key: &str, base_url: Option<String>) -> anyhow::Result<()> {
    let provider = parse_provider(provider)?;
    let mut config = ApiConfig::load_default()?;

    let mut entry = ModelConfig::new(provider, model, api_key);
    entry.base_url = base_url;
    config.set_entry(entry)?;

    println!("Stored credentials for {provider}.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Configure {
        provider,
        model,
        api_key,
        base_url,
    }) = cli.command
    {
        init_logging(false)?;
        return configure(&provider, &model, &api_key, base_url);
    }

    let working_dir = match cli.dir {
        Some(dir) => dir.canonicalize().context("working directory not found")?,
        None => std::env::current_dir()?,
    };

    let app = AppConfig::load(&config_dir()?, &working_dir);
    init_logging(app.debug())?;

    let api = ApiConfig::load_default()?;
    if !api.is_configured() {
        eprintln!("No model configured. Add one first, e.g.:");
        for (provider, models) in api.not_configured() {
            eprintln!(
                "  glossa configure {} {} <api-key>",
                provider.storage_key(),
                models[0]
            );
        }
        bail!("no API credentials configured");
    }

    let thread_id = cli
        .session
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::info!(session = %thread_id, dir = %working_dir.display(), "session started");

    let gateway = Arc::new(ModelGateway::new(Arc::new(HttpTransport::new())));
    gateway.set_active(api.entries().to_vec())?;

    let checkpoints = Arc::new(SqliteCheckpointStore::open(
        &config_dir()?.join("checkpoints.db"),
    )?);

    let session = ExecutionSession::new(
        build_workflow()?,
        gateway,
        Arc::new(HttpProbe::new()),
        checkpoints,
        working_dir,
        thread_id.clone(),
    );

    println!("Glossa - from natural language to code.");
    println!("Session {thread_id}. Type 'exit' to quit.\n");

    loop {
        let pending = session.pending_interrupt();
        let prompt = match &pending {
            Some(interrupt) => format!(
                "[{}] ({})> ",
                interrupt.call.name,
                interrupt.policy.allowed_names().join("/")
            ),
            None => "you> ".to_string(),
        };

        let Some(line) = read_line(&prompt).await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let input = match &pending {
            Some(interrupt) => match parse_decision(&line, interrupt) {
                Ok(decision) => SessionInput::Resume(decision),
                Err(message) => {
                    eprintln!("{message}");
                    continue;
                }
            },
            None => SessionInput::User(line),
        };

        match session.start_or_resume(input) {
            Ok(events) => render_events(events).await,
            Err(err) => eprintln!("{err}"),
        }
    }

    Ok(())
}

async fn read_line(prompt: &str) -> anyhow::Result<Option<String>> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        print!("{prompt}");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line)),
            Err(e) => Err(e.into()),
        }
    })
    .await?
}

fn parse_decision(line: &str, interrupt: &Interrupt) -> Result<HumanDecision, String> {
    let (verb, rest) = match line.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let decision = match verb {
        "a" | "accept" => HumanDecision::Accept,
        "i" | "ignore" => HumanDecision::Ignore,
        "r" | "respond" => HumanDecision::Respond(rest.to_string()),
        "e" | "edit" => match serde_json::from_str(rest) {
            Ok(arguments) => HumanDecision::Edit(arguments),
            Err(e) => return Err(format!("edit arguments must be JSON: {e}")),
        },
        other => {
            return Err(format!(
                "unknown response '{other}'; allowed: {}",
                interrupt.policy.allowed_names().join(", ")
            ))
        }
    };

    if !interrupt.policy.allows(&decision) {
        return Err(format!(
            "'{}' is not allowed here; allowed: {}",
            decision.name(),
            interrupt.policy.allowed_names().join(", ")
        ));
    }

    Ok(decision)
}

async fn render_events(mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Assistant { delta } => {
                print!("{delta}");
                std::io::stdout().flush().ok();
            }
            SessionEvent::Tool(record) => {
                println!("\n  * {}", record.in_progress);
                if !record.payload.is_empty() {
                    println!("    {}", record.payload);
                }
            }
            SessionEvent::Interrupt(interrupt) => {
                println!("\n! Approval required: {}", interrupt.description);
                println!(
                    "  {} {}",
                    interrupt.call.name,
                    serde_json::to_string(&interrupt.call.arguments).unwrap_or_default()
                );
                println!(
                    "  Respond with: {}",
                    interrupt.policy.allowed_names().join(", ")
                );
            }
            SessionEvent::Error { message } => {
                println!("\n{message}");
            }
        }
    }
    println!();
}
