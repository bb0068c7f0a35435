use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use runtime::Session;
use server::config::{Config, Credentials};
use server::{Error, Result, api, app};
use storage::{Event, EventKind, Role, SessionId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "trip-coach")]
#[command(about = "A weather-aware travel planning agent behind one HTTP endpoint", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ./trip-coach.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve POST /ask
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List stored sessions
    Sessions,
    /// Show (or clear) the turns of a session
    History {
        /// Session id (defaults to session.id from config)
        #[arg(short, long)]
        session: Option<String>,
        /// Delete the session's history instead of printing it
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "server=info,runtime=info,weather=info,trip_coach=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(config, host, port).await,
        None => cmd_serve(config, None, None).await,
        Some(Commands::Sessions) => cmd_sessions(&config),
        Some(Commands::History { session, clear }) => cmd_history(&config, session, clear),
    }
}

async fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let credentials = Credentials::from_env()?;
    let state = app::build_state(&config, &credentials)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("trip-coach v{} listening on {addr}", env!("CARGO_PKG_VERSION"));

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn cmd_sessions(config: &Config) -> Result<()> {
    let store = open_persistent_store(config)?;
    let sessions = store.list_sessions()?;

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!("{:<24}  {:<16}  {:<16}  MSGS", "SESSION", "STARTED", "LAST ACTIVE");
    println!("{}", "-".repeat(68));

    for summary in sessions {
        let started = Local
            .from_utc_datetime(&summary.started_at.naive_utc())
            .format("%Y-%m-%d %H:%M");
        let last = Local
            .from_utc_datetime(&summary.last_activity.naive_utc())
            .format("%Y-%m-%d %H:%M");
        println!(
            "{:<24}  {:<16}  {:<16}  {}",
            summary.id, started, last, summary.message_count
        );
    }

    Ok(())
}

fn cmd_history(config: &Config, session: Option<String>, clear: bool) -> Result<()> {
    let store = Arc::new(open_persistent_store(config)?);
    let session_id = SessionId::new(session.unwrap_or_else(|| config.session.id.clone()));

    if clear {
        let removed = Session::new(session_id.clone(), store).clear()?;
        println!("Removed {removed} events from {session_id}.");
        return Ok(());
    }

    let events = store.load_session(&session_id)?;
    if events.is_empty() {
        return Err(Error::SessionNotFound(session_id.to_string()));
    }

    println!("Session: {session_id}\n");
    for event in events {
        print_event(&event);
    }
    Ok(())
}

fn print_event(event: &Event) {
    let time = Local
        .from_utc_datetime(&event.timestamp.naive_utc())
        .format("%H:%M:%S");

    match &event.kind {
        EventKind::Message { role, content } => {
            let role_str = match role {
                Role::User => "USER",
                Role::Assistant => "ASSISTANT",
                Role::System => "SYSTEM",
            };
            println!("[{time}] {role_str}: {}", truncate(content, 200));
        }
        EventKind::ToolCall { name, input, .. } => {
            println!("[{time}] TOOL CALL: {name} {input}");
        }
        EventKind::ToolResult {
            output, is_error, ..
        } => {
            let label = if *is_error { "TOOL ERROR" } else { "TOOL RESULT" };
            println!("[{time}] {label}: {}", truncate(output, 200));
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn open_persistent_store(config: &Config) -> Result<storage::EventStore> {
    match &config.session.db_path {
        Some(path) if path.exists() => Ok(storage::EventStore::open(path)?),
        Some(path) => Err(Error::DatabaseNotFound { path: path.clone() }),
        None => Err(Error::DatabaseNotConfigured),
    }
}
