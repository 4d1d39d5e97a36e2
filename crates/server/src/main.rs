//! upkeep-server: HTTP trigger and CLI for the work order escalation engine.

mod api;
mod db;
mod router;
mod scheduler;
mod state;
mod store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use upkeep_escalation::{EscalationRunner, RunReport};
use upkeep_notify::{MessageRenderer, NotificationDispatcher, PushGatewayNotifier};

use crate::state::AppState;
use crate::store::PgStore;

// ── CLI ─────────────────────────────────────────────────────────────

/// Work order reminder escalation service.
#[derive(Parser, Debug)]
#[command(name = "upkeep-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Execute a single escalation pass and print the JSON report.
    Run {
        /// Evaluate the run gate at this instant instead of now (RFC 3339).
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,
    },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

// ── Wiring ──────────────────────────────────────────────────────────

fn load_config() -> upkeep_core::Config {
    upkeep_core::config::load_dotenv();
    upkeep_core::Config::from_env()
}

fn build_runner(config: &upkeep_core::Config, store: PgStore) -> anyhow::Result<EscalationRunner> {
    let push = &config.push;
    let (gateway_url, server_key) = push
        .credentials()
        .context("PUSH_GATEWAY_URL and PUSH_SERVER_KEY must both be set")?;
    let timeout = Duration::from_secs(push.timeout_secs);

    let notifier = PushGatewayNotifier::new(gateway_url, server_key, timeout)?;
    let store = Arc::new(store);
    let dispatcher = NotificationDispatcher::new(Arc::new(notifier), store.clone()).with_timeout(timeout);
    let renderer = MessageRenderer::new(&push.icon, &push.badge, &push.app_base_url);

    Ok(EscalationRunner::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        dispatcher,
        renderer,
    ))
}

// ── Commands ────────────────────────────────────────────────────────

async fn serve(config: &upkeep_core::Config) -> anyhow::Result<()> {
    let pool = db::init_pg_pool(&config.postgres).await?;
    let runner = build_runner(config, PgStore::new(pool.clone()))?;
    let state = Arc::new(AppState::new(
        Arc::new(runner),
        Some(pool),
        config.trigger.token.clone(),
    ));

    if let Some(expr) = config.trigger.cron.as_deref() {
        match scheduler::parse_cron(expr) {
            Ok(schedule) => {
                info!(cron = expr, "In-process escalation trigger enabled");
                tokio::spawn(scheduler::run_cron_trigger(state.clone(), schedule));
            }
            Err(e) => warn!(cron = expr, error = %e, "Invalid ESCALATION_CRON, in-process trigger disabled"),
        }
    }

    let app = router::build_router(state, &config.server.cors_origin);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn run_once(config: &upkeep_core::Config, at: Option<DateTime<Utc>>) -> anyhow::Result<bool> {
    let pool = db::init_pg_pool(&config.postgres).await?;
    let runner = build_runner(config, PgStore::new(pool))?;

    let result = match at {
        Some(instant) => runner.run_at(instant).await,
        None => runner.run().await,
    };
    let (report, ok) = match result {
        Ok(report) => (report, true),
        Err(e) => {
            error!(error = %e, "Escalation run failed");
            (RunReport::fatal(&e), false)
        }
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ok)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config();
    config.log_summary();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await?,
        Command::Run { at } => {
            if !run_once(&config, at).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
