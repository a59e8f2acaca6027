//! Numina Server CLI
//!
//! A thin wrapper around the numina-server library.

use std::sync::Arc;

use clap::Parser;
use numina_server::config::{Cli, Command};
use numina_server::{repl, serve, AppState};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logs go to stderr so the REPL keeps stdout to itself
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("NUMINA_LOG"))
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let calculator = cli.calculator();

    match cli.command() {
        Command::Serve => {
            let listener = tokio::net::TcpListener::bind(cli.bind_addr()).await?;
            let state = AppState::new(calculator).with_body_limit(cli.max_body_bytes);
            serve(listener, Arc::new(state)).await
        }
        Command::Repl { metrics } => {
            tracing::info!(delegate = calculator.delegate_name(), "starting REPL");
            repl::run_stdio(calculator, metrics).await
        }
    }
}
