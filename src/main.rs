mod api;
mod cli;
mod error;
mod models;
mod server;
mod view;

use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use cli::Cli;
use server::AppState;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "openaq-map.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads its env fallbacks
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(&cli)?;

    info!("Initializing air quality map server...");

    let listen = cli.listen_addr()?;
    let state = Arc::new(AppState::from_cli(&cli, listen));
    info!(
        "Proxying OpenAQ at {}; map view reaches the proxy at {}",
        state.upstream.base_url(),
        cli.proxy_base_url(listen)
    );

    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;

    info!("Listening on http://{}", listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("Server stopped. Goodbye!");
    Ok(())
}

/// Sets up the global subscriber: stdout, or daily-rotated files when `--log-dir` is given.
fn init_logging(cli: &Cli) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            let result = if cli.log_json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            result.map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
            Ok(Some(guard))
        },
        None => {
            let result = if cli.log_json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            result.map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
            Ok(None)
        },
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");
}
