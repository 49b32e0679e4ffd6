//! SISGEFI HTTP server
//!
//! ```text
//! sisgefi [--env dev] [--port 3050]
//! ```
//!
//! Reads `config/{env}.yaml`, connects to PostgreSQL and serves `/api` until
//! ctrl-c.

use anyhow::{Context, Result};
use std::sync::Arc;

use sisgefi::config::AppConfig;
use sisgefi::db::Database;
use sisgefi::gateway::{self, state::AppState};
use sisgefi::logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = logging::init_logging(&app_config);

    tracing::info!("Starting SISGEFI in {} mode", env);

    let postgres_url = app_config
        .postgres_url
        .clone()
        .context("postgres_url is not set (config file or DATABASE_URL)")?;
    let pg_db = Arc::new(
        Database::connect(&postgres_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    let state = Arc::new(AppState::from_config(&app_config, pg_db)?);
    gateway::run_server(&app_config, state).await
}
