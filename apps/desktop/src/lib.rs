pub mod commands;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::storage::Gateway;

pub use error::{AppError, CommandError};

/// Set up logging, read configuration and load the saved practice data.
pub fn init() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();

    // a host application may already have installed a subscriber
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let config = AppConfig::from_env();
    open(&config)
}

/// Load the practice data described by `config`.
pub fn open(config: &AppConfig) -> anyhow::Result<AppState> {
    // Ensure data directory exists
    if let Some(parent) = config.data_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory {}", parent.display()))?;
    }

    tracing::info!(
        path = %config.data_file.display(),
        mirror = config.mirror.is_some(),
        "opening practice data"
    );
    let gateway = Gateway::from_config(config);
    Ok(AppState::open(Box::new(gateway), config.recency_capacity))
}
