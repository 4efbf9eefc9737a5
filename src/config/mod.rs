pub mod settings;

pub use settings::{Settings, SummaryProvider, WatchConfig};

use crate::utils::error::{NotifierError, Result};
use std::path::Path;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "release-notifier")]
#[command(about = "Announce new upstream releases to a Slack webhook")]
pub struct CliConfig {
    /// Optional TOML file overriding feeds and delivery settings
    #[arg(short, long)]
    pub config: Option<String>,

    /// Dotenv file loaded before reading the environment
    #[arg(long, default_value = ".env")]
    pub env_file: String,

    /// Override the last-seen state file location
    #[arg(long)]
    pub state_path: Option<String>,

    /// Resolve and render releases without posting or saving state
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

/// Load `KEY=value` pairs from a dotenv file without overriding variables
/// already present in the environment. Returns whether a file was read.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }

    dotenvy::from_path(path).map_err(|e| NotifierError::ConfigError {
        message: format!("failed to load {}: {}", path.display(), e),
    })?;
    tracing::info!("Loaded environment variables from {}", path.display());
    Ok(true)
}
