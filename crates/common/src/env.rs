//! Environment/runtime helpers
//!
//! Sanity checks run once at startup before the server binds.

use tracing::{info, warn};

/// Warn when no config file is present; the server then runs on env vars and defaults.
pub async fn ensure_env(config_path: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(config_path).await {
        Ok(meta) if meta.is_file() => {
            info!(%config_path, "using configuration file");
        }
        Ok(_) => {
            return Err(anyhow::anyhow!("{config_path} exists but is not a file"));
        }
        Err(_) => {
            warn!(%config_path, "configuration file not found; falling back to environment variables");
        }
    }
    if std::env::var("DATABASE_URL").is_err() {
        warn!("DATABASE_URL not set; the configured or default database url will be used");
    }
    Ok(())
}
