use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::export::StrategyKind;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub recommender_url: String,
    pub port: u16,
    pub rust_log: String,
    pub export_dir: PathBuf,
    pub export_strategy: StrategyKind,
    pub raster_scale: f32,
    pub raster_settle: Duration,
    pub raster_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let raster_scale = optional_env("RASTER_SCALE", "2.0")
            .parse::<f32>()
            .context("RASTER_SCALE must be a number")?;
        if !(raster_scale > 0.0) {
            anyhow::bail!("RASTER_SCALE must be positive, got {raster_scale}");
        }

        Ok(Config {
            recommender_url: require_env("RECOMMENDER_URL")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            export_dir: PathBuf::from(optional_env("EXPORT_DIR", "./exports")),
            export_strategy: optional_env("EXPORT_STRATEGY", "text")
                .parse::<StrategyKind>()
                .map_err(anyhow::Error::msg)
                .context("EXPORT_STRATEGY is invalid")?,
            raster_scale,
            raster_settle: millis_env("RASTER_SETTLE_MS", "500")?,
            raster_timeout: millis_env("RASTER_TIMEOUT_MS", "15000")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn millis_env(key: &str, default: &str) -> Result<Duration> {
    let ms = optional_env(key, default)
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of milliseconds"))?;
    Ok(Duration::from_millis(ms))
}
