use backstore_config::Config;
use anyhow::{Context, Result};

pub const CONFIG_ENV: &str = "BACKSTORE_CONFIG";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string())
}

pub async fn load(config_path: &str) -> Result<Config> {
    Config::from_file(config_path)
        .await
        .with_context(|| format!("Failed to load configuration from {}", config_path))
}
