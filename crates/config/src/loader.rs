use super::defaults::DEFAULT_CONFIG_TEMPLATE;
use super::errors::ConfigError;
use super::models::{Config, RemoteStorageKind};
use std::path::Path;
use std::str::FromStr;

impl Config {
    /// Loads configuration from a file, writing the default template first
    /// when the file does not exist
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            create_default_config(path).await?;
            tracing::info!("Created default configuration at: {}", path.display());
        }

        let content = tokio::fs::read_to_string(path).await?;
        content.parse()
    }

    /// Checks cross-field rules that serde defaults cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.remote_storage == RemoteStorageKind::Local && self.local.path.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "local.path is required when remote_storage = \"local\"".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

async fn create_default_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
    tokio::fs::write(path, DEFAULT_CONFIG_TEMPLATE).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = r#"
            [general]
            remote_storage = "local"
            log_level = "debug"

            [local]
            path = "/var/lib/backups"
            object_disk_path = "/var/lib/object_disks"
            debug = true
        "#
        .parse()
        .unwrap();

        assert_eq!(config.general.remote_storage, RemoteStorageKind::Local);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.local.path, "/var/lib/backups");
        assert_eq!(config.local.object_disk_path, "/var/lib/object_disks");
        assert!(config.local.debug);
        assert!(!config.local.strict_size_check);
    }

    #[test]
    fn test_missing_local_path_rejected() {
        let result = "[general]\nremote_storage = \"local\"\n".parse::<Config>();
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_none_storage_needs_no_path() {
        let config: Config = "[general]\nremote_storage = \"none\"\n".parse().unwrap();
        assert_eq!(config.general.remote_storage, RemoteStorageKind::None);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_unknown_storage_kind_rejected() {
        let result = "[general]\nremote_storage = \"ftp\"\n".parse::<Config>();
        assert!(matches!(result, Err(ConfigError::TomlParseError(_))));
    }

    #[test]
    fn test_default_template_is_valid() {
        let config: Config = DEFAULT_CONFIG_TEMPLATE.parse().unwrap();
        assert_eq!(config.local.path, "backups");
        assert!(config.local.object_disk_path.is_empty());
    }

    #[tokio::test]
    async fn test_from_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::from_file(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(config.general.remote_storage, RemoteStorageKind::Local);
    }
}
