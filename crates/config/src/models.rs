use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub local: LocalConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralSettings {
    #[serde(default = "super::defaults::remote_storage")]
    pub remote_storage: RemoteStorageKind,
    #[serde(default = "super::defaults::log_level")]
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            remote_storage: super::defaults::remote_storage(),
            log_level: super::defaults::log_level(),
        }
    }
}

/// Which backend serves the remote side of a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStorageKind {
    Local,
    None,
}

/// Settings of the local-filesystem backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalConfig {
    /// Root of the primary backup key space
    #[serde(default)]
    pub path: String,
    /// Root for object-disk copies; empty disables them
    #[serde(default)]
    pub object_disk_path: String,
    #[serde(default)]
    pub debug: bool,
    /// Fail uploads whose byte count differs from the announced size
    #[serde(default)]
    pub strict_size_check: bool,
}

impl LocalConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_object_disk_path(mut self, object_disk_path: impl Into<String>) -> Self {
        self.object_disk_path = object_disk_path.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_strict_size_check(mut self, strict: bool) -> Self {
        self.strict_size_check = strict;
        self
    }
}
