use backstore_config::{Config, RemoteStorageKind};
use backstore_storage::{LocalBackend, RemoteStorage};
use anyhow::Result;
use std::sync::Arc;

/// Builds and connects the configured backend; `None` when remote storage is disabled
pub async fn initialize(config: &Config) -> Result<Option<Arc<dyn RemoteStorage>>> {
    match config.general.remote_storage {
        RemoteStorageKind::Local => {
            let backend = LocalBackend::new(config.local.clone());
            backend.connect().await?;

            tracing::info!(
                "Initialized {} storage backend: path={}, object_disk_path={}",
                backend.kind(),
                config.local.path,
                config.local.object_disk_path
            );
            Ok(Some(Arc::new(backend) as Arc<dyn RemoteStorage>))
        }
        RemoteStorageKind::None => Ok(None),
    }
}
