mod bootstrap;

use crate::bootstrap::{config, logging, storage};
use backstore_storage::RemoteFile;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config::config_path();
    let config = config::load(&config_path).await?;

    logging::initialize(&config.general.log_level);

    let Some(storage) = storage::initialize(&config).await? else {
        tracing::warn!("remote_storage = \"none\", nothing to list");
        return Ok(());
    };

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, cancelling listing...");
            shutdown.cancel();
        }
    });

    let mut backups = Vec::new();
    storage
        .walk("", false, &cancel, &mut |file: RemoteFile| -> Result<(), backstore_storage::StorageError> {
            backups.push(file);
            Ok(())
        })
        .await?;

    if backups.is_empty() {
        println!("No backups found");
    }
    for backup in &backups {
        println!(
            "{:<40} {:>12} {}",
            backup.name(),
            backup.size(),
            backup.last_modified().format("%Y-%m-%d %H:%M:%S")
        );
    }

    storage.close().await?;
    Ok(())
}
