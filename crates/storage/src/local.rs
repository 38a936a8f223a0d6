use crate::backend::{BatchDeleter, FileReader, RemoteStorage, WalkVisitor};
use crate::guard::contained_path;
use crate::{BatchDeleteError, KeyError, RemoteFile, StorageError};
use backstore_config::LocalConfig;
use backstore_utils::{clean_path, relative_name};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

/// Local filesystem storage backend.
///
/// Mirrors the caller's key space verbatim under `LocalConfig::path`, and
/// object-disk copies under `LocalConfig::object_disk_path`. Nothing is
/// cached between calls. Concurrent writes or deletes of the same key must be
/// serialized by the caller.
pub struct LocalBackend {
    config: LocalConfig,
}

impl LocalBackend {
    pub fn new(config: LocalConfig) -> Self {
        Self { config }
    }

    fn base_path(&self) -> &Path {
        Path::new(&self.config.path)
    }

    fn object_disk_path(&self) -> Result<&Path, StorageError> {
        if self.config.object_disk_path.is_empty() {
            return Err(StorageError::ConfigError(
                "local->object_disk_path is not configured".to_string(),
            ));
        }
        Ok(Path::new(&self.config.object_disk_path))
    }

    fn debug(&self, args: std::fmt::Arguments<'_>) {
        if self.config.debug {
            tracing::info!(backend = "local", "{}", args);
        }
    }

    /// Streams `reader` into `path` through a uniquely named sibling temp
    /// file that is renamed into place only after every byte was written.
    /// The temp file is removed on every failure path.
    async fn write_file(
        &self,
        path: &Path,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        expected_size: Option<u64>,
    ) -> Result<u64, StorageError> {
        if let Ok(metadata) = fs::metadata(path).await {
            if metadata.is_dir() {
                return Err(StorageError::NotAFile(path.display().to_string()));
            }
        }

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        create_directory(parent).await?;

        let (file, tmp_path) = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(parent)?
            .into_parts();

        let written = stream_into(fs::File::from_std(file), reader).await?;

        if let Some(expected) = expected_size {
            if written != expected {
                return Err(StorageError::SizeMismatch {
                    key: path.display().to_string(),
                    expected,
                    written,
                });
            }
        }

        tmp_path.persist(path).map_err(|e| e.error)?;
        Ok(written)
    }

    async fn delete_keys_batch_internal(
        &self,
        base_path: &Path,
        cancel: &CancellationToken,
        keys: &[String],
    ) -> Result<(), StorageError> {
        let mut failures = Vec::new();
        let mut deleted_count = 0usize;

        for key in keys {
            if cancel.is_cancelled() {
                return Err(StorageError::Cancelled);
            }

            let abs_path = match contained_path(base_path, key) {
                Ok(abs_path) => abs_path,
                Err(e) => {
                    failures.push(KeyError { key: key.clone(), error: e });
                    continue;
                }
            };
            if let Err(e) = remove_all(&abs_path).await {
                failures.push(KeyError { key: key.clone(), error: e.into() });
                continue;
            }
            deleted_count += 1;
        }

        if !failures.is_empty() {
            tracing::warn!(
                "LOCAL batch delete under {}: {} failed",
                base_path.display(),
                failures.len()
            );
            return Err(BatchDeleteError {
                message: format!(
                    "LOCAL batch delete: {} keys deleted, {} failed",
                    deleted_count,
                    failures.len()
                ),
                failures,
            }
            .into());
        }

        tracing::debug!("LOCAL batch delete: successfully deleted {} keys", deleted_count);
        Ok(())
    }

    async fn walk_recursive(
        &self,
        prefix: &Path,
        cancel: &CancellationToken,
        visitor: &mut dyn WalkVisitor,
    ) -> Result<(), StorageError> {
        // min_depth(1) leaves out the prefix itself
        let walker = WalkDir::new(prefix).min_depth(1).sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_vanished(&e) => continue,
                Err(e) => return Err(std::io::Error::from(e).into()),
            };
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) if is_vanished(&e) => continue,
                Err(e) => return Err(std::io::Error::from(e).into()),
            };
            let name = relative_name(prefix, entry.path())?;

            if cancel.is_cancelled() {
                return Err(StorageError::Cancelled);
            }
            visitor.visit(RemoteFile::from_metadata(name, &metadata)?).await?;
        }
        Ok(())
    }

    async fn walk_shallow(
        &self,
        prefix: &Path,
        cancel: &CancellationToken,
        visitor: &mut dyn WalkVisitor,
    ) -> Result<(), StorageError> {
        let mut read_dir = match fs::read_dir(prefix).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                self.debug(format_args!("Walk read_dir {} failed: {}", prefix.display(), e));
                return Err(e.into());
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            entries.push(entry);
        }
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let name = entry.file_name().to_string_lossy().into_owned();

            if cancel.is_cancelled() {
                return Err(StorageError::Cancelled);
            }
            visitor.visit(RemoteFile::from_metadata(name, &metadata)?).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteStorage for LocalBackend {
    fn kind(&self) -> &'static str {
        "LOCAL"
    }

    async fn connect(&self) -> Result<(), StorageError> {
        if self.config.path.is_empty() {
            return Err(StorageError::ConfigError("local->path is required".to_string()));
        }
        create_directory(self.base_path()).await?;
        if !self.config.object_disk_path.is_empty() {
            create_directory(Path::new(&self.config.object_disk_path)).await?;
        }
        self.debug(format_args!("connected to {}", self.config.path));
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn stat_file(&self, key: &str) -> Result<RemoteFile, StorageError> {
        let abs_path = contained_path(self.base_path(), key)?;
        self.stat_file_absolute(&abs_path).await
    }

    async fn stat_file_absolute(&self, path: &Path) -> Result<RemoteFile, StorageError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                self.debug(format_args!("StatFile {} returned error {}", path.display(), e));
                if e.kind() == ErrorKind::NotFound {
                    return Err(StorageError::NotFound(path.display().to_string()));
                }
                return Err(e.into());
            }
        };
        Ok(RemoteFile::from_metadata(base_name(path), &metadata)?)
    }

    async fn delete_file(&self, key: &str) -> Result<(), StorageError> {
        self.debug(format_args!("Delete {}", key));
        let abs_path = contained_path(self.base_path(), key)?;
        Ok(remove_all(&abs_path).await?)
    }

    async fn delete_file_from_object_disk_backup(&self, key: &str) -> Result<(), StorageError> {
        self.debug(format_args!("DeleteFileFromObjectDiskBackup {}", key));
        let abs_path = contained_path(self.object_disk_path()?, key)?;
        Ok(remove_all(&abs_path).await?)
    }

    async fn walk(
        &self,
        prefix: &str,
        recursive: bool,
        cancel: &CancellationToken,
        visitor: &mut dyn WalkVisitor,
    ) -> Result<(), StorageError> {
        let abs_prefix = contained_path(self.base_path(), prefix)?;
        self.walk_absolute(&abs_prefix, recursive, cancel, visitor).await
    }

    async fn walk_absolute(
        &self,
        prefix: &Path,
        recursive: bool,
        cancel: &CancellationToken,
        visitor: &mut dyn WalkVisitor,
    ) -> Result<(), StorageError> {
        self.debug(format_args!("Walk {}, recursive={}", prefix.display(), recursive));

        if recursive {
            self.walk_recursive(prefix, cancel, visitor).await
        } else {
            self.walk_shallow(prefix, cancel, visitor).await
        }
    }

    async fn get_file_reader(&self, key: &str) -> Result<FileReader, StorageError> {
        let abs_path = contained_path(self.base_path(), key)?;
        self.get_file_reader_absolute(&abs_path).await
    }

    async fn get_file_reader_absolute(&self, path: &Path) -> Result<FileReader, StorageError> {
        match fs::File::open(path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_file_reader_with_local_path(
        &self,
        key: &str,
        _local_path: &Path,
        _remote_size: u64,
    ) -> Result<FileReader, StorageError> {
        self.get_file_reader(key).await
    }

    async fn put_file(&self, key: &str, reader: FileReader, local_size: u64) -> Result<(), StorageError> {
        let abs_path = contained_file_path(self.base_path(), key)?;
        self.put_file_absolute(&abs_path, reader, local_size).await
    }

    async fn put_file_absolute(
        &self,
        path: &Path,
        mut reader: FileReader,
        local_size: u64,
    ) -> Result<(), StorageError> {
        let expected = self.config.strict_size_check.then_some(local_size);
        let written = self.write_file(path, reader.as_mut(), expected).await?;
        if written != local_size {
            self.debug(format_args!(
                "PutFile {} wrote {} bytes, announced {}",
                path.display(),
                written,
                local_size
            ));
        }
        Ok(())
    }

    async fn copy_object(
        &self,
        src_size: u64,
        _src_bucket: &str,
        src_key: &str,
        dst_key: &str,
    ) -> Result<u64, StorageError> {
        let src_path = contained_path(self.base_path(), src_key)?;
        let dst_path = contained_file_path(self.object_disk_path()?, dst_key)?;

        self.debug(format_args!("CopyObject {} -> {}", src_path.display(), dst_path.display()));

        if let Some(dst_dir) = dst_path.parent() {
            create_directory(dst_dir).await?;
        }

        match fs::hard_link(&src_path, &dst_path).await {
            Ok(()) => {
                self.debug(format_args!(
                    "CopyObject hardlink {} -> {}",
                    src_path.display(),
                    dst_path.display()
                ));
                return Ok(src_size);
            }
            Err(e) => {
                self.debug(format_args!(
                    "CopyObject hardlink failed ({}), copying {} -> {}",
                    e,
                    src_path.display(),
                    dst_path.display()
                ));
            }
        }

        let mut src = match fs::File::open(&src_path).await {
            Ok(src) => src,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(src_path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        self.write_file(&dst_path, &mut src, None).await
    }
}

#[async_trait::async_trait]
impl BatchDeleter for LocalBackend {
    async fn delete_keys_batch(
        &self,
        cancel: &CancellationToken,
        keys: &[String],
    ) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }
        self.debug(format_args!("DeleteKeysBatch: deleting {} keys", keys.len()));
        self.delete_keys_batch_internal(self.base_path(), cancel, keys).await
    }

    async fn delete_keys_from_object_disk_backup_batch(
        &self,
        cancel: &CancellationToken,
        keys: &[String],
    ) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }
        self.debug(format_args!(
            "DeleteKeysFromObjectDiskBackupBatch: deleting {} keys",
            keys.len()
        ));
        let base_path = self.object_disk_path()?;
        self.delete_keys_batch_internal(base_path, cancel, keys).await
    }
}

/// Like `contained_path`, but a key naming the base itself is refused
fn contained_file_path(base: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let abs_path = contained_path(base, key)?;
    if abs_path == clean_path(base) {
        return Err(StorageError::NotAFile(abs_path.display().to_string()));
    }
    Ok(abs_path)
}

async fn create_directory(path: &Path) -> Result<(), StorageError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o750);

    builder.create(path).await.map_err(|e| {
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("can't create directory {}: {}", path.display(), e),
        ))
    })
}

/// Copies `reader` into `dst`. The handle is closed on return.
async fn stream_into(mut dst: fs::File, reader: &mut (dyn AsyncRead + Send + Unpin)) -> std::io::Result<u64> {
    let written = tokio::io::copy(reader, &mut dst).await?;
    dst.flush().await?;
    Ok(written)
}

/// Removes a file or a directory tree; a missing path is success
async fn remove_all(path: &Path) -> std::io::Result<()> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };
    match removed {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Entries that disappear between listing and stat are skipped
fn is_vanished(e: &walkdir::Error) -> bool {
    e.io_error().map_or(false, |io| io.kind() == ErrorKind::NotFound)
}
