use crate::{RemoteFile, StorageError};
use std::path::Path;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

/// Readable byte stream handed to and returned from a backend
pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

/// Callback invoked once per file found by a walk. Returning an error stops the walk.
#[async_trait::async_trait]
pub trait WalkVisitor: Send {
    async fn visit(&mut self, file: RemoteFile) -> Result<(), StorageError>;
}

#[async_trait::async_trait]
impl<F> WalkVisitor for F
where
    F: FnMut(RemoteFile) -> Result<(), StorageError> + Send,
{
    async fn visit(&mut self, file: RemoteFile) -> Result<(), StorageError> {
        self(file)
    }
}

/// Storage backend contract shared by every remote storage implementation.
///
/// Key-based methods resolve keys relative to the backend's root and must
/// reject keys that escape it. `*_absolute` methods take a path the caller
/// already vetted, typically one produced by this backend.
#[async_trait::async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Short backend identifier used in logs
    fn kind(&self) -> &'static str;

    async fn connect(&self) -> Result<(), StorageError>;

    async fn close(&self) -> Result<(), StorageError>;

    /// Returns `StorageError::NotFound` when the key does not exist
    async fn stat_file(&self, key: &str) -> Result<RemoteFile, StorageError>;

    async fn stat_file_absolute(&self, path: &Path) -> Result<RemoteFile, StorageError>;

    /// Deletes a file or a whole directory tree. Missing keys are not an error.
    async fn delete_file(&self, key: &str) -> Result<(), StorageError>;

    async fn delete_file_from_object_disk_backup(&self, key: &str) -> Result<(), StorageError>;

    /// Visits every file under `prefix`. A missing prefix yields nothing.
    async fn walk(
        &self,
        prefix: &str,
        recursive: bool,
        cancel: &CancellationToken,
        visitor: &mut dyn WalkVisitor,
    ) -> Result<(), StorageError>;

    async fn walk_absolute(
        &self,
        prefix: &Path,
        recursive: bool,
        cancel: &CancellationToken,
        visitor: &mut dyn WalkVisitor,
    ) -> Result<(), StorageError>;

    async fn get_file_reader(&self, key: &str) -> Result<FileReader, StorageError>;

    async fn get_file_reader_absolute(&self, path: &Path) -> Result<FileReader, StorageError>;

    /// Variant for backends that can serve reads from a local staging copy
    async fn get_file_reader_with_local_path(
        &self,
        key: &str,
        local_path: &Path,
        remote_size: u64,
    ) -> Result<FileReader, StorageError>;

    /// Streams `reader` into `key`. A failed upload leaves nothing behind.
    async fn put_file(&self, key: &str, reader: FileReader, local_size: u64) -> Result<(), StorageError>;

    async fn put_file_absolute(
        &self,
        path: &Path,
        reader: FileReader,
        local_size: u64,
    ) -> Result<(), StorageError>;

    /// Copies `src_key` of the backup tree to `dst_key` of the object-disk
    /// tree and returns the number of bytes copied
    async fn copy_object(
        &self,
        src_size: u64,
        src_bucket: &str,
        src_key: &str,
        dst_key: &str,
    ) -> Result<u64, StorageError>;
}

/// Backends that can delete many keys in one call.
///
/// Every key is attempted; failures are collected into
/// `StorageError::BatchDelete`. Cancellation aborts with `StorageError::Cancelled`.
#[async_trait::async_trait]
pub trait BatchDeleter: Send + Sync {
    async fn delete_keys_batch(
        &self,
        cancel: &CancellationToken,
        keys: &[String],
    ) -> Result<(), StorageError>;

    async fn delete_keys_from_object_disk_backup_batch(
        &self,
        cancel: &CancellationToken,
        keys: &[String],
    ) -> Result<(), StorageError>;
}
