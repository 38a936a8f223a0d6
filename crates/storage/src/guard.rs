use crate::StorageError;
use backstore_utils::{clean_path, is_within, join_relative};
use std::path::{Path, PathBuf};

/// Resolves `key` under `base` and rejects results outside of it.
///
/// Both sides are cleaned lexically before comparing, so `a/../b` is accepted
/// and `../x` is not. Leading separators in `key` never reach the filesystem root.
pub fn contained_path(base: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let base = clean_path(base);
    let joined = clean_path(&join_relative(&base, key));

    if !is_within(&base, &joined) {
        return Err(StorageError::PathEscape {
            key: key.to_string(),
            base,
        });
    }
    Ok(joined)
}
