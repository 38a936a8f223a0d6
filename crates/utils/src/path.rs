use crate::UtilsError;
use std::path::{Component, Path, PathBuf};

/// Lexically cleans a path: drops `.` segments, resolves `..` against the
/// preceding segment and collapses repeated separators.
///
/// The filesystem is never consulted, so the path does not have to exist and
/// symlinks are not followed. `..` at the start of a relative path is kept,
/// `..` directly under the root is dropped. An empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.last() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(component),
            },
            other => cleaned.push(other),
        }
    }

    if cleaned.is_empty() {
        return PathBuf::from(".");
    }
    cleaned.iter().collect()
}

/// Appends `key` to `base`, always relative to `base`.
///
/// Root and drive prefixes inside `key` are skipped so that `/etc/passwd`
/// lands at `base/etc/passwd` instead of replacing `base` the way
/// `PathBuf::join` would.
pub fn join_relative(base: &Path, key: &str) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in Path::new(key).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => joined.push(other),
        }
    }
    joined
}

/// Returns true when the cleaned `path` equals or lies below the cleaned `base`.
///
/// Comparison is per component, so `/data/backup2` is not inside `/data/backup`.
pub fn is_within(base: &Path, path: &Path) -> bool {
    let base = clean_path(base);
    let path = clean_path(path);

    if base == Path::new(".") {
        return !path.is_absolute()
            && !matches!(path.components().next(), Some(Component::ParentDir));
    }
    path.starts_with(&base)
}

pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Path of `path` relative to `root`, with forward slashes.
pub fn relative_name(root: &Path, path: &Path) -> Result<String, UtilsError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| UtilsError::NotUnderRoot {
            path: path.display().to_string(),
            root: root.display().to_string(),
        })?;
    Ok(normalize_path(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/data//backup/./x")), PathBuf::from("/data/backup/x"));
        assert_eq!(clean_path(Path::new("/data/backup/../x")), PathBuf::from("/data/x"));
        assert_eq!(clean_path(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(clean_path(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("")), PathBuf::from("."));
    }

    #[test]
    fn test_join_relative_ignores_root() {
        assert_eq!(
            join_relative(Path::new("/data"), "/etc/passwd"),
            PathBuf::from("/data/etc/passwd")
        );
        assert_eq!(
            join_relative(Path::new("/data"), "a/../b"),
            PathBuf::from("/data/a/../b")
        );
    }

    #[test]
    fn test_is_within() {
        let base = Path::new("/data/backup");

        assert!(is_within(base, Path::new("/data/backup")));
        assert!(is_within(base, Path::new("/data/backup/a/b")));
        assert!(is_within(base, Path::new("/data/backup/a/../b")));
        assert!(!is_within(base, Path::new("/data/backup2")));
        assert!(!is_within(base, Path::new("/data/backup/../other")));

        // Relative "." base
        assert!(is_within(Path::new("."), Path::new("a/b")));
        assert!(!is_within(Path::new("."), Path::new("../a")));
    }

    #[test]
    fn test_relative_name() {
        let root = Path::new("/data/backup");
        assert_eq!(
            relative_name(root, Path::new("/data/backup/shadow/part/data.bin")).unwrap(),
            "shadow/part/data.bin"
        );
        assert!(relative_name(root, Path::new("/elsewhere/file")).is_err());
    }
}
