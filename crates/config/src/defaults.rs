/// Default values for configuration fields

pub fn remote_storage() -> super::models::RemoteStorageKind {
    super::models::RemoteStorageKind::Local
}

pub fn log_level() -> String {
    "info".to_string()
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ===============================================================================
# backstore configuration
# ===============================================================================

[general]
# Backend used as the remote side of backups: "local" or "none"
remote_storage = "local"
# tracing filter, overridden by RUST_LOG
log_level = "info"

[local]
# Root directory of the backup key space (required)
path = "backups"
# Root directory for object-disk copies (empty = disabled)
object_disk_path = ""
# Verbose diagnostics for every backend call
debug = false
# Reject uploads whose size differs from the announced size
strict_size_check = false
"#;
