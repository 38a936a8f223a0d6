use chrono::{DateTime, Utc};
use std::fs::Metadata;

/// Point-in-time description of one stored file.
///
/// Holds no handle to the file; it may be gone by the time this is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    name: String,
    size: u64,
    last_modified: DateTime<Utc>,
}

impl RemoteFile {
    pub fn new(name: impl Into<String>, size: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            size,
            last_modified,
        }
    }

    pub(crate) fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> std::io::Result<Self> {
        Ok(Self::new(name, metadata.len(), metadata.modified()?.into()))
    }

    /// Base name, or the path relative to the walk prefix for recursive walks
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}
