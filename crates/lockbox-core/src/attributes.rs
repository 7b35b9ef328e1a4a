//! Basic file attribute record.
//!
//! A flattened view over the platform metadata call. Every field defaults
//! to zero/empty when the platform omits it (e.g. creation time on
//! filesystems that do not track one), so lookups never fail on a field.

use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Basic attributes of a file or directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttributes {
    /// Size in bytes
    pub size: u64,

    /// Entry type: "file", "directory", or "symlink"
    pub file_type: String,

    /// POSIX permission bits (0 where unavailable)
    pub permissions: u32,

    /// Owning user id (0 where unavailable)
    pub owner_id: u32,

    /// Owning group id (0 where unavailable)
    pub group_id: u32,

    /// Creation timestamp (Unix epoch where unavailable)
    pub created: DateTime<Utc>,

    /// Last-modification timestamp (Unix epoch where unavailable)
    pub modified: DateTime<Utc>,
}

impl FileAttributes {
    pub(crate) fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = if metadata.is_dir() {
            "directory"
        } else if metadata.is_symlink() {
            "symlink"
        } else {
            "file"
        };

        #[cfg(unix)]
        let (permissions, owner_id, group_id) = {
            use std::os::unix::fs::MetadataExt;
            (metadata.mode() & 0o7777, metadata.uid(), metadata.gid())
        };
        #[cfg(not(unix))]
        let (permissions, owner_id, group_id) = (0, 0, 0);

        Self {
            size: metadata.len(),
            file_type: file_type.to_string(),
            permissions,
            owner_id,
            group_id,
            created: timestamp_or_epoch(metadata.created().ok()),
            modified: timestamp_or_epoch(metadata.modified().ok()),
        }
    }
}

fn timestamp_or_epoch(time: Option<SystemTime>) -> DateTime<Utc> {
    time.map(DateTime::<Utc>::from)
        .unwrap_or_else(|| DateTime::<Utc>::from(SystemTime::UNIX_EPOCH))
}
