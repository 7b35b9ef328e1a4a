//! Store configuration and base-location resolution.
//!
//! A store is constructed from exactly one of three location sources: an
//! explicit base path, a shared app-group container, or a well-known system
//! directory. Each source resolves to an *optional* base path; resolution
//! failure is not an error at construction time. Instead, every
//! path-dependent operation on a store without a base location fails with
//! [`LockboxError::InvalidConfiguration`](crate::LockboxError::InvalidConfiguration).

use std::path::{Path, PathBuf};

/// Well-known per-user system directories a store can be rooted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemDirectoryKind {
    /// The user's document directory
    Documents,
    /// The user's cache directory
    Cache,
    /// The user's local application-data directory
    Data,
}

impl SystemDirectoryKind {
    fn resolve(self) -> Option<PathBuf> {
        match self {
            SystemDirectoryKind::Documents => dirs::document_dir(),
            SystemDirectoryKind::Cache => dirs::cache_dir(),
            SystemDirectoryKind::Data => dirs::data_local_dir(),
        }
    }
}

/// Base-location source for a [`FileStore`](crate::FileStore).
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// An explicit base path, used as-is.
    BasePath(PathBuf),

    /// A shared app-group container, addressed by identifier.
    ///
    /// The container must already exist under the local application-data
    /// directory; an unknown identifier resolves to no base location.
    AppGroup {
        /// App-group identifier naming the container
        identifier: String,
        /// Directory inside the container to root the store in
        directory: String,
    },

    /// A well-known system directory plus a relative subdirectory.
    SystemDirectory {
        /// Which system directory to resolve
        kind: SystemDirectoryKind,
        /// Directory inside it to root the store in
        directory: String,
    },
}

impl StoreConfig {
    /// Directory app-group containers live under, relative to the local
    /// application-data directory.
    const APP_GROUP_CONTAINERS: &'static str = "app-groups";

    /// Resolve this configuration to a concrete base path, if possible.
    pub fn resolve(&self) -> Option<PathBuf> {
        match self {
            StoreConfig::BasePath(path) => Some(path.clone()),
            StoreConfig::AppGroup {
                identifier,
                directory,
            } => {
                let container = dirs::data_local_dir()?
                    .join(Self::APP_GROUP_CONTAINERS)
                    .join(identifier);
                if !container.is_dir() {
                    return None;
                }
                Some(container.join(directory))
            }
            StoreConfig::SystemDirectory { kind, directory } => {
                Some(kind.resolve()?.join(directory))
            }
        }
    }
}

impl From<PathBuf> for StoreConfig {
    fn from(path: PathBuf) -> Self {
        StoreConfig::BasePath(path)
    }
}

impl From<&Path> for StoreConfig {
    fn from(path: &Path) -> Self {
        StoreConfig::BasePath(path.to_path_buf())
    }
}
