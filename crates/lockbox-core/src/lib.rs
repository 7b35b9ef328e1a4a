//! # Lockbox Core
//!
//! Local file persistence with optional encryption at rest and
//! extended-attribute-backed metadata.
//!
//! A [`FileStore`] resolves logical file names against a configured base
//! location and provides typed read/write/append operations. When an
//! [`EncryptionProvider`] is installed, writes are transparently
//! encrypted and the per-file data-encryption key is stored as an
//! extended attribute on the file itself, so the key's lifetime is the
//! file's lifetime. A last-access timestamp rides on the same mechanism.
//!
//! ## Architecture
//!
//! - **config**: base-location resolution (explicit path, app-group
//!   container, or system directory)
//! - **store**: the `FileStore` operations and the encryption gate
//! - **metadata**: extended-attribute adapter and the reserved
//!   key/timestamp conventions
//! - **provider**: the `EncryptionProvider` trait and the bundled
//!   AES-256-GCM implementation
//! - **attributes**: basic file attribute record
//!
//! All operations are blocking and synchronous; the store holds no state
//! beyond its configuration and provides no cross-process coordination.

pub mod attributes;
pub mod config;
pub mod error;
pub mod metadata;
pub mod provider;
pub mod store;

pub use attributes::FileAttributes;
pub use config::{StoreConfig, SystemDirectoryKind};
pub use error::{LockboxError, Result};
pub use metadata::{ENCRYPTION_KEY_ATTR, LAST_ACCESS_ATTR, NO_BACKUP_ATTR};
pub use provider::{AesGcmProvider, EncryptionProvider};
pub use store::{FileStore, WriteOptions};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
