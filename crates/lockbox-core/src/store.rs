//! File store: name resolution, content I/O, and the encryption gate.
//!
//! Every public operation first resolves the logical name against the
//! configured base location, then performs a blocking filesystem call.
//! Whether a file is encrypted is decided entirely by the presence of the
//! encryption-key attribute; file content is never sniffed.
//!
//! The store holds no cache and no index, so multiple stores over the same
//! base location are safe to construct. Concurrent calls against the same
//! logical file are not coordinated: there is no locking and no
//! transaction discipline.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::attributes::FileAttributes;
use crate::config::StoreConfig;
use crate::error::{LockboxError, Result};
use crate::metadata;
use crate::provider::EncryptionProvider;

/// Per-write options for [`FileStore::write_with`].
#[derive(Debug, Default, Clone)]
pub struct WriteOptions {
    /// Whether to encrypt. `None` means "encrypt iff a provider is
    /// configured"; `Some(true)` without a provider is an error.
    pub encrypt: Option<bool>,

    /// Caller-supplied encryption key. `None` lets the provider generate
    /// one. Ignored for unencrypted writes.
    pub key: Option<Vec<u8>>,
}

impl WriteOptions {
    /// Options forcing an unencrypted write.
    pub fn plain() -> Self {
        Self {
            encrypt: Some(false),
            key: None,
        }
    }

    /// Options forcing an encrypted write with a provider-generated key.
    pub fn encrypted() -> Self {
        Self {
            encrypt: Some(true),
            key: None,
        }
    }
}

/// Local file store over a configured base location.
///
/// The base location is immutable after construction; the write kill
/// switch and the encryption provider can be reconfigured at runtime.
pub struct FileStore {
    base: Option<PathBuf>,
    do_not_back_up: bool,
    write_enabled: bool,
    provider: Option<Box<dyn EncryptionProvider>>,
}

impl FileStore {
    /// Create a store from a configuration source.
    ///
    /// Resolution failure (e.g. an unknown app-group identifier) is not an
    /// error here; every path-dependent operation on such a store fails
    /// with `LockboxError::InvalidConfiguration`.
    pub fn new(config: StoreConfig, do_not_back_up: bool) -> Self {
        Self {
            base: config.resolve(),
            do_not_back_up,
            write_enabled: true,
            provider: None,
        }
    }

    /// Create a store rooted at an explicit base path, with backups allowed.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::BasePath(base.into()), false)
    }

    /// The resolved base location, if configuration resolution succeeded.
    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Whether mutating operations are currently allowed.
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Toggle the global write kill switch.
    pub fn set_write_enabled(&mut self, enabled: bool) {
        self.write_enabled = enabled;
    }

    /// Install or remove the encryption provider.
    ///
    /// Presence supplies the default per-write policy only; it does not
    /// force encryption when a write explicitly opts out.
    pub fn set_encryption_provider(&mut self, provider: Option<Box<dyn EncryptionProvider>>) {
        self.provider = provider;
    }

    /// Whether an encryption provider is configured.
    pub fn has_encryption_provider(&self) -> bool {
        self.provider.is_some()
    }

    // --- Path resolution ---

    /// Resolve a logical file name to a concrete path.
    ///
    /// Pure concatenation: base + optional subdirectory + name. The name
    /// is not validated; separators in it place the file in nested
    /// subdirectories implicitly.
    ///
    /// # Errors
    ///
    /// Returns `LockboxError::InvalidConfiguration` if no base location
    /// was resolved at construction.
    pub fn resolve(&self, name: &str, subdirectory: Option<&str>) -> Result<PathBuf> {
        let base = self.base.as_ref().ok_or(LockboxError::InvalidConfiguration)?;
        let mut path = base.clone();
        if let Some(sub) = subdirectory {
            path.push(sub);
        }
        path.push(name);
        Ok(path)
    }

    fn full_path(&self, file: &str) -> Result<PathBuf> {
        self.resolve(file, None)
    }

    fn require_write_enabled(&self) -> Result<()> {
        if self.write_enabled {
            Ok(())
        } else {
            Err(LockboxError::WriteNotEnabled)
        }
    }

    // --- Write ---

    /// Write bytes under a logical name, using the default encryption
    /// policy (encrypt iff a provider is configured).
    pub fn write(&self, file: &str, data: &[u8]) -> Result<()> {
        self.write_with(file, data, &WriteOptions::default())
    }

    /// Write bytes under a logical name with explicit options.
    ///
    /// Intermediate directories are created as needed. On an encrypted
    /// write the key returned by the provider is persisted as an extended
    /// attribute after the content write; on an unencrypted write any
    /// stale key record from an earlier encrypted write is removed. When
    /// the store's do-not-backup policy is on, the backup-exclusion
    /// marking is applied fail-fast: its failure fails the write. The
    /// trailing last-access update is best-effort and never does.
    ///
    /// # Errors
    ///
    /// `WriteNotEnabled` while the kill switch is off;
    /// `EncryptionProviderNotConfigured` when encryption is requested (or
    /// defaulted) without a provider; `AttributeWriteFailed` when the key
    /// record cannot be persisted (the ciphertext is left on disk with no
    /// recoverable key); plus underlying I/O errors.
    pub fn write_with(&self, file: &str, data: &[u8], options: &WriteOptions) -> Result<()> {
        let path = self.full_path(file)?;
        self.require_write_enabled()?;

        let encrypt = options.encrypt.unwrap_or(self.provider.is_some());
        if encrypt && self.provider.is_none() {
            return Err(LockboxError::EncryptionProviderNotConfigured);
        }

        create_intermediate_directories(&path)?;

        if encrypt {
            let provider = self
                .provider
                .as_deref()
                .ok_or(LockboxError::EncryptionProviderNotConfigured)?;
            let (key, ciphertext) = provider.encrypt(data, options.key.as_deref())?;
            fs::write(&path, &ciphertext)?;
            // Key persistence must follow the content write. If it fails,
            // the ciphertext has no recoverable key; surface the failure.
            metadata::set_encryption_key(&path, &key)?;
        } else {
            fs::write(&path, data)?;
            metadata::clear_encryption_key(&path);
        }
        debug!(file, bytes = data.len(), encrypted = encrypt, "write");

        if self.do_not_back_up {
            metadata::set(&path, metadata::NO_BACKUP_ATTR, b"1")?;
        }
        metadata::touch_last_access(&path);
        Ok(())
    }

    /// Write a string as UTF-8 bytes.
    pub fn write_string(&self, file: &str, text: &str) -> Result<()> {
        self.write(file, text.as_bytes())
    }

    /// Serialize a value as JSON and write it.
    pub fn write_object<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.write(file, &data)
    }

    /// Append bytes to a file.
    ///
    /// A missing file falls back to a full unencrypted write. Each call
    /// is an independent open/write/close; sequential appends are not
    /// atomic or durable as a unit.
    ///
    /// # Errors
    ///
    /// `CannotAppendEncrypted` if the file has an encryption key on
    /// record (its content and key are left unchanged);
    /// `WriteNotEnabled` while the kill switch is off.
    pub fn append(&self, file: &str, data: &[u8]) -> Result<()> {
        let path = self.full_path(file)?;
        self.require_write_enabled()?;

        if metadata::encryption_key(&path).is_ok() {
            return Err(LockboxError::CannotAppendEncrypted(file.to_string()));
        }
        if !path.exists() {
            return self.write_with(file, data, &WriteOptions::plain());
        }

        let mut handle = OpenOptions::new().append(true).open(&path)?;
        handle.write_all(data)?;
        debug!(file, bytes = data.len(), "append");

        metadata::touch_last_access(&path);
        Ok(())
    }

    // --- Read ---

    /// Read a file's bytes.
    ///
    /// If an encryption key is on record the content is always treated as
    /// ciphertext and routed through the provider; otherwise the raw
    /// bytes are returned. A successful read updates the last-access
    /// record best-effort.
    ///
    /// # Errors
    ///
    /// `EncryptionProviderNotConfigured` when a key is on record but no
    /// provider is set; `Crypto` on decryption failure; underlying I/O
    /// errors (including not-found) propagate unchanged.
    pub fn read(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.full_path(file)?;

        let data = match metadata::encryption_key(&path) {
            Ok(key) => {
                let provider = self
                    .provider
                    .as_deref()
                    .ok_or(LockboxError::EncryptionProviderNotConfigured)?;
                let ciphertext = fs::read(&path)?;
                provider.decrypt(&ciphertext, &key)?
            }
            Err(_) => fs::read(&path)?,
        };
        debug!(file, bytes = data.len(), "read");

        metadata::touch_last_access(&path);
        Ok(data)
    }

    /// Read a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// `Encoding` if the content is not valid UTF-8.
    pub fn read_string(&self, file: &str) -> Result<String> {
        let data = self.read(file)?;
        String::from_utf8(data).map_err(|e| LockboxError::Encoding(e.to_string()))
    }

    /// Read a file and deserialize it from JSON.
    pub fn read_object<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let data = self.read(file)?;
        Ok(serde_json::from_slice(&data)?)
    }

    // --- Delete ---

    /// Remove a file.
    ///
    /// Extended attributes are part of the file on the supported
    /// platforms and disappear with it; no separate metadata cleanup
    /// happens here.
    pub fn delete(&self, file: &str) -> Result<()> {
        let path = self.full_path(file)?;
        self.require_write_enabled()?;
        fs::remove_file(&path)?;
        debug!(file, "delete");
        Ok(())
    }

    // --- Directories ---

    /// Create a directory (and any missing parents) under the base
    /// location.
    pub fn create_directory(&self, directory: &str) -> Result<()> {
        let path = self.full_path(directory)?;
        self.require_write_enabled()?;
        fs::create_dir_all(&path)?;
        Ok(())
    }

    /// List the names in a directory.
    ///
    /// A failed listing (e.g. the directory does not exist) yields an
    /// empty vector, not an error.
    pub fn contents(&self, directory: &str) -> Result<Vec<String>> {
        let path = self.full_path(directory)?;
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };
        Ok(entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect())
    }

    /// Whether the resolved name is an existing directory.
    pub fn is_directory(&self, name: &str, subdirectory: Option<&str>) -> bool {
        self.resolve(name, subdirectory)
            .map(|path| path.is_dir())
            .unwrap_or(false)
    }

    /// List the subdirectories of a directory.
    pub fn subdirectories(&self, directory: &str) -> Result<Vec<String>> {
        let names = self.contents(directory)?;
        Ok(names
            .into_iter()
            .filter(|name| self.is_directory(name, Some(directory)))
            .collect())
    }

    // --- Attributes ---

    /// Basic attributes of a file or directory.
    pub fn attributes(&self, file: &str) -> Result<FileAttributes> {
        let path = self.full_path(file)?;
        let metadata = fs::metadata(&path)?;
        Ok(FileAttributes::from_metadata(&metadata))
    }

    /// Read a named extended attribute.
    ///
    /// # Errors
    ///
    /// `AttributeNotFound` if the attribute is absent or empty.
    pub fn extended_attribute(&self, name: &str, file: &str) -> Result<Vec<u8>> {
        let path = self.full_path(file)?;
        metadata::get(&path, name)
    }

    /// Write a named extended attribute.
    ///
    /// # Errors
    ///
    /// `WriteNotEnabled` while the kill switch is off;
    /// `AttributeWriteFailed` if the platform call fails.
    pub fn set_extended_attribute(&self, name: &str, value: &[u8], file: &str) -> Result<()> {
        let path = self.full_path(file)?;
        self.require_write_enabled()?;
        metadata::set(&path, name, value)
    }

    /// Remove a named extended attribute. Best-effort: removing a
    /// nonexistent attribute is not an error and platform failures are
    /// not surfaced.
    pub fn remove_extended_attribute(&self, name: &str, file: &str) -> Result<()> {
        let path = self.full_path(file)?;
        metadata::remove(&path, name);
        Ok(())
    }

    /// List extended attribute names on a file. Empty when the file has
    /// none or the listing fails.
    pub fn extended_attribute_names(&self, file: &str) -> Result<Vec<String>> {
        let path = self.full_path(file)?;
        Ok(metadata::names(&path))
    }

    /// List extended attribute name/value pairs on a file, skipping any
    /// attribute that cannot be read back.
    pub fn extended_attribute_values(&self, file: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let path = self.full_path(file)?;
        Ok(metadata::names(&path)
            .into_iter()
            .filter_map(|name| {
                let value = metadata::get(&path, &name).ok()?;
                Some((name, value))
            })
            .collect())
    }

    /// The stored data-encryption key of an encrypted file.
    ///
    /// # Errors
    ///
    /// `AttributeNotFound` if the file has no key record, i.e. it is not
    /// encrypted.
    pub fn encryption_key(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.full_path(file)?;
        metadata::encryption_key(&path)
    }

    /// The recorded last-access timestamp, if one exists and decodes.
    pub fn last_access_date(&self, file: &str) -> Option<DateTime<Utc>> {
        let path = self.full_path(file).ok()?;
        metadata::last_access_date(&path)
    }

    /// Mark a file as excluded from backups.
    ///
    /// # Errors
    ///
    /// `WriteNotEnabled` while the kill switch is off;
    /// `AttributeWriteFailed` if the marking cannot be applied.
    pub fn exclude_from_backup(&self, file: &str) -> Result<()> {
        let path = self.full_path(file)?;
        self.require_write_enabled()?;
        metadata::set(&path, metadata::NO_BACKUP_ATTR, b"1")
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("base", &self.base)
            .field("do_not_back_up", &self.do_not_back_up)
            .field("write_enabled", &self.write_enabled)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

fn create_intermediate_directories(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_concatenates_base_and_name() {
        let store = FileStore::with_base("/data/app");
        let path = store.resolve("notes/today.txt", None).unwrap();
        assert_eq!(path, PathBuf::from("/data/app/notes/today.txt"));
    }

    #[test]
    fn test_resolve_with_subdirectory() {
        let store = FileStore::with_base("/data/app");
        let path = store.resolve("today.txt", Some("notes")).unwrap();
        assert_eq!(path, PathBuf::from("/data/app/notes/today.txt"));
    }

    #[test]
    fn test_resolve_without_base_fails() {
        let store = FileStore::new(
            StoreConfig::AppGroup {
                identifier: "group.lockbox.missing".to_string(),
                directory: "Test".to_string(),
            },
            false,
        );
        let result = store.resolve("a", None);
        assert!(matches!(result, Err(LockboxError::InvalidConfiguration)));
    }

    #[test]
    fn test_write_options_defaults() {
        let options = WriteOptions::default();
        assert_eq!(options.encrypt, None);
        assert!(options.key.is_none());

        assert_eq!(WriteOptions::plain().encrypt, Some(false));
        assert_eq!(WriteOptions::encrypted().encrypt, Some(true));
    }
}
