//! Extended-attribute metadata adapter.
//!
//! Two store conventions live in the attribute namespace: the per-file
//! encryption key and the last-access timestamp. Both ride on the same
//! primitive, attached to the file itself rather than a side index, so
//! their lifetime is the file's lifetime. The store reserves only these
//! literal names; callers are free to use the generic operations with any
//! other name.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{LockboxError, Result};

/// Attribute holding the data-encryption key of an encrypted file.
pub const ENCRYPTION_KEY_ATTR: &str = "user.lockbox.encryption-key";

/// Attribute holding the last-access timestamp.
pub const LAST_ACCESS_ATTR: &str = "user.lockbox.last-access-date";

/// Attribute marking a file as excluded from backups.
pub const NO_BACKUP_ATTR: &str = "user.lockbox.no-backup";

/// Fixed-width UTC timestamp format.
///
/// Microsecond precision, zero-padded fields. Timestamps written in
/// temporal order compare the same way lexically and parsed.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Read a named attribute.
///
/// # Errors
///
/// Returns `LockboxError::AttributeNotFound` if the attribute is absent,
/// empty, or the underlying call fails.
pub(crate) fn get(path: &Path, name: &str) -> Result<Vec<u8>> {
    match xattr::get(path, name) {
        Ok(Some(value)) if !value.is_empty() => Ok(value),
        _ => Err(LockboxError::AttributeNotFound(name.to_string())),
    }
}

/// Write a named attribute.
///
/// # Errors
///
/// Returns `LockboxError::AttributeWriteFailed` if the underlying call
/// reports non-success.
pub(crate) fn set(path: &Path, name: &str, value: &[u8]) -> Result<()> {
    xattr::set(path, name, value)
        .map_err(|e| LockboxError::AttributeWriteFailed(format!("{}: {}", name, e)))
}

/// Remove a named attribute. Best-effort: removing a nonexistent
/// attribute is not an error, and underlying failures are not surfaced.
pub(crate) fn remove(path: &Path, name: &str) {
    let _ = xattr::remove(path, name);
}

/// List attribute names on a file. Empty when the file has none or the
/// listing fails.
pub(crate) fn names(path: &Path) -> Vec<String> {
    match xattr::list(path) {
        Ok(attrs) => attrs
            .filter_map(|name| name.into_string().ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Look up the encryption key record. Presence of a non-empty record is
/// the sole signal that a file is encrypted.
pub(crate) fn encryption_key(path: &Path) -> Result<Vec<u8>> {
    get(path, ENCRYPTION_KEY_ATTR)
}

pub(crate) fn set_encryption_key(path: &Path, key: &[u8]) -> Result<()> {
    set(path, ENCRYPTION_KEY_ATTR, key)
}

/// Drop the encryption key record, if any.
pub(crate) fn clear_encryption_key(path: &Path) {
    remove(path, ENCRYPTION_KEY_ATTR);
}

/// Read back the last-access timestamp, if one was recorded and decodes.
pub(crate) fn last_access_date(path: &Path) -> Option<DateTime<Utc>> {
    let raw = get(path, LAST_ACCESS_ATTR).ok()?;
    let text = String::from_utf8(raw).ok()?;
    parse_timestamp(&text)
}

/// Record "now" as the last-access timestamp. Best-effort telemetry:
/// every failure is swallowed so it can never affect the read or write
/// that triggered it.
pub(crate) fn touch_last_access(path: &Path) {
    let stamp = format_timestamp(Utc::now());
    let _ = xattr::set(path, LAST_ACCESS_ATTR, stamp.as_bytes());
}

fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
