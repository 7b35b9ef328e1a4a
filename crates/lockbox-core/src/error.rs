//! Error types for lockbox operations.
//!
//! Every public operation either returns a value or fails with exactly one
//! of these variants. Underlying I/O errors (including not-found) are
//! propagated unchanged through the `Io` variant.

use thiserror::Error;

/// Result type alias for lockbox operations.
pub type Result<T> = std::result::Result<T, LockboxError>;

/// Core error type for lockbox operations.
#[derive(Debug, Error)]
pub enum LockboxError {
    /// No base location could be resolved from the store configuration
    #[error("No base location configured")]
    InvalidConfiguration,

    /// A mutating operation was attempted while writes are disabled
    #[error("Writes are disabled")]
    WriteNotEnabled,

    /// Text encoding or decoding failure
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An encrypted operation was attempted without an encryption provider
    #[error("Encryption provider not configured")]
    EncryptionProviderNotConfigured,

    /// The named extended attribute is absent or empty
    #[error("Extended attribute not found: {0}")]
    AttributeNotFound(String),

    /// The platform refused to write the named extended attribute
    #[error("Extended attribute write failed: {0}")]
    AttributeWriteFailed(String),

    /// Append was attempted on a file with an encryption key on record
    #[error("Cannot append to encrypted file: {0}")]
    CannotAppendEncrypted(String),

    /// Encryption or decryption error from the provider
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// I/O error from the underlying filesystem
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}
