//! Encryption provider abstraction and the bundled AES-GCM implementation.
//!
//! The store never inspects key material: it stores whatever key the
//! provider returns as an extended attribute on the encrypted file, and
//! replays it on decryption. Absence of a provider is modeled as an
//! explicit `Option` on the store, never as a no-op implementation, so the
//! provider-not-configured error path stays reachable.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{LockboxError, Result};

/// Capability performing symmetric encryption for files at rest.
///
/// Implementations must ensure:
/// - `decrypt(encrypt(p, k).1, encrypt(p, k).0) == p` for all plaintexts
/// - a fresh key is generated when the caller supplies none
/// - ciphertext is self-contained (any nonce/tag framing is embedded)
pub trait EncryptionProvider: Send + Sync {
    /// Encrypt `plaintext`, deriving or generating a key as needed.
    ///
    /// # Arguments
    ///
    /// * `plaintext` - The data to encrypt
    /// * `key` - Optional caller-supplied key; when `None` the provider
    ///   generates one
    ///
    /// # Returns
    ///
    /// Returns `(key, ciphertext)` where `key` is the key actually used.
    fn encrypt(&self, plaintext: &[u8], key: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Decrypt `ciphertext` with the given key.
    ///
    /// # Errors
    ///
    /// Returns `LockboxError::Crypto` if the key is wrong or the
    /// ciphertext is corrupted.
    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>>;
}

/// AES-256-GCM encryption provider.
///
/// Ciphertext layout is the random 96-bit nonce followed by the GCM
/// ciphertext and tag. Keys are 32 bytes; a fresh random key is generated
/// when the caller supplies none.
#[derive(Debug, Default, Clone, Copy)]
pub struct AesGcmProvider;

impl AesGcmProvider {
    const KEY_LENGTH: usize = 32;
    const NONCE_LENGTH: usize = 12;

    fn cipher(key: &[u8]) -> Result<Aes256Gcm> {
        if key.len() != Self::KEY_LENGTH {
            return Err(LockboxError::Crypto(format!(
                "Key must be {} bytes, got {}",
                Self::KEY_LENGTH,
                key.len()
            )));
        }
        Aes256Gcm::new_from_slice(key)
            .map_err(|e| LockboxError::Crypto(format!("Cipher init failed: {}", e)))
    }
}

impl EncryptionProvider for AesGcmProvider {
    fn encrypt(&self, plaintext: &[u8], key: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)> {
        let key = match key {
            Some(key) => key.to_vec(),
            None => {
                let mut bytes = vec![0u8; Self::KEY_LENGTH];
                OsRng.fill_bytes(&mut bytes);
                bytes
            }
        };
        let cipher = Self::cipher(&key)?;

        let mut nonce_bytes = [0u8; Self::NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| LockboxError::Crypto(format!("Encryption failed: {}", e)))?;

        let mut framed = Vec::with_capacity(Self::NONCE_LENGTH + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);
        Ok((key, framed))
    }

    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < Self::NONCE_LENGTH {
            return Err(LockboxError::Crypto(
                "Ciphertext shorter than nonce".to_string(),
            ));
        }
        let cipher = Self::cipher(key)?;
        let (nonce_bytes, body) = ciphertext.split_at(Self::NONCE_LENGTH);
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher
            .decrypt(nonce, body)
            .map_err(|e| LockboxError::Crypto(format!("Decryption failed: {}", e)))
    }
}
