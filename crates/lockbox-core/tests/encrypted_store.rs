use std::fs;

use tempfile::TempDir;

use lockbox_core::{
    AesGcmProvider, EncryptionProvider, FileStore, LockboxError, Result, WriteOptions,
};

const TEST_STRING: &str = "String-AAABBBCCCDDD";

/// Stub provider that XORs bytes with a fixed key. Mirrors the shape of a
/// real provider: it "generates" its fixed key when the caller supplies
/// none, and replays whatever key it is handed on decrypt.
struct XorProvider {
    fixed_key: Vec<u8>,
}

impl XorProvider {
    fn new() -> Self {
        Self {
            fixed_key: vec![0x5A, 0xA5, 0x3C, 0xC3],
        }
    }

    fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(key.iter().cycle())
            .map(|(byte, k)| byte ^ k)
            .collect()
    }
}

impl EncryptionProvider for XorProvider {
    fn encrypt(&self, plaintext: &[u8], key: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)> {
        let key = key.map(<[u8]>::to_vec).unwrap_or_else(|| self.fixed_key.clone());
        let ciphertext = Self::xor(plaintext, &key);
        Ok((key, ciphertext))
    }

    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        Ok(Self::xor(ciphertext, key))
    }
}

fn encrypted_store() -> (TempDir, FileStore) {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = FileStore::with_base(dir.path());
    store.set_encryption_provider(Some(Box::new(AesGcmProvider)));
    (dir, store)
}

#[test]
fn test_encrypted_round_trip() {
    let (dir, store) = encrypted_store();
    let plaintext = b"secret bytes that must survive the round trip";

    store.write("secret", plaintext).expect("write should succeed");
    let data = store.read("secret").expect("read should succeed");
    assert_eq!(data, plaintext);

    let on_disk = fs::read(dir.path().join("secret")).expect("raw read should succeed");
    assert_ne!(on_disk, plaintext.to_vec());
}

#[test]
fn test_encrypted_write_persists_key_record() {
    let (_dir, store) = encrypted_store();

    store.write("keyed", b"payload").expect("write should succeed");

    let key = store.encryption_key("keyed").expect("key record should exist");
    assert!(!key.is_empty());
}

#[test]
fn test_key_record_disappears_with_file() {
    let (_dir, store) = encrypted_store();

    store.write("ephemeral", b"payload").expect("write should succeed");
    store.delete("ephemeral").expect("delete should succeed");

    let err = store
        .encryption_key("ephemeral")
        .expect_err("key lookup should fail");
    assert!(matches!(err, LockboxError::AttributeNotFound(_)));
}

#[test]
fn test_append_to_encrypted_file_is_refused() {
    let (dir, store) = encrypted_store();

    store.write("sealed", b"payload").expect("write should succeed");
    let key_before = store.encryption_key("sealed").expect("key should exist");
    let content_before = fs::read(dir.path().join("sealed")).expect("raw read should succeed");

    let err = store.append("sealed", b"more").expect_err("append should fail");
    assert!(matches!(err, LockboxError::CannotAppendEncrypted(_)));

    let key_after = store.encryption_key("sealed").expect("key should remain");
    let content_after = fs::read(dir.path().join("sealed")).expect("raw read should succeed");
    assert_eq!(key_before, key_after);
    assert_eq!(content_before, content_after);
}

#[test]
fn test_plain_rewrite_clears_stale_key_record() {
    let (_dir, store) = encrypted_store();

    store.write("flip", b"ciphertext era").expect("write should succeed");
    assert!(store.encryption_key("flip").is_ok());

    store
        .write_with("flip", b"plaintext era", &WriteOptions::plain())
        .expect("plain rewrite should succeed");

    let err = store
        .encryption_key("flip")
        .expect_err("stale key record should be cleared");
    assert!(matches!(err, LockboxError::AttributeNotFound(_)));

    let data = store.read("flip").expect("read should succeed");
    assert_eq!(data, b"plaintext era");
}

#[test]
fn test_explicit_encrypt_without_provider_fails() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = FileStore::with_base(dir.path());

    let err = store
        .write_with("a", b"data", &WriteOptions::encrypted())
        .expect_err("write should fail");
    assert!(matches!(err, LockboxError::EncryptionProviderNotConfigured));
    assert!(!dir.path().join("a").exists());
}

#[test]
fn test_read_of_encrypted_file_without_provider_fails() {
    let (_dir, mut store) = encrypted_store();

    store.write("orphan", b"payload").expect("write should succeed");
    store.set_encryption_provider(None);

    let err = store.read("orphan").expect_err("read should fail");
    assert!(matches!(err, LockboxError::EncryptionProviderNotConfigured));
}

#[test]
fn test_provider_presence_sets_default_policy_only() {
    let (_dir, store) = encrypted_store();

    store
        .write_with("opt-out", b"visible", &WriteOptions::plain())
        .expect("write should succeed");

    assert!(store.encryption_key("opt-out").is_err());
    assert_eq!(store.read("opt-out").expect("read should succeed"), b"visible");
}

#[test]
fn test_caller_supplied_key_is_stored() {
    let (_dir, store) = encrypted_store();
    let key = vec![9u8; 32];

    let options = WriteOptions {
        encrypt: Some(true),
        key: Some(key.clone()),
    };
    store
        .write_with("chosen", b"payload", &options)
        .expect("write should succeed");

    let stored = store.encryption_key("chosen").expect("key should exist");
    assert_eq!(stored, key);
    assert_eq!(store.read("chosen").expect("read should succeed"), b"payload");
}

#[test]
fn test_xor_stub_scenario() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = FileStore::with_base(dir.path());

    // Name "a": unencrypted.
    store.write_string("a", TEST_STRING).expect("write should succeed");
    assert_eq!(
        store.read_string("a").expect("read should succeed"),
        TEST_STRING
    );

    // Name "b": through the XOR stub provider.
    store.set_encryption_provider(Some(Box::new(XorProvider::new())));
    store.write_string("b", TEST_STRING).expect("write should succeed");
    assert_eq!(
        store.read_string("b").expect("read should succeed"),
        TEST_STRING
    );

    let raw = fs::read(dir.path().join("b")).expect("raw read should succeed");
    assert_ne!(raw, TEST_STRING.as_bytes().to_vec());
}

#[test]
fn test_encrypted_object_round_trip() {
    let (_dir, store) = encrypted_store();
    let value = vec!["alpha".to_string(), "beta".to_string()];

    store.write_object("list", &value).expect("write should succeed");
    let read: Vec<String> = store.read_object("list").expect("read should succeed");
    assert_eq!(read, value);
}
