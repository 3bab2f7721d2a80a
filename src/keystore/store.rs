//! Directory-backed key store.
//!
//! Each key is an empty file whose name is the `0x`-prefixed hex private key.
//! The directory is either reused as-is (entry count matches) or wiped and
//! regenerated in full.

use std::fs;
use std::path::{Path, PathBuf};

use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

/// Errors raised while provisioning key material.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// Filesystem operation on the key directory failed.
    #[error("Key store {action} failed for {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry in the key directory has a non UTF-8 name.
    #[error("Key file name is not valid UTF-8: {0}")]
    InvalidFileName(PathBuf),
}

type Result<T> = std::result::Result<T, KeyStoreError>;

/// A private key recovered from (or persisted as) a file name.
///
/// The value is opaque here; parsing happens when a wallet is built.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyRecord(String);

impl KeyRecord {
    /// Wrap a hex-encoded key.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Hex-encoded private key.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyRecord(<redacted>)")
    }
}

/// Key material provisioning backed by a local directory.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Create a key store rooted at `dir`. Nothing is touched until
    /// [`KeyStore::ensure_keys`] runs.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return exactly `count` key records, reusing the directory when it
    /// already holds `count` entries and regenerating it otherwise.
    pub fn ensure_keys(&self, count: usize) -> Result<Vec<KeyRecord>> {
        if self.dir.is_dir() {
            let existing = self.read_keys()?;
            if existing.len() == count {
                tracing::info!(dir = %self.dir.display(), count, "Reusing provisioned keys");
                return Ok(existing);
            }
            tracing::info!(
                dir = %self.dir.display(),
                found = existing.len(),
                wanted = count,
                "Key count mismatch, regenerating"
            );
        }

        self.regenerate(count)
    }

    /// Read key records back from file names, sorted.
    pub fn read_keys(&self) -> Result<Vec<KeyRecord>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| self.io_error("read", e))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error("read", e))?;
            let name = entry
                .file_name()
                .into_string()
                .map_err(|_| KeyStoreError::InvalidFileName(entry.path()))?;
            records.push(KeyRecord(name));
        }
        records.sort();

        Ok(records)
    }

    fn regenerate(&self, count: usize) -> Result<Vec<KeyRecord>> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir).map_err(|e| self.io_error("clear", e))?;
        }
        fs::create_dir_all(&self.dir).map_err(|e| self.io_error("create", e))?;

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let signer = PrivateKeySigner::random();
            let record = KeyRecord(alloy::hex::encode_prefixed(signer.to_bytes()));

            let path = self.dir.join(record.as_hex());
            fs::File::create(&path).map_err(|source| KeyStoreError::Io {
                action: "write",
                path,
                source,
            })?;
            records.push(record);
        }
        records.sort();

        metrics::counter!("multisend_keys_generated_total").increment(count as u64);
        tracing::info!(dir = %self.dir.display(), count, "Generated fresh keys");

        Ok(records)
    }

    fn io_error(&self, action: &'static str, source: std::io::Error) -> KeyStoreError {
        KeyStoreError::Io {
            action,
            path: self.dir.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_generates_into_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KeyStore::new(tmp.path().join("keys"));

        let keys = store.ensure_keys(3).unwrap();

        assert_eq!(keys.len(), 3);
        assert_eq!(file_count(store.dir()), 3);
        for key in &keys {
            let path = store.dir().join(key.as_hex());
            assert_eq!(fs::metadata(path).unwrap().len(), 0);
            // 0x + 64 hex digits
            assert_eq!(key.as_hex().len(), 66);
            assert!(key.as_hex().starts_with("0x"));
        }
    }

    #[test]
    fn test_reuse_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KeyStore::new(tmp.path().join("keys"));

        let first = store.ensure_keys(2).unwrap();
        let second = store.ensure_keys(2).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_count_mismatch_regenerates() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("keys");
        fs::create_dir_all(&dir).unwrap();
        fs::File::create(dir.join("0x01")).unwrap();
        fs::File::create(dir.join("0x02")).unwrap();

        let store = KeyStore::new(&dir);
        let keys = store.ensure_keys(1).unwrap();

        assert_eq!(keys.len(), 1);
        assert_eq!(file_count(&dir), 1);
        assert!(!dir.join("0x01").exists());
        assert!(!dir.join("0x02").exists());
    }

    #[test]
    fn test_empty_dir_counts_as_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KeyStore::new(tmp.path());

        let keys = store.ensure_keys(1).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(file_count(tmp.path()), 1);
    }

    #[test]
    fn test_debug_redacts_key() {
        let record = KeyRecord::new("0xabc");
        assert!(!format!("{:?}", record).contains("abc"));
    }

    #[test]
    fn test_unwritable_location_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::File::create(&blocker).unwrap();

        // A regular file in the path prevents directory creation.
        let store = KeyStore::new(blocker.join("keys"));
        let err = store.ensure_keys(1).unwrap_err();
        assert!(matches!(err, KeyStoreError::Io { action: "create", .. }));
    }
}
