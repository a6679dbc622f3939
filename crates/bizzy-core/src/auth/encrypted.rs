//! File-backed implementation of [`SecureStore`].
//!
//! The whole key-value map is serialized to JSON and sealed with
//! XChaCha20-Poly1305. File layout:
//!
//! ```text
//! magic "BZS1" (4) | salt (16) | nonce (24) | ciphertext + tag
//! ```
//!
//! The salt is only meaningful for [`KeySource::Passphrase`], where the key
//! is derived with Argon2. It is written for every file so the layout does
//! not depend on the key source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use argon2::Argon2;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use tracing::debug;

use super::keychain::{MasterKeyStore, MASTER_KEY_LEN};
use super::store::{SecureStore, SecureStoreHandle, StoreError};

const MAGIC: &[u8; 4] = b"BZS1";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = MAGIC.len() + SALT_LEN + NONCE_LEN;

/// Default file name of the store inside the data directory
pub const STORE_FILE: &str = "secure_prefs.bin";

/// Where the 32-byte store key comes from.
#[derive(Clone)]
pub enum KeySource {
    /// Random key kept in the OS keychain, created on first use
    Keyring { service: String, account: String },
    /// Key derived from a passphrase with Argon2 and the file salt
    Passphrase(String),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Keyring { service, account } => f
                .debug_struct("Keyring")
                .field("service", service)
                .field("account", account)
                .finish(),
            KeySource::Passphrase(_) => f.write_str("Passphrase(..)"),
        }
    }
}

impl KeySource {
    fn resolve(&self, salt: &[u8; SALT_LEN]) -> Result<[u8; MASTER_KEY_LEN], StoreError> {
        match self {
            KeySource::Keyring { service, account } => {
                MasterKeyStore::load_or_create(service, account)
            }
            KeySource::Passphrase(passphrase) => {
                let mut key = [0u8; MASTER_KEY_LEN];
                Argon2::default()
                    .hash_password_into(passphrase.as_bytes(), salt, &mut key)
                    .map_err(|e| StoreError::KeyDerivation(e.to_string()))?;
                Ok(key)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncryptedFileStore {
    path: PathBuf,
    key_source: KeySource,
}

impl EncryptedFileStore {
    pub fn new(path: impl Into<PathBuf>, key_source: KeySource) -> Self {
        Self {
            path: path.into(),
            key_source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecureStore for EncryptedFileStore {
    fn open(&self) -> Result<Box<dyn SecureStoreHandle>, StoreError> {
        if !self.path.exists() {
            let mut salt = [0u8; SALT_LEN];
            rand::thread_rng().fill_bytes(&mut salt);
            let key = self.key_source.resolve(&salt)?;
            debug!(path = %self.path.display(), "Opened new secure store");
            return Ok(Box::new(EncryptedFileHandle {
                path: self.path.clone(),
                key,
                salt,
                entries: BTreeMap::new(),
                dirty: false,
            }));
        }

        let bytes = std::fs::read(&self.path)?;
        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(StoreError::Corrupt(format!(
                "file is {} bytes, shorter than header",
                bytes.len()
            )));
        }
        if &bytes[..MAGIC.len()] != MAGIC {
            return Err(StoreError::Corrupt("bad magic".to_string()));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[MAGIC.len()..MAGIC.len() + SALT_LEN]);
        let nonce = XNonce::from_slice(&bytes[MAGIC.len() + SALT_LEN..HEADER_LEN]);

        let key = self.key_source.resolve(&salt)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        let plaintext = cipher
            .decrypt(nonce, &bytes[HEADER_LEN..])
            .map_err(|_| StoreError::Decrypt)?;
        let entries: BTreeMap<String, String> = serde_json::from_slice(&plaintext)?;

        debug!(path = %self.path.display(), keys = entries.len(), "Opened secure store");
        Ok(Box::new(EncryptedFileHandle {
            path: self.path.clone(),
            key,
            salt,
            entries,
            dirty: false,
        }))
    }
}

struct EncryptedFileHandle {
    path: PathBuf,
    key: [u8; MASTER_KEY_LEN],
    salt: [u8; SALT_LEN],
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl EncryptedFileHandle {
    fn seal(&self) -> Result<Vec<u8>, StoreError> {
        let plaintext = serde_json::to_vec(&self.entries)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.key));
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| StoreError::Encrypt)?;

        let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }
}

impl SecureStoreHandle for EncryptedFileHandle {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        let sealed = self.seal()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Replace via rename; readers never see a partial file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, sealed)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), keys = self.entries.len(), "Saved secure store");
        Ok(())
    }
}
