//! Scoped access to an encrypted key-value store.
//!
//! A store is opened, used and closed within a single call. Nothing holds a
//! long-lived handle; [`with_store`] guarantees `close` runs on every exit
//! path of the closure, including errors.

use thiserror::Error;
use tracing::debug;

/// Store key holding the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Store key holding the last successfully used email
pub const SAVED_EMAIL_KEY: &str = "saved_email";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed")]
    Encrypt,

    #[error("Decryption failed - wrong key or tampered file")]
    Decrypt,

    #[error("Corrupt store: {0}")]
    Corrupt(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// An encrypted-at-rest, string-keyed store that is opened per use.
pub trait SecureStore: Send + Sync {
    fn open(&self) -> Result<Box<dyn SecureStoreHandle>, StoreError>;
}

/// An open store. Changes are durable only once `close` returns `Ok`.
pub trait SecureStoreHandle {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn close(self: Box<Self>) -> Result<(), StoreError>;
}

/// Open `store`, run `f` against the handle, and close it whatever `f`
/// returned. An error from `f` wins over an error from `close`.
pub fn with_store<T, F>(store: &dyn SecureStore, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut dyn SecureStoreHandle) -> Result<T, StoreError>,
{
    let mut handle = store.open()?;
    let result = f(&mut *handle);
    let closed = handle.close();

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                debug!(error = %close_err, "Close failed after store operation error");
            }
            Err(e)
        }
        (Ok(_), Err(e)) => Err(e),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store with open/close accounting and failure injection.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub entries: Arc<Mutex<HashMap<String, String>>>,
        pub opens: AtomicUsize,
        pub closes: Arc<AtomicUsize>,
        pub fail_open: AtomicBool,
        pub fail_put: AtomicBool,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_open() -> Self {
            let store = Self::default();
            store.fail_open.store(true, Ordering::SeqCst);
            store
        }

        pub fn value(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub fn open_count(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        pub fn close_count(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    impl SecureStore for MemoryStore {
        fn open(&self) -> Result<Box<dyn SecureStoreHandle>, StoreError> {
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("keystore locked".to_string()));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            let staged = self.entries.lock().unwrap().clone();
            Ok(Box::new(MemoryHandle {
                shared: Arc::clone(&self.entries),
                staged,
                closes: Arc::clone(&self.closes),
                fail_put: self.fail_put.load(Ordering::SeqCst),
            }))
        }
    }

    struct MemoryHandle {
        shared: Arc<Mutex<HashMap<String, String>>>,
        staged: HashMap<String, String>,
        closes: Arc<AtomicUsize>,
        fail_put: bool,
    }

    impl SecureStoreHandle for MemoryHandle {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.staged.get(key).cloned())
        }

        fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_put {
                return Err(StoreError::Encrypt);
            }
            self.staged.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.staged.remove(key);
            Ok(())
        }

        fn close(self: Box<Self>) -> Result<(), StoreError> {
            let MemoryHandle {
                shared,
                staged,
                closes,
                ..
            } = *self;
            closes.fetch_add(1, Ordering::SeqCst);
            *shared.lock().unwrap() = staged;
            Ok(())
        }
    }
}
