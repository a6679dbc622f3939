//! Authentication module: login and encrypted credential caching.
//!
//! This module provides:
//! - `SessionManager`: login with a fixed deadline, token and email caching
//! - `SecureStore`: scoped, encrypted key-value store abstraction
//! - `EncryptedFileStore`: file-backed store keyed from the OS keychain or a
//!   passphrase

pub mod encrypted;
pub mod keychain;
pub mod session;
pub mod store;

pub use encrypted::{EncryptedFileStore, KeySource, STORE_FILE};
pub use keychain::MasterKeyStore;
pub use session::{Credential, SessionManager, LOGIN_TIMEOUT_MS};
pub use store::{with_store, SecureStore, SecureStoreHandle, StoreError};
