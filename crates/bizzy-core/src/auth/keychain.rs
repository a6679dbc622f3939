//! Master key for the encrypted store, kept in the OS keychain.

use keyring::Entry;
use rand::RngCore;
use tracing::{debug, info};

use super::store::StoreError;

/// Length of the store master key in bytes
pub const MASTER_KEY_LEN: usize = 32;

/// Keychain service name used when none is configured
pub const DEFAULT_SERVICE_NAME: &str = "bizzy";

/// Keychain account under which the store master key is kept
pub const DEFAULT_ACCOUNT: &str = "secure-prefs-master-key";

/// Master key for the encrypted store, held in the OS keychain.
pub struct MasterKeyStore;

impl MasterKeyStore {
    /// Fetch the master key, generating and storing a new one on first use
    pub fn load_or_create(
        service: &str,
        account: &str,
    ) -> Result<[u8; MASTER_KEY_LEN], StoreError> {
        let entry = Entry::new(service, account)?;

        match entry.get_secret() {
            Ok(secret) => {
                let key: [u8; MASTER_KEY_LEN] = secret.as_slice().try_into().map_err(|_| {
                    StoreError::Corrupt(format!(
                        "keychain master key has {} bytes, expected {}",
                        secret.len(),
                        MASTER_KEY_LEN
                    ))
                })?;
                debug!(service, "Loaded store master key from keychain");
                Ok(key)
            }
            Err(keyring::Error::NoEntry) => {
                let mut key = [0u8; MASTER_KEY_LEN];
                rand::thread_rng().fill_bytes(&mut key);
                entry.set_secret(&key)?;
                info!(service, "Created new store master key in keychain");
                Ok(key)
            }
            Err(e) => Err(e.into()),
        }
    }
}
