//! Login and encrypted caching of the session token.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::store::{with_store, SecureStore, StoreError, ACCESS_TOKEN_KEY, SAVED_EMAIL_KEY};
use crate::api::{Authenticator, LoginRequest, DEFAULT_DEVICE_TOKEN};
use crate::error::{Error, Result};
use crate::utils::{is_valid_email, mask_email};

/// Login deadline in milliseconds, measured from the moment the request
/// is issued.
pub const LOGIN_TIMEOUT_MS: u64 = 5000;

/// Bearer credential returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").field("token", &"<redacted>").finish()
    }
}

/// Login plus encrypted caching of the token and last used email.
///
/// Holds no session state of its own: every call opens the secure store,
/// does its work and releases it.
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn SecureStore>,
    device_token: String,
    login_timeout: Duration,
}

impl SessionManager {
    pub fn new(authenticator: Arc<dyn Authenticator>, store: Arc<dyn SecureStore>) -> Self {
        Self {
            authenticator,
            store,
            device_token: DEFAULT_DEVICE_TOKEN.to_string(),
            login_timeout: Duration::from_millis(LOGIN_TIMEOUT_MS),
        }
    }

    pub fn with_device_token(mut self, device_token: impl Into<String>) -> Self {
        self.device_token = device_token.into();
        self
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    fn validate(identifier: &str, secret: &str) -> Result<()> {
        if identifier.trim().is_empty() || secret.trim().is_empty() {
            return Err(Error::validation("Please fill all fields"));
        }
        if !is_valid_email(identifier) {
            return Err(Error::validation("Invalid email format"));
        }
        Ok(())
    }

    /// Authenticate once against the remote endpoint.
    ///
    /// Nothing is persisted; see [`SessionManager::login_and_remember`].
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Credential> {
        Self::validate(identifier, secret)?;

        let request = LoginRequest {
            email: identifier.to_string(),
            password: secret.to_string(),
            device_token: self.device_token.clone(),
        };

        let after_ms = self.login_timeout.as_millis() as u64;
        let response = tokio::time::timeout(
            self.login_timeout,
            self.authenticator.authenticate(&request),
        )
        .await
        .map_err(|_| {
            warn!(timeout_ms = after_ms, "Login timed out");
            Error::Timeout { after_ms }
        })??;

        info!(email = %mask_email(identifier), "Login successful");
        Ok(Credential {
            token: response.token,
        })
    }

    /// Log in and, only on success, cache the token and the email.
    pub async fn login_and_remember(&self, identifier: &str, secret: &str) -> Result<Credential> {
        let credential = self.login(identifier, secret).await?;

        // Opening the store derives a key and touches the disk
        let store = Arc::clone(&self.store);
        let token = credential.token.clone();
        let email = identifier.to_string();
        tokio::task::spawn_blocking(move || {
            put_entry(store.as_ref(), ACCESS_TOKEN_KEY, &token)?;
            put_entry(store.as_ref(), SAVED_EMAIL_KEY, &email)
        })
        .await
        .map_err(|e| Error::unknown(format!("Storing credentials failed: {}", e)))??;

        debug!("Stored access token and last used email");
        Ok(credential)
    }

    pub fn persist_credential(&self, token: &str) -> Result<()> {
        put_entry(self.store.as_ref(), ACCESS_TOKEN_KEY, token)?;
        debug!("Stored access token");
        Ok(())
    }

    pub fn persist_identifier(&self, identifier: &str) -> Result<()> {
        put_entry(self.store.as_ref(), SAVED_EMAIL_KEY, identifier)?;
        debug!("Stored last used email");
        Ok(())
    }

    fn read_saved_identifier(&self) -> std::result::Result<Option<String>, StoreError> {
        with_store(self.store.as_ref(), |h| h.get(SAVED_EMAIL_KEY))
    }

    /// Email to pre-fill on the login form. Store failures read as "none".
    pub fn load_saved_identifier(&self) -> Option<String> {
        match self.read_saved_identifier() {
            Ok(email) => email,
            Err(e) => {
                debug!(error = %e, "Could not read saved email");
                None
            }
        }
    }

    /// Cached bearer token, if any.
    pub fn load_credential(&self) -> Result<Option<Credential>> {
        let token = with_store(self.store.as_ref(), |h| h.get(ACCESS_TOKEN_KEY))?;
        Ok(token.map(|token| Credential { token }))
    }

    /// Forget the cached token. The saved email is kept for the next login.
    pub fn sign_out(&self) -> Result<()> {
        with_store(self.store.as_ref(), |h| h.remove(ACCESS_TOKEN_KEY))?;
        info!("Signed out");
        Ok(())
    }
}

fn put_entry(store: &dyn SecureStore, key: &str, value: &str) -> Result<()> {
    with_store(store, |h| h.put(key, value))?;
    Ok(())
}
