//! Error taxonomy shared by the session and reservation cores.

use thiserror::Error;

use crate::auth::StoreError;
use crate::utils::truncate_body;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No response within {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Authentication rejected with status {status_code}: {body}")]
    RemoteAuth { status_code: u16, body: String },

    #[error("Reservation not found: {id}")]
    NotFound { id: String },

    #[error("Unexpected failure: {message}")]
    Unknown { message: String },

    #[error("Secure store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Error::Unknown {
            message: msg.into(),
        }
    }

    /// Single line suitable for a transient notice to the user.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Timeout { .. } => "Connection timed out. Please try again.".to_string(),
            Error::RemoteAuth { status_code, .. } if matches!(*status_code, 401 | 403) => {
                "Invalid email or password".to_string()
            }
            Error::RemoteAuth { status_code, body } => {
                let body = truncate_body(body.trim());
                if body.is_empty() {
                    format!("Login failed: HTTP {}", status_code)
                } else {
                    format!("Login failed: HTTP {} - {}", status_code, body)
                }
            }
            Error::NotFound { .. } => "That reservation no longer exists".to_string(),
            Error::Unknown { message } => format!("Login failed: {}", message),
            Error::Store(_) => "Could not access secure storage".to_string(),
        }
    }
}
