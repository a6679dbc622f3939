//! HTTP client for the booking backend's login endpoint.
//!
//! This module provides the `AuthClient` struct, the production
//! implementation of [`Authenticator`].

use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::utils::mask_email;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the booking backend
pub const DEFAULT_BASE_URL: &str = "https://bookitsy.ey.r.appspot.com/";

/// Device identifier attached to every login request
pub const DEFAULT_DEVICE_TOKEN: &str = "android_test_device";

/// Connect timeout in seconds. The login deadline itself is applied by
/// `SessionManager`, not here.
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Remote collaborator that exchanges credentials for a bearer token.
pub trait Authenticator: Send + Sync {
    fn authenticate<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> BoxFuture<'a, Result<LoginResponse>>;
}

/// Client for the booking backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client against the default backend
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Login rejected by server");
            Err(Error::RemoteAuth {
                status_code: status.as_u16(),
                body,
            })
        }
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let url = self.login_url();
        debug!(url = %url, email = %mask_email(&request.email), "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::unknown(format!("Failed to send login request: {}", e)))?;

        let response = Self::check_response(response).await?;

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| Error::unknown(format!("Failed to parse login response: {}", e)))
    }
}

impl Authenticator for AuthClient {
    fn authenticate<'a>(
        &'a self,
        request: &'a LoginRequest,
    ) -> BoxFuture<'a, Result<LoginResponse>> {
        self.login(request).boxed()
    }
}
