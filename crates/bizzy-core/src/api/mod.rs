//! REST client module for the booking backend.
//!
//! Only the login endpoint is consumed: `POST {base}/login` with
//! `{email, password, device_token}`, answered by `{token}`.

pub mod client;

pub use client::{
    AuthClient, Authenticator, LoginRequest, LoginResponse, DEFAULT_BASE_URL, DEFAULT_DEVICE_TOKEN,
};
