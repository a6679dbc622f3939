//! Core library for the bizzy booking client.
//!
//! Two independent cores:
//! - [`auth::SessionManager`]: login against the booking backend and
//!   encrypted caching of the token and last used email
//! - [`reservations::ReservationStore`]: in-memory reservations, slot
//!   lookup, edits and drag-to-reschedule
//!
//! The presentation layer drives both; they share no state.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod reservations;
pub mod utils;

pub use error::{Error, Result};
