//! Utility functions for string and time-of-day formatting.

pub mod format;

pub use format::{
    format_time, is_valid_email, mask_email, parse_time_of_day, truncate_body, truncate_string,
};
