use chrono::{NaiveTime, Timelike};

/// Maximum length for error response bodies in user-facing messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Display format for reservation times on the hour grid
const TIME_FORMAT: &str = "%H:%M";

/// Used when the time carries seconds, so no precision is dropped
const TIME_FORMAT_SECONDS: &str = "%H:%M:%S%.f";

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Truncate a response body to avoid showing or logging excessive data
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

/// Format a time-of-day as `HH:MM`, or `HH:MM:SS[.fff]` when it has seconds
pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format(TIME_FORMAT).to_string()
    } else {
        time.format(TIME_FORMAT_SECONDS).to_string()
    }
}

/// Parse a time-of-day typed by the user.
///
/// Accepts `HH:MM`, `HH:MM:SS` and `HH:MM:SS.fff` with two-digit fields.
/// Single-digit hours ("9:00") and out of range values, including the
/// leap second `60`, are rejected.
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let bytes = s.as_bytes();
    if bytes.len() < 5 || bytes[2] != b':' {
        return None;
    }
    let two_digits = |i: usize| bytes[i].is_ascii_digit() && bytes[i + 1].is_ascii_digit();
    if !two_digits(0) || !two_digits(3) {
        return None;
    }
    if bytes.len() > 5 && (bytes.len() < 8 || bytes[5] != b':' || !two_digits(6)) {
        return None;
    }

    ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        // chrono represents a leap second as nanosecond >= 1_000_000_000
        .filter(|time| time.nanosecond() < 1_000_000_000)
}

/// Check that a string looks like an email address.
///
/// Local part of `A-Za-z0-9+._%-` characters, then `@`, then a domain of at
/// least two dot-separated labels, each starting with an alphanumeric.
pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    let local_ok = (1..=256).contains(&local.len())
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '_' | '%' | '-'));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().enumerate().all(|(i, label)| {
        let max_len = if i == 0 { 65 } else { 26 };
        let mut chars = label.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphanumeric() => {
                label.len() <= max_len && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
            }
            _ => false,
        }
    })
}

/// Email form safe for log files: first character of the local part and
/// the domain, e.g. `a***@example.com`.
pub fn mask_email(s: &str) -> String {
    match s.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{}***@{}", first, domain),
            None => format!("***@{}", domain),
        },
        None => "***".to_string(),
    }
}
