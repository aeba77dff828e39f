//! Session marker validation via timestamp and hash
//!
//! # Scheme
//!
//! - Requests carry a Unix epoch timestamp (ms) and a SHA-256 hash
//! - Hash is calculated over the decimal timestamp followed by the shared secret
//! - Timestamp must fall inside the configured acceptance window
//! - A shared secret of 0 disables checking entirely

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Header carrying the session timestamp (Unix epoch ms)
pub const TIMESTAMP_HEADER: &str = "x-eduai-timestamp";

/// Header carrying the session hash (64 hex chars)
pub const HASH_HEADER: &str = "x-eduai-hash";

/// Session validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuthError {
    /// Timestamp outside acceptable window
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    InvalidHash { provided: String, calculated: String },
}

impl std::fmt::Display for SessionAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionAuthError::InvalidTimestamp { reason, .. } => {
                write!(f, "Invalid timestamp: {}", reason)
            }
            SessionAuthError::InvalidHash { .. } => write!(f, "Invalid hash"),
        }
    }
}

impl std::error::Error for SessionAuthError {}

/// Acceptance window around the server clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    /// Oldest accepted timestamp, ms before now
    pub max_age_ms: i64,
    /// Newest accepted timestamp, ms after now
    pub max_skew_ms: i64,
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            max_age_ms: 5 * 60 * 1000,
            max_skew_ms: 1000,
        }
    }
}

/// Current time as Unix epoch milliseconds
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Validate timestamp against the window, relative to `now`
///
/// # Examples
///
/// ```
/// use eduai_common::api::auth::{validate_timestamp, SessionWindow};
///
/// let window = SessionWindow { max_age_ms: 1000, max_skew_ms: 1 };
/// let now = 1_730_000_000_000;
///
/// assert!(validate_timestamp(now - 500, now, window).is_ok());
/// assert!(validate_timestamp(now - 2000, now, window).is_err());
/// assert!(validate_timestamp(now + 50, now, window).is_err());
/// ```
pub fn validate_timestamp(
    timestamp: i64,
    now: i64,
    window: SessionWindow,
) -> Result<(), SessionAuthError> {
    let Some(diff) = now.checked_sub(timestamp) else {
        return Err(SessionAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: "Timestamp out of range".to_string(),
        });
    };

    if diff > window.max_age_ms {
        return Err(SessionAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms too old (max {}ms past)",
                diff, window.max_age_ms
            ),
        });
    }

    if diff < -window.max_skew_ms {
        return Err(SessionAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                diff.unsigned_abs(),
                window.max_skew_ms
            ),
        });
    }

    Ok(())
}

/// Calculate the session hash for a timestamp
///
/// SHA-256 over the decimal timestamp immediately followed by the decimal
/// shared secret, rendered as 64 lowercase hex characters.
///
/// # Examples
///
/// ```
/// use eduai_common::api::auth::calculate_session_hash;
///
/// let hash = calculate_session_hash(1730000000000, 123456789);
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, calculate_session_hash(1730000000000, 123456789));
/// ```
pub fn calculate_session_hash(timestamp: i64, shared_secret: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}{}", timestamp, shared_secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validate a full session marker (timestamp window, then hash)
pub fn validate_session(
    timestamp: i64,
    hash: &str,
    shared_secret: i64,
    window: SessionWindow,
) -> Result<(), SessionAuthError> {
    validate_timestamp(timestamp, current_timestamp_ms(), window)?;

    let calculated = calculate_session_hash(timestamp, shared_secret);
    if !calculated.eq_ignore_ascii_case(hash.trim()) {
        return Err(SessionAuthError::InvalidHash {
            provided: hash.to_string(),
            calculated,
        });
    }

    Ok(())
}
