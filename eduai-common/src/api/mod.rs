//! Shared HTTP API functionality
//!
//! Contains ONLY pure functions and shared types. Each service wraps these
//! with framework-specific middleware (Axum, etc.).

pub mod auth;

pub use auth::{
    calculate_session_hash, current_timestamp_ms, validate_session, validate_timestamp,
    SessionAuthError, SessionWindow, HASH_HEADER, TIMESTAMP_HEADER,
};
