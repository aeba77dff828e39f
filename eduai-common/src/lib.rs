//! # EduAI Common Library
//!
//! Shared code for the EduAI services including:
//! - Bootstrap configuration loading
//! - Session marker hashing and validation
//! - Common error types

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
