//! Shared utilities for API access, configuration and errors.
//!
//! Feature modules build on [`ApiClient`] so network behavior (timeouts, user
//! agent, error mapping) stays consistent. These helpers attach bearer tokens
//! supplied by callers but never store or log them.

pub mod api;
pub mod config;
pub mod errors;

pub use api::{ApiClient, ApiFailure, ErrorBody};
pub use config::ConsoleConfig;
pub use errors::ConsoleError;
