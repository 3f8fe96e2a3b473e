//! Centralized error handling for the M3U Player application
//!
//! # Error Categories
//!
//! - **Parse Errors**: invalid arguments, cancellation and stream read failures
//! - **Source Errors**: remote playlist fetching
//! - **Web Errors**: HTTP request handling issues
//! - **Validation Errors**: input validation at the API boundary
//!
//! # Usage
//!
//! ```rust
//! use m3u_player::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("playlist id is required"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for parser Results
pub type ParseResult<T> = Result<T, ParseError>;

