//! Centralized error handling for the trademark analyzer
//!
//! Every layer reports failures through the types in [`types`]. Most of them
//! never reach a client: instruction fetch failures degrade to cached or
//! fallback text and model failures degrade to a default comparison record.
//! What does surface is mapped to an HTTP status in `web::responses`.
//!
//! # Error Categories
//!
//! - **Instruction Errors**: invalid document URL, remote fetch failures
//! - **Model Errors**: missing credential, API failures, empty replies
//! - **Response Shape Errors**: model output that fails schema validation
//! - **Export Errors**: document rendering failures
//! - **Validation / Not Found**: request-level problems
//!
//! # Usage
//!
//! ```rust
//! use tm_analyzer::errors::{AppError, AppResult};
//!
//! fn require_name(name: &str) -> AppResult<&str> {
//!     if name.trim().is_empty() {
//!         return Err(AppError::validation("name is required"));
//!     }
//!     Ok(name)
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for instruction cache Results
pub type InstructionResult<T> = Result<T, InstructionError>;

/// Convenience type alias for language model Results
pub type LlmResult<T> = Result<T, LlmError>;
