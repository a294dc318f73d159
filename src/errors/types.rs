//! Error type definitions for the trademark analyzer
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that keeps the degrade-to-default
//! call sites explicit about what went wrong.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all errors that can reach a request handler. It uses
/// `thiserror` to provide automatic error trait implementations and proper
/// error chaining from the component-level errors below.
#[derive(Error, Debug)]
pub enum AppError {
    /// Instruction cache errors
    #[error("Instruction error: {0}")]
    Instructions(#[from] InstructionError),

    /// Language model errors
    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    /// Document export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while resolving or fetching the remote instruction document
#[derive(Error, Debug)]
pub enum InstructionError {
    /// The configured document URL does not identify a document
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    /// Network-level failure talking to the document host
    #[error("Fetch failed: {url} - {message}")]
    Fetch { url: String, message: String },

    /// The document host answered with a non-success status
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// The export endpoint returned an empty body
    #[error("Document is empty: {url}")]
    EmptyDocument { url: String },
}

/// Errors raised by the language model client
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API credential configured
    #[error("API key is not configured")]
    MissingCredential,

    /// Client construction failed
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Transport failure
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with an error status
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// The API answered without any message content
    #[error("API returned empty response")]
    EmptyResponse,
}

/// Model reply did not match the comparison result schema
#[derive(Error, Debug)]
pub enum ResponseShapeError {
    /// Reply is not valid JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply is valid JSON but not an object
    #[error("expected a JSON object, got {found}")]
    NotAnObject { found: String },

    /// A field has the wrong type or an unusable value
    #[error("invalid field `{field}`: {message}")]
    InvalidField { field: String, message: String },

    /// A score lies outside 0..=100
    #[error("field `{field}` out of range: {value} (expected 0-100)")]
    OutOfRange { field: String, value: i64 },
}

/// Document rendering errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// Unknown export format requested
    #[error("Unsupported export format: {format}")]
    UnsupportedFormat { format: String },

    /// ZIP packaging failed while building a DOCX file
    #[error("DOCX packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// PDF object model or serialization failed
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Writing to the in-memory buffer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl InstructionError {
    /// Create an invalid config error
    pub fn invalid_config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl ResponseShapeError {
    /// Create an invalid field error
    pub fn invalid_field<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
