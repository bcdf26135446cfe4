//! Core error types for the borrower portal.
//!
//! This module provides [`PortalError`], covering the failures that can occur
//! while configuring the portal or building documents, and [`ValidationError`],
//! the user-correctable message attached to a single form field.
//!
//! Validation errors are never propagated out of an event handler: they are
//! rendered next to the offending field and recomputed on every pass.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A user-correctable validation failure for one form field.
///
/// # Examples
///
/// ```
/// use portal_core::error::ValidationError;
///
/// let err = ValidationError::new("Name is required.", "required");
/// assert_eq!(err.to_string(), "Name is required.");
/// assert_eq!(err.code, "required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The display message, already translated.
    pub message: String,
    /// A short code identifying the failed rule (e.g. "required", "invalid").
    pub code: String,
    /// Additional parameters providing context for the message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the borrower portal.
#[derive(Error, Debug)]
pub enum PortalError {
    // ── Documents ────────────────────────────────────────────────────

    /// A CSS selector could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A node id does not refer to a node of the document.
    #[error("Node not found: {0}")]
    NodeNotFound(usize),

    // ── Validation ───────────────────────────────────────────────────

    /// A field failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ValidationError> for PortalError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

/// A convenience type alias for `Result<T, PortalError>`.
pub type PortalResult<T> = Result<T, PortalError>;
