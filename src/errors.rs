//! # Application Error Types
//!
//! This module defines common error types used throughout the kitchen-parsing
//! library. The parsing operations themselves never fail — unrecognized input
//! degrades to pass-through or `unknown` results — so these errors only
//! surface from constructors handed invalid custom tables or patterns.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors (custom vocabulary tables, patterns)
    Config(String),
    /// Validation errors (inputs, field values)
    Validation(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Config(format!("invalid pattern: {}", err))
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
