/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the utils module

use thiserror::Error;

/// Errors that can occur in the utils module
#[derive(Error, Debug)]
pub enum UtilsError {
    /// Generic error with a message
    #[error("Utility error: {0}")]
    Generic(String),

    /// Math-related errors
    #[error("Math error: {0}")]
    Math(String),

    /// Matrix could not be inverted
    #[error("Singular matrix: determinant {0:e}")]
    SingularMatrix(f64),

    /// Matrix shape does not fit the operation
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// A specialized Result type for utils operations
pub type Result<T> = std::result::Result<T, UtilsError>;
