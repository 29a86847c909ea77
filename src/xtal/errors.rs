/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the xtal module

use thiserror::Error;

/// Error types for crystal structure handling
#[derive(Debug, Error)]
pub enum XtalError {
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("Atom type count ({given}) does not match number of sites ({expected})")]
    SiteCountMismatch { given: usize, expected: usize },

    #[error("Math error: {0}")]
    MathError(#[from] crate::utils::UtilsError),
}

/// Result type for xtal operations
pub type Result<T> = std::result::Result<T, XtalError>;
