/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for writing and reading result tables

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while storing or loading tables
#[derive(Error, Debug)]
pub enum TableIoError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Encoding error: {0}")]
    EncodingError(#[from] bincode::Error),

    #[error("Rendering error: {0}")]
    RenderError(#[from] std::fmt::Error),

    #[error("Not a table file: {0}")]
    FormatError(String),

    #[error("Table key '{expected}' not found (file holds '{found}')")]
    MissingKey { expected: String, found: String },

    #[error("Unsupported output extension: {0} (expected .html or .hdf)")]
    UnsupportedExtension(PathBuf),
}

/// Result type for table IO
pub type Result<T> = std::result::Result<T, TableIoError>;
