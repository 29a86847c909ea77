/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for structure mapping and result aggregation

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a mapping or analysis run
///
/// Per-pair infeasibility is not an error: it is recorded as an undefined
/// [`MappingRecord`](super::record::MappingRecord) instead.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Not in a project: no '.casm' directory found above {0}")]
    NotInProject(PathBuf),

    #[error("Invalid library ({0}) of structures")]
    InvalidParentLibrary(String),

    #[error("Reading child structures from {0} is not supported, expected a .json file")]
    UnsupportedChildFormat(PathBuf),

    #[error("Unrecognized path convention: {0}")]
    UnrecognizedPathConvention(String),

    #[error("Empty result set: {0}")]
    EmptyResultSet(String),

    #[error("Every mapping cost is undefined")]
    AllUndefinedCosts,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Structure error: {0}")]
    XtalError(#[from] crate::xtal::XtalError),

    #[error("Math error: {0}")]
    UtilsError(#[from] crate::utils::UtilsError),

    #[error("Table error: {0}")]
    TableError(String),
}

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;
