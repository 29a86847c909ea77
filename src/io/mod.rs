/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Writing and reading result tables
//!
//! Tables are written as HTML for reading or as a keyed binary file that the
//! `analyze` command can load again. The format follows the output extension.

pub mod errors;
pub mod html;
pub mod store;

pub use errors::{Result, TableIoError};
pub use html::{best_match_table_to_html, result_table_to_html};
pub use store::{read_table, write_table, BEST_MAPS_KEY, MAPPING_RESULTS_KEY};

use crate::mapping::{BestMatchTable, ResultTable};
use std::fs;
use std::path::Path;

/// Output format chosen from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `.html`
    Html,
    /// `.hdf`, `.h5` or `.hdf5`
    Binary,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("html") | Some("htm") => Ok(Self::Html),
            Some("hdf") | Some("h5") | Some("hdf5") => Ok(Self::Binary),
            _ => Err(TableIoError::UnsupportedExtension(path.to_path_buf())),
        }
    }
}

/// Write mapping results in the format given by the extension of `path`
pub fn write_result_table<P: AsRef<Path>>(path: P, table: &ResultTable) -> Result<()> {
    let path = path.as_ref();
    match OutputFormat::from_path(path)? {
        OutputFormat::Html => fs::write(path, result_table_to_html(table)?)?,
        OutputFormat::Binary => write_table(path, MAPPING_RESULTS_KEY, table)?,
    }
    Ok(())
}

/// Read mapping results written by [`write_result_table`]
pub fn read_result_table<P: AsRef<Path>>(path: P) -> Result<ResultTable> {
    read_table(path, MAPPING_RESULTS_KEY)
}

/// Write best matches in the format given by the extension of `path`
pub fn write_best_match_table<P: AsRef<Path>>(path: P, table: &BestMatchTable) -> Result<()> {
    let path = path.as_ref();
    match OutputFormat::from_path(path)? {
        OutputFormat::Html => fs::write(path, best_match_table_to_html(table)?)?,
        OutputFormat::Binary => write_table(path, BEST_MAPS_KEY, table)?,
    }
    Ok(())
}
