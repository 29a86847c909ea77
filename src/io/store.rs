/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Keyed binary table files
//!
//! A file holds a magic header, the key the table was stored under and the
//! bincode encoding of the table. Reading checks both the header and the key.
//! Floating point values, NaN included, round-trip bit for bit.

use super::errors::{Result, TableIoError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 8] = b"PMAPTBL1";

/// Key of the table written by the `map` command
pub const MAPPING_RESULTS_KEY: &str = "mapping_results";

/// Key of the table written by the `analyze` command
pub const BEST_MAPS_KEY: &str = "best_maps";

/// Store `table` under `key`, replacing any existing file
pub fn write_table<T: Serialize, P: AsRef<Path>>(path: P, key: &str, table: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    bincode::serialize_into(&mut writer, key)?;
    bincode::serialize_into(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

/// Load the table stored under `key`
pub fn read_table<T: DeserializeOwned, P: AsRef<Path>>(path: P, key: &str) -> Result<T> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);

    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .map_err(|_| TableIoError::FormatError(path.as_ref().display().to_string()))?;
    if &magic != MAGIC {
        return Err(TableIoError::FormatError(path.as_ref().display().to_string()));
    }

    let found: String = bincode::deserialize_from(&mut reader)?;
    if found != key {
        return Err(TableIoError::MissingKey {
            expected: key.to_string(),
            found,
        });
    }
    Ok(bincode::deserialize_from(&mut reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_key_is_checked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("values.hdf");
        write_table(&path, MAPPING_RESULTS_KEY, &vec![1.0f64, f64::NAN]).unwrap();

        let values: Vec<f64> = read_table(&path, MAPPING_RESULTS_KEY).unwrap();
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());

        assert!(matches!(
            read_table::<Vec<f64>, _>(&path, BEST_MAPS_KEY),
            Err(TableIoError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_foreign_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.hdf");
        std::fs::write(&path, b"<html></html>").unwrap();
        assert!(matches!(
            read_table::<Vec<f64>, _>(&path, MAPPING_RESULTS_KEY),
            Err(TableIoError::FormatError(_))
        ));
    }
}
