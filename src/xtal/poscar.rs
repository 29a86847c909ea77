/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! VASP POSCAR reader used for parent crystal structures
//!
//! ```text
//! Comment line
//! 1.0                    # scaling factor (negative: target volume)
//! a1 a2 a3               # lattice vectors as rows
//! b1 b2 b3
//! c1 c2 c3
//! A B                    # species (optional, VASP 5+)
//! 1 2                    # atoms per species
//! Selective dynamics     # optional
//! Direct                 # or Cartesian
//! x y z ...
//! ```

use super::errors::{Result, XtalError};
use super::lattice::Lattice;
use super::structure::{Prim, Structure};
use crate::utils::matrix3;
use ndarray::Array2;
use std::fs;
use std::path::Path;

/// Structure read from a POSCAR file together with its comment line
#[derive(Debug, Clone)]
pub struct Poscar {
    pub title: String,
    pub structure: Structure,
}

impl Poscar {
    pub fn into_prim(self) -> Prim {
        Prim::from_structure(&self.structure)
    }
}

/// Parse a POSCAR file
pub fn read_poscar<P: AsRef<Path>>(path: P) -> Result<Poscar> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_poscar(&contents).map_err(|err| match err {
        XtalError::ParseError(reason) => {
            XtalError::ParseError(format!("{}: {}", path.as_ref().display(), reason))
        }
        other => other,
    })
}

/// Parse POSCAR text
pub fn parse_poscar(contents: &str) -> Result<Poscar> {
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < 8 {
        return Err(XtalError::ParseError("POSCAR file too short".to_string()));
    }

    let title = lines[0].trim().to_string();

    let scale: f64 = first_token(lines[1])
        .parse()
        .map_err(|_| XtalError::ParseError(format!("invalid scaling factor '{}'", lines[1].trim())))?;

    let mut rows = [[0.0; 3]; 3];
    for (i, row) in rows.iter_mut().enumerate() {
        *row = parse_triplet(lines[2 + i])
            .ok_or_else(|| XtalError::ParseError(format!("invalid lattice vector on line {}", 3 + i)))?;
    }
    let unscaled = Lattice::from_row_vectors(&rows)?;
    let factor = if scale < 0.0 {
        (-scale / unscaled.volume()).cbrt()
    } else {
        scale
    };
    let lattice = unscaled.transformed(&matrix3::scale(&matrix3::identity(), factor))?;

    let mut cursor = 5;
    let first_is_count = lines[cursor]
        .split_whitespace()
        .next()
        .is_some_and(|token| token.parse::<usize>().is_ok());
    let species: Option<Vec<String>> = if first_is_count {
        None
    } else {
        let names = lines[cursor]
            .split_whitespace()
            .map(|name| name.split('/').next().unwrap_or(name).to_string())
            .collect();
        cursor += 1;
        Some(names)
    };

    let counts: Vec<usize> = lines
        .get(cursor)
        .ok_or_else(|| XtalError::ParseError("missing atom counts".to_string()))?
        .split_whitespace()
        .map(|token| token.parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| XtalError::ParseError(format!("invalid atom counts '{}'", lines[cursor].trim())))?;
    cursor += 1;

    let species = match species {
        Some(names) if names.len() == counts.len() => names,
        Some(names) => {
            return Err(XtalError::ParseError(format!(
                "{} species names but {} atom counts",
                names.len(),
                counts.len()
            )))
        }
        None => (0..counts.len())
            .map(|i| ((b'A' + (i % 26) as u8) as char).to_string())
            .collect(),
    };

    let mut mode_line = lines
        .get(cursor)
        .ok_or_else(|| XtalError::ParseError("missing coordinate mode".to_string()))?
        .trim();
    if mode_line.starts_with(['S', 's']) {
        cursor += 1;
        mode_line = lines
            .get(cursor)
            .ok_or_else(|| XtalError::ParseError("missing coordinate mode".to_string()))?
            .trim();
    }
    let cartesian = mode_line.starts_with(['C', 'c', 'K', 'k']);
    cursor += 1;

    let total: usize = counts.iter().sum();
    let mut coords = Array2::zeros((3, total));
    let mut atom_types = Vec::with_capacity(total);
    let mut index = 0;
    for (name, &count) in species.iter().zip(&counts) {
        for _ in 0..count {
            let line = lines
                .get(cursor + index)
                .ok_or_else(|| XtalError::ParseError(format!("expected {} atom positions", total)))?;
            let mut position = parse_triplet(line).ok_or_else(|| {
                XtalError::ParseError(format!("invalid atom position on line {}", cursor + index + 1))
            })?;
            if cartesian {
                position = lattice.cart_to_frac(&matrix3::vec_scale(&position, factor))?;
            }
            for axis in 0..3 {
                coords[[axis, index]] = position[axis];
            }
            atom_types.push(name.clone());
            index += 1;
        }
    }

    Ok(Poscar {
        title,
        structure: Structure::new(lattice, coords, atom_types)?,
    })
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn parse_triplet(line: &str) -> Option<[f64; 3]> {
    let values: Vec<f64> = line
        .split_whitespace()
        .take(3)
        .map(|token| token.parse().ok())
        .collect::<Option<_>>()?;
    if values.len() < 3 {
        return None;
    }
    Some([values[0], values[1], values[2]])
}
