/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Utility functions for crystal mapping
//!
//! This module provides the small dense linear algebra used throughout the
//! crate: fixed size 3x3 matrix helpers backed by faer factorizations, polar
//! decomposition and a minimum-cost assignment solver.

pub mod assignment;
pub mod errors;
pub mod matrix3;

pub use assignment::{solve_assignment, Assignment};
pub use errors::{Result, UtilsError};
pub use matrix3::{IMatrix3, Matrix3, PolarDecomposition, Vector3};
