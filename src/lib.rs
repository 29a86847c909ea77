/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # protomap
//!
//! Maps crystal structures of a project onto a library of parent crystal
//! prototypes, tabulates the mapping costs and picks the best parent of every
//! structure.
//!
//! The lattice and atom mapping search sits behind the
//! [`StructureMapper`](mapping::StructureMapper) trait; [`mapping::LatticeMapper`]
//! is the built-in implementation.

pub mod cli;
pub mod io;
pub mod mapping;
pub mod utils;
pub mod xtal;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
