/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Mapping child structures onto parent prototypes
//!
//! The pipeline reads child structures from a project, maps each of them onto
//! every parent with a [`StructureMapper`], keeps the results in a
//! [`ResultTable`] and finally picks the best parent of every child with
//! [`analyze_mapping_data`].

pub mod best_match;
pub mod config_name;
pub mod errors;
pub mod lattice_mapper;
pub mod mapper;
pub mod options;
pub mod orchestrator;
pub mod parents;
pub mod pipeline;
pub mod project;
pub mod record;
pub mod table;

pub use best_match::{
    analyze_mapping_data, find_best_map_and_flag_conflicts, BestMap, BestMatchEntry, BestMatchTable,
    DEFAULT_CONFLICT_TOL,
};
pub use config_name::{config_name_from_child_path, ChildPathConvention};
pub use errors::{MappingError, Result};
pub use lattice_mapper::LatticeMapper;
pub use mapper::{AtomMapping, LatticeMapping, MappingCost, MappingRequest, StructureMapper, StructureMapping};
pub use options::{AtomCostMethod, MappingOptions, StrainCostMethod};
pub use orchestrator::{map_child_structures_onto_parent_structures, max_vol, NestedMappingResults};
pub use parents::{ParentLibrary, ParentSelection};
pub use pipeline::{get_child_structures, map_configurations_onto_parent_structures};
pub use project::{
    find_project_root, get_properties_json_paths, properties_json_paths, read_config_names, ChildPathOptions,
};
pub use record::{MappingGeometry, MappingRecord};
pub use table::{ResultTable, TableCell};
