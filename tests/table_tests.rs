/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use ndarray::Array2;
use protomap::mapping::{
    config_name_from_child_path, AtomMapping, LatticeMapping, MappingCost, MappingError, MappingRecord,
    NestedMappingResults, ResultTable, StructureMapping,
};
use protomap::utils::matrix3;

fn defined(parent: &str, child: &str, atom_cost: f64, lattice_cost: f64) -> MappingRecord {
    let mapping = StructureMapping {
        cost: MappingCost {
            lattice_cost,
            atom_cost,
            total_cost: 0.5 * (atom_cost + lattice_cost),
        },
        lattice: LatticeMapping {
            deformation_gradient: matrix3::identity(),
            transformation_matrix_to_super: [[2, 0, 0], [0, 1, 0], [0, 0, 1]],
            reorientation: matrix3::int_identity(),
            isometry: matrix3::identity(),
            left_stretch: matrix3::identity(),
        },
        atoms: AtomMapping {
            displacement: Array2::zeros((3, 2)),
            permutation: vec![1, 0],
            translation: [0.1, 0.0, 0.0],
        },
    };
    MappingRecord::from_structure_mapping(mapping, parent, child)
}

const CHILD_A: &str = "/home/me/alloy/training_data/SCEL2_1_2_1_1_0_0/0/calctype.default/properties.calc.json";
const CHILD_B: &str = "/home/me/alloy/training_data/SCEL4_2_2_1_1_1_0/12/structure.json";

fn two_by_two() -> NestedMappingResults {
    vec![
        vec![
            vec![defined("xtallib/frequent/BCC.vasp", CHILD_A, 0.01, 0.03)],
            vec![
                defined("xtallib/frequent/FCC.vasp", CHILD_A, 0.02, 0.02),
                defined("xtallib/frequent/FCC.vasp", CHILD_A, 0.0, 0.0),
            ],
        ],
        vec![
            vec![MappingRecord::undefined("xtallib/frequent/BCC.vasp", CHILD_B)],
            vec![defined("xtallib/frequent/FCC.vasp", CHILD_B, 0.0, 0.004)],
        ],
    ]
}

#[test]
fn test_labels() {
    let table = ResultTable::from_mapping_results(&two_by_two()).unwrap();
    assert_eq!(
        table.row_labels(),
        &["SCEL2_1_2_1_1_0_0/0".to_string(), "SCEL4_2_2_1_1_1_0/12".to_string()]
    );
    assert_eq!(table.column_labels(), &["BCC.vasp".to_string(), "FCC.vasp".to_string()]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_count(), 2);
}

#[test]
fn test_only_first_record_is_kept() {
    let table = ResultTable::from_mapping_results(&two_by_two()).unwrap();
    let cell = table.cell(0, 1).unwrap();
    assert_eq!(cell.atomic_cost, 0.02);
    assert_eq!(cell.lattice_cost, 0.02);
    assert_eq!(cell.total_cost, 0.02);
    assert_eq!(cell.record.total_cost(), 0.02);
}

#[test]
fn test_undefined_cells() {
    let table = ResultTable::from_mapping_results(&two_by_two()).unwrap();
    let cell = table.cell(1, 0).unwrap();
    assert!(cell.total_cost.is_nan());
    assert!(cell.atomic_cost.is_nan());
    assert!(cell.record.is_undefined());
    assert!(cell.record.geometry().is_none());

    let defined = table.cell(1, 1).unwrap();
    assert_eq!(defined.total_cost, 0.002);
    assert_eq!(
        defined.record.geometry().unwrap().lattice.transformation_matrix_to_super[0][0],
        2
    );
}

#[test]
fn test_empty_inputs() {
    let no_children: NestedMappingResults = Vec::new();
    assert!(matches!(
        ResultTable::from_mapping_results(&no_children),
        Err(MappingError::EmptyResultSet(_))
    ));

    let no_parents: NestedMappingResults = vec![Vec::new()];
    assert!(matches!(
        ResultTable::from_mapping_results(&no_parents),
        Err(MappingError::EmptyResultSet(_))
    ));
}

#[test]
fn test_unrecognized_child_identifier() {
    let results: NestedMappingResults = vec![vec![vec![MappingRecord::undefined(
        "xtallib/frequent/BCC.vasp",
        "/tmp/POSCAR",
    )]]];
    assert!(matches!(
        ResultTable::from_mapping_results(&results),
        Err(MappingError::UnrecognizedPathConvention(_))
    ));
}

#[test]
fn test_config_names() {
    assert_eq!(config_name_from_child_path(CHILD_A).unwrap(), "SCEL2_1_2_1_1_0_0/0");
    assert_eq!(config_name_from_child_path(CHILD_B).unwrap(), "SCEL4_2_2_1_1_1_0/12");
}
