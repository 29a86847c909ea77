/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use ndarray::Array2;
use protomap::io::{
    best_match_table_to_html, read_result_table, read_table, result_table_to_html, write_best_match_table,
    write_result_table, TableIoError, BEST_MAPS_KEY,
};
use protomap::mapping::{
    analyze_mapping_data, AtomMapping, LatticeMapping, MappingCost, MappingRecord, NestedMappingResults,
    ResultTable, StructureMapping, DEFAULT_CONFLICT_TOL,
};
use protomap::utils::matrix3;
use std::fs;
use tempfile::tempdir;

const CHILD_A: &str = "/p/training_data/SCEL1_1_1_1_0_0_0/0/structure.json";
const CHILD_B: &str = "/p/training_data/SCEL2_1_2_1_0_0_0/1/structure.json";

fn defined(parent: &str, child: &str, total_cost: f64) -> MappingRecord {
    let mut displacement = Array2::zeros((3, 2));
    displacement[[0, 1]] = 0.125;
    displacement[[0, 0]] = -0.125;
    let mapping = StructureMapping {
        cost: MappingCost {
            lattice_cost: 2.0 * total_cost,
            atom_cost: 0.0,
            total_cost,
        },
        lattice: LatticeMapping {
            deformation_gradient: [[1.01, 0.0, 0.0], [0.0, 0.99, 0.0], [0.0, 0.0, 1.0]],
            transformation_matrix_to_super: [[2, 0, 0], [1, 1, 0], [0, 0, 1]],
            reorientation: [[0, 1, 0], [1, 0, 0], [0, 0, -1]],
            isometry: matrix3::identity(),
            left_stretch: [[1.01, 0.0, 0.0], [0.0, 0.99, 0.0], [0.0, 0.0, 1.0]],
        },
        atoms: AtomMapping {
            displacement,
            permutation: vec![1, 0],
            translation: [0.25, 0.0, -0.5],
        },
    };
    MappingRecord::from_structure_mapping(mapping, parent, child)
}

fn sample_table() -> ResultTable {
    let results: NestedMappingResults = vec![
        vec![
            vec![defined("lib/BCC.vasp", CHILD_A, 0.012)],
            vec![MappingRecord::undefined("lib/HCP.vasp", CHILD_A)],
        ],
        vec![
            vec![defined("lib/BCC.vasp", CHILD_B, 0.07)],
            vec![defined("lib/HCP.vasp", CHILD_B, 0.03)],
        ],
    ];
    ResultTable::from_mapping_results(&results).unwrap()
}

#[test]
fn test_binary_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping_results.hdf");
    let table = sample_table();

    write_result_table(&path, &table).unwrap();
    let loaded = read_result_table(&path).unwrap();

    assert_eq!(loaded.row_labels(), table.row_labels());
    assert_eq!(loaded.column_labels(), table.column_labels());
    for row in 0..table.row_count() {
        for column in 0..table.column_count() {
            let original = table.cell(row, column).unwrap();
            let copy = loaded.cell(row, column).unwrap();
            for (a, b) in [
                (original.atomic_cost, copy.atomic_cost),
                (original.lattice_cost, copy.lattice_cost),
                (original.total_cost, copy.total_cost),
            ] {
                assert_eq!(a.to_bits(), b.to_bits());
            }
            assert_eq!(original.record.geometry(), copy.record.geometry());
        }
    }
}

#[test]
fn test_best_maps_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("best_maps.hdf");
    let best = analyze_mapping_data(&sample_table(), DEFAULT_CONFLICT_TOL).unwrap();

    write_best_match_table(&path, &best).unwrap();
    let loaded: protomap::mapping::BestMatchTable = read_table(&path, BEST_MAPS_KEY).unwrap();
    assert_eq!(loaded, best);
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get("SCEL2_1_2_1_0_0_0/1").unwrap().best_parent_id, "HCP.vasp");

    // The mapping results key is not present in a best maps file
    assert!(matches!(read_result_table(&path), Err(TableIoError::MissingKey { .. })));
}

#[test]
fn test_html_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping_results.html");
    write_result_table(&path, &sample_table()).unwrap();

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("<th colspan=\"4\" halign=\"left\">BCC.vasp</th>"));
    assert!(html.contains("<th>SCEL2_1_2_1_0_0_0/1</th>"));
    assert!(html.contains("Total mapping cost is: 0.03"));
    assert!(html.contains("NaN"));
    assert_eq!(html.matches("<th>mapping_results</th>").count(), 2);

    let best_path = dir.path().join("best_maps.html");
    let best = analyze_mapping_data(&sample_table(), DEFAULT_CONFLICT_TOL).unwrap();
    write_best_match_table(&best_path, &best).unwrap();
    let best_html = fs::read_to_string(&best_path).unwrap();
    assert!(best_html.contains("Best parent map name"));
    assert!(best_html.contains("<td>HCP.vasp</td>"));
}

#[test]
fn test_html_rendering_returns_document() {
    let table = sample_table();
    let html = result_table_to_html(&table).unwrap();
    assert!(html.starts_with("<table border=\"1\" class=\"dataframe\">"));
    assert!(html.ends_with("</table>\n"));
    assert_eq!(html.matches("<tr>").count(), 2 + table.row_count());

    let best = analyze_mapping_data(&table, DEFAULT_CONFLICT_TOL).unwrap();
    let best_html = best_match_table_to_html(&best).unwrap();
    assert_eq!(best_html.matches("<tr>").count(), 1 + best.len());
    assert!(best_html.contains("<td>None</td>"));
}

#[test]
fn test_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping_results.csv");
    assert!(matches!(
        write_result_table(&path, &sample_table()),
        Err(TableIoError::UnsupportedExtension(_))
    ));
    assert!(!path.exists());
}
