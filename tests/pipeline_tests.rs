/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use ndarray::Array2;
use protomap::mapping::{
    analyze_mapping_data, get_child_structures, map_child_structures_onto_parent_structures,
    map_configurations_onto_parent_structures, properties_json_paths, AtomMapping, ChildPathOptions,
    LatticeMapping, MappingCost, MappingError, MappingOptions, MappingRequest, ParentSelection,
    StructureMapper, StructureMapping, DEFAULT_CONFLICT_TOL,
};
use protomap::utils::matrix3;
use protomap::xtal::{Lattice, Prim, Structure};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Answers with fixed costs keyed by (parent site count, child atom count)
struct ScriptedMapper {
    script: Vec<((usize, usize), Vec<f64>)>,
    calls: RefCell<Vec<(usize, usize, usize)>>,
    seen_atom_types: RefCell<Vec<String>>,
}

impl ScriptedMapper {
    fn new(script: Vec<((usize, usize), Vec<f64>)>) -> Self {
        Self {
            script,
            calls: RefCell::new(Vec::new()),
            seen_atom_types: RefCell::new(Vec::new()),
        }
    }
}

impl StructureMapper for ScriptedMapper {
    fn map_structures(&self, request: &MappingRequest<'_>) -> protomap::mapping::Result<Vec<StructureMapping>> {
        let key = (request.parent.site_count(), request.child.atom_count());
        self.calls.borrow_mut().push((key.0, key.1, request.max_vol));
        self.seen_atom_types
            .borrow_mut()
            .extend(request.child.atom_types().iter().cloned());
        assert!(!request.parent_factor_group.is_empty());
        assert!(!request.child_factor_group.is_empty());

        let costs = self
            .script
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, costs)| costs.clone())
            .unwrap_or_default();
        Ok(costs.into_iter().map(|cost| mapping(cost, key.1)).collect())
    }
}

fn mapping(total_cost: f64, atoms: usize) -> StructureMapping {
    StructureMapping {
        cost: MappingCost {
            lattice_cost: total_cost,
            atom_cost: total_cost,
            total_cost,
        },
        lattice: LatticeMapping {
            deformation_gradient: matrix3::identity(),
            transformation_matrix_to_super: matrix3::int_identity(),
            reorientation: matrix3::int_identity(),
            isometry: matrix3::identity(),
            left_stretch: matrix3::identity(),
        },
        atoms: AtomMapping {
            displacement: Array2::zeros((3, atoms)),
            permutation: (0..atoms).collect(),
            translation: [0.0; 3],
        },
    }
}

fn chain_prim(sites: usize) -> Prim {
    let lattice = Lattice::new([[3.0 * sites as f64, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]]).unwrap();
    let mut coords = Array2::zeros((3, sites));
    for i in 0..sites {
        coords[[0, i]] = i as f64 / sites as f64;
    }
    Prim::new(lattice, coords, vec![vec!["A".to_string()]; sites]).unwrap()
}

fn chain_structure(atoms: usize, species: &[&str]) -> Structure {
    let lattice = Lattice::new([[3.0 * atoms as f64, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]]).unwrap();
    let mut coords = Array2::zeros((3, atoms));
    for i in 0..atoms {
        coords[[0, i]] = i as f64 / atoms as f64;
    }
    let types = (0..atoms).map(|i| species[i % species.len()].to_string()).collect();
    Structure::new(lattice, coords, types).unwrap()
}

fn script() -> Vec<((usize, usize), Vec<f64>)> {
    vec![
        ((1, 2), vec![0.05, 0.07]),
        ((2, 2), vec![]),
        ((1, 6), vec![0.02]),
        ((2, 6), vec![0.0201]),
        ((3, 6), vec![0.3]),
    ]
}

#[test]
fn test_orchestrator_ordering_and_undefined_records() {
    let parents = vec![
        ("lib/P1.vasp".to_string(), chain_prim(1)),
        ("lib/P2.vasp".to_string(), chain_prim(2)),
        ("lib/P3.vasp".to_string(), chain_prim(3)),
    ];
    let children = vec![
        ("c0".to_string(), chain_structure(2, &["A"])),
        ("c1".to_string(), chain_structure(6, &["A"])),
    ];
    let mapper = ScriptedMapper::new(script());

    let results =
        map_child_structures_onto_parent_structures(&mapper, &parents, &children, &MappingOptions::default(), true)
            .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|row| row.len() == 3));

    // Every record of a row belongs to that child, in parent order
    for (row, (child_id, _)) in results.iter().zip(&children) {
        for (records, (parent_id, _)) in row.iter().zip(&parents) {
            assert!(!records.is_empty());
            assert!(records.iter().all(|r| r.child_id() == child_id && r.parent_id() == parent_id));
        }
    }

    // Mapper results are kept in order, without deduplication
    let costs: Vec<f64> = results[0][0].iter().map(|r| r.total_cost()).collect();
    assert_eq!(costs, vec![0.05, 0.07]);

    // No mapping found, and a site count that does not divide the atom count
    assert_eq!(results[0][1].len(), 1);
    assert!(results[0][1][0].is_undefined());
    assert_eq!(results[0][2].len(), 1);
    assert!(results[0][2][0].is_undefined());

    // The mapper is never asked about the infeasible pair
    let calls = mapper.calls.borrow();
    assert_eq!(calls.len(), 5);
    assert!(!calls.iter().any(|&(sites, atoms, _)| sites == 3 && atoms == 2));
    assert!(calls.contains(&(2, 6, 3)));
    assert!(calls.contains(&(3, 6, 2)));
}

fn write_child(project: &Path, config: &str, structure_json: &str) -> PathBuf {
    let dir = project.join("training_data").join(config).join("calctype.default");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("properties.calc.json");
    fs::write(&path, structure_json).unwrap();
    path
}

fn chain_json(atoms: usize, species: &[&str]) -> String {
    let coords: Vec<String> = (0..atoms)
        .map(|i| format!("[{}, 0.0, 0.0]", i as f64 / atoms as f64))
        .collect();
    let types: Vec<String> = (0..atoms)
        .map(|i| format!("\"{}\"", species[i % species.len()]))
        .collect();
    format!(
        r#"{{
            "lattice_vectors": [[{}, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]],
            "atom_coords": [{}],
            "coordinate_mode": "Direct",
            "atom_type": [{}],
            "global_vals": {{"energy": {{"value": -3.2}}}}
        }}"#,
        3.0 * atoms as f64,
        coords.join(", "),
        types.join(", ")
    )
}

fn chain_poscar(sites: usize) -> String {
    let mut text = format!(
        "chain\n1.0\n{} 0.0 0.0\n0.0 3.0 0.0\n0.0 0.0 3.0\nNi\n{}\nDirect\n",
        3.0 * sites as f64,
        sites
    );
    for i in 0..sites {
        text.push_str(&format!("{} 0.0 0.0\n", i as f64 / sites as f64));
    }
    text
}

#[test]
fn test_end_to_end_with_project_files() {
    let project = tempdir().unwrap();
    fs::create_dir(project.path().join(".casm")).unwrap();

    write_child(project.path(), "SCEL2_1_1_2_0_0_0/0", &chain_json(2, &["Ni", "Al"]));
    write_child(project.path(), "SCEL6_1_1_6_0_0_0/3", &chain_json(6, &["Ni", "Al", "Al"]));

    let parent_dir = tempdir().unwrap();
    let parent_files: Vec<PathBuf> = (1..=3)
        .map(|sites| {
            let path = parent_dir.path().join(format!("P{}.vasp", sites));
            fs::write(&path, chain_poscar(sites)).unwrap();
            path
        })
        .collect();

    let names = vec!["SCEL2_1_1_2_0_0_0/0".to_string(), "SCEL6_1_1_6_0_0_0/3".to_string()];
    let child_paths = properties_json_paths(project.path(), &names, &ChildPathOptions::default());

    let mapper = ScriptedMapper::new(script());
    let table = map_configurations_onto_parent_structures(
        &mapper,
        &child_paths,
        &ParentSelection::Files(parent_files),
        &MappingOptions::default(),
        true,
    )
    .unwrap();

    // Children and parents are compared with masked atom types
    assert!(mapper.seen_atom_types.borrow().iter().all(|t| t == "A"));

    assert_eq!(table.row_labels(), &["SCEL2_1_1_2_0_0_0/0".to_string(), "SCEL6_1_1_6_0_0_0/3".to_string()]);
    assert_eq!(
        table.column_labels(),
        &["P1.vasp".to_string(), "P2.vasp".to_string(), "P3.vasp".to_string()]
    );
    assert_eq!(table.cell(0, 0).unwrap().total_cost, 0.05);
    assert!(table.cell(0, 1).unwrap().total_cost.is_nan());
    assert!(table.cell(0, 2).unwrap().total_cost.is_nan());
    assert_eq!(table.cell(1, 2).unwrap().total_cost, 0.3);

    let best = analyze_mapping_data(&table, DEFAULT_CONFLICT_TOL).unwrap();
    let first = best.get("SCEL2_1_1_2_0_0_0/0").unwrap();
    assert_eq!(first.best_parent_id, "P1.vasp");
    assert!(first.tied_records.is_empty());

    let second = best.get("SCEL6_1_1_6_0_0_0/3").unwrap();
    assert_eq!(second.best_parent_id, "P1.vasp");
    assert_eq!(second.tied_records.len(), 1);
    assert_eq!(second.tied_records[0].total_cost(), 0.0201);
}

#[test]
fn test_poscar_children_are_unsupported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("POSCAR");
    fs::write(&path, chain_poscar(1)).unwrap();
    assert!(matches!(
        get_child_structures(&[path]),
        Err(MappingError::UnsupportedChildFormat(_))
    ));
}

#[test]
fn test_one_infeasible_pair_and_distinct_costs() {
    let parents = vec![
        ("lib/P1.vasp".to_string(), chain_prim(1)),
        ("lib/P2.vasp".to_string(), chain_prim(2)),
        ("lib/P3.vasp".to_string(), chain_prim(3)),
    ];
    let children = vec![
        (
            "/p/training_data/SCEL2_1_1_2_0_0_0/0/structure.json".to_string(),
            chain_structure(2, &["A"]),
        ),
        (
            "/p/training_data/SCEL6_1_1_6_0_0_0/1/structure.json".to_string(),
            chain_structure(6, &["A"]),
        ),
    ];
    let mapper = ScriptedMapper::new(vec![
        ((1, 2), vec![0.04]),
        ((2, 2), vec![0.01]),
        ((1, 6), vec![0.09]),
        ((2, 6), vec![0.06]),
        ((3, 6), vec![0.02]),
    ]);

    let results =
        map_child_structures_onto_parent_structures(&mapper, &parents, &children, &MappingOptions::default(), true)
            .unwrap();
    assert_eq!(mapper.calls.borrow().len(), 5);

    let table = protomap::mapping::ResultTable::from_mapping_results(&results).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_count(), 3);
    let infeasible = table.cell(0, 2).unwrap();
    assert!(infeasible.total_cost.is_nan());
    assert!(infeasible.atomic_cost.is_nan());
    assert!(infeasible.lattice_cost.is_nan());

    let best = analyze_mapping_data(&table, DEFAULT_CONFLICT_TOL).unwrap();
    assert_eq!(best.len(), 2);
    assert!(best.rows().iter().all(|(_, entry)| !entry.has_conflicts()));
    assert_eq!(best.get("SCEL2_1_1_2_0_0_0/0").unwrap().best_parent_id, "P2.vasp");
    assert_eq!(best.get("SCEL6_1_1_6_0_0_0/1").unwrap().best_parent_id, "P3.vasp");
}
