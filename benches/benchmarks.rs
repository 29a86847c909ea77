/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use faer::Mat;
use ndarray::array;
use protomap::mapping::{
    find_best_map_and_flag_conflicts, max_vol, AtomMapping, LatticeMapper, LatticeMapping, MappingCost,
    MappingOptions, MappingRecord, MappingRequest, StructureMapper, StructureMapping, DEFAULT_CONFLICT_TOL,
};
use protomap::utils::{matrix3, solve_assignment};
use protomap::xtal::{
    frequent_parent_structures, make_prim_factor_group, make_structure_factor_group, Lattice, Structure,
    DEFAULT_XTAL_TOL,
};

fn best_match_benchmark(c: &mut Criterion) {
    let records: Vec<MappingRecord> = (0..500)
        .map(|i| {
            let total_cost = if i % 7 == 0 {
                f64::NAN
            } else {
                ((i * 37) % 101) as f64 * 1e-3
            };
            let mapping = StructureMapping {
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
                    displacement: ndarray::Array2::zeros((3, 1)),
                    permutation: vec![0],
                    translation: [0.0; 3],
                },
            };
            MappingRecord::from_structure_mapping(mapping, format!("P{}", i), "child")
        })
        .collect();

    c.bench_function("find_best_map_500", |b| {
        b.iter(|| find_best_map_and_flag_conflicts(black_box(&records), DEFAULT_CONFLICT_TOL).unwrap())
    });
}

fn assignment_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Assignment");

    for size in [8usize, 32, 64] {
        let cost = Mat::from_fn(size, size, |i, j| (((i * 131 + j * 71) % 97) as f64).sqrt());
        group.bench_function(format!("solve_assignment_{}", size), |b| {
            b.iter(|| solve_assignment(black_box(&cost)).unwrap())
        });
    }

    group.finish();
}

fn lattice_mapper_benchmark(c: &mut Criterion) {
    let parent = frequent_parent_structures()
        .unwrap()
        .into_iter()
        .find(|(id, _)| id.ends_with("FCC.vasp"))
        .map(|(_, prim)| prim)
        .unwrap();
    let lattice = Lattice::new([[2.87, 0.0, 0.0], [0.0, 2.87, 0.0], [0.0, 0.0, 2.87]]).unwrap();
    let child = Structure::new(lattice, array![[0.0, 0.5], [0.0, 0.5], [0.0, 0.5]], vec!["A".to_string(); 2]).unwrap();

    let parent_factor_group = make_prim_factor_group(&parent, DEFAULT_XTAL_TOL).unwrap();
    let child_factor_group = make_structure_factor_group(&child, DEFAULT_XTAL_TOL).unwrap();
    let options = MappingOptions::default();
    let request = MappingRequest {
        parent: &parent,
        child: &child,
        max_vol: max_vol(&parent, &child).unwrap(),
        parent_factor_group: &parent_factor_group,
        child_factor_group: &child_factor_group,
        options: &options,
    };
    let mapper = LatticeMapper::new();

    let mut group = c.benchmark_group("Structure Mapping");
    group.sample_size(10);
    group.bench_function("bcc_onto_fcc", |b| {
        b.iter(|| mapper.map_structures(black_box(&request)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, best_match_benchmark, assignment_benchmark, lattice_mapper_benchmark);
criterion_main!(benches);
