/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Built-in structure mapper
//!
//! The search runs in two stages. The lattice stage enumerates every parent
//! supercell `T` of the requested volume (Hermite normal form) and every small
//! unimodular reorientation `N` of its reduced basis, giving the deformation
//! gradient `F` with `F L_parent T N = L_child`. Lattice mappings that are too
//! expensive are pruned, first through a lower bound on the strain cost taken
//! from stretch ratios and then on the full cost after the polar
//! decomposition. Symmetry-equivalent mappings are dropped. The atom stage
//! then pairs the deformed supercell sites with child atoms through a
//! minimum-cost assignment, for every translation that puts the first child
//! atom onto a compatible site.
//!
//! Supercells are scored in parallel with rayon. Results are sorted afterwards
//! so the output does not depend on scheduling.

use super::errors::Result;
use super::mapper::{
    AtomMapping, LatticeMapping, MappingCost, MappingRequest, StructureMapper, StructureMapping,
};
use super::options::{AtomCostMethod, MappingOptions, StrainCostMethod};
use crate::utils::assignment::solve_assignment;
use crate::utils::matrix3::{self, IMatrix3, Matrix3, PolarDecomposition, Vector3};
use crate::xtal::lattice::{int_det_is_unit, signed_unit_matrices};
use crate::xtal::symmetry::{point_group_of, wrap_difference};
use crate::xtal::{Prim, SymOp};
use faer::Mat;
use log::debug;
use ndarray::Array2;
use once_cell::sync::Lazy;
use rayon::prelude::*;

/// Assignment cost of pairing a site with an atom it cannot hold
const FORBIDDEN_PAIR_PENALTY: f64 = 1e8;

/// Lattice costs closer than this are compared for symmetry equivalence
const EQUIVALENT_COST_TOL: f64 = 1e-7;

/// Entry-wise tolerance when matching rotations
const ROTATION_MATCH_TOL: f64 = 1e-4;

/// Fractional tolerance when matching supercell sites
const SITE_MATCH_TOL: f64 = 1e-4;

/// Relative slack on the strain lower bound so rounding never prunes a mapping
/// that the full cost would keep
const STRAIN_BOUND_SLACK: f64 = 1e-9;

/// Integer matrices with entries in {-1, 0, 1} and determinant ±1, with their inverses
static REORIENTATIONS: Lazy<Vec<(IMatrix3, IMatrix3)>> = Lazy::new(|| {
    signed_unit_matrices()
        .filter(|m| int_det_is_unit(m).is_some())
        .filter_map(|m| {
            matrix3::int_unimodular_inverse(&m)
                .ok()
                .map(|inverse| (m, inverse))
        })
        .collect()
});

/// Lower-triangular Hermite normal forms with determinant `volume`
///
/// Columns are the supercell vectors in prim fractional coordinates.
pub fn hermite_normal_forms(volume: usize) -> Vec<IMatrix3> {
    let volume = volume as i64;
    let mut forms = Vec::new();
    for a in (1..=volume).filter(|a| volume % a == 0) {
        let rest = volume / a;
        for c in (1..=rest).filter(|c| rest % c == 0) {
            let f = rest / c;
            for b in 0..c {
                for d in 0..f {
                    for e in 0..f {
                        forms.push([[a, 0, 0], [b, c, 0], [d, e, f]]);
                    }
                }
            }
        }
    }
    forms
}

/// Integer points of the prim lattice that are distinct modulo the supercell `T`
fn lattice_points_in_supercell(transformation: &IMatrix3) -> Vec<Vector3> {
    let (a, c, f) = (
        transformation[0][0],
        transformation[1][1],
        transformation[2][2],
    );
    let mut points = Vec::with_capacity((a * c * f) as usize);
    for i in 0..a {
        for j in 0..c {
            for k in 0..f {
                points.push([i as f64, j as f64, k as f64]);
            }
        }
    }
    points
}

/// A site of a parent supercell
#[derive(Debug, Clone, Copy)]
struct SupercellSite {
    /// Index of the prim site it is a copy of
    basis: usize,
    /// Position in prim fractional coordinates
    frac: Vector3,
}

fn supercell_sites(prim: &Prim, transformation: &IMatrix3) -> Vec<SupercellSite> {
    let mut sites = Vec::new();
    for point in lattice_points_in_supercell(transformation) {
        for basis in 0..prim.site_count() {
            sites.push(SupercellSite {
                basis,
                frac: matrix3::vec_add(&prim.frac_coord(basis), &point),
            });
        }
    }
    sites
}

/// Strain cost of a stretch tensor expressed in the parent frame
pub fn strain_cost(stretch: &Matrix3, method: StrainCostMethod, parent_point_group: &[Matrix3]) -> f64 {
    let volume_ratio = matrix3::det(stretch);
    let normalized = matrix3::scale(stretch, 1.0 / volume_ratio.cbrt());
    let mut strain = matrix3::sub(&normalized, &matrix3::identity());
    if method == StrainCostMethod::SymmetryBreaking && !parent_point_group.is_empty() {
        let mut symmetric = matrix3::zeros();
        for rotation in parent_point_group {
            let conjugated = matrix3::mul(&matrix3::mul(rotation, &strain), &matrix3::transpose(rotation));
            symmetric = matrix3::add(&symmetric, &conjugated);
        }
        symmetric = matrix3::scale(&symmetric, 1.0 / parent_point_group.len() as f64);
        strain = matrix3::sub(&strain, &symmetric);
    }
    matrix3::trace(&matrix3::mul(&strain, &strain)) / 3.0
}

/// True when every strain invariant under `point_group` is hydrostatic
///
/// This holds for the cubic groups. The Reynolds average of a generic
/// symmetric matrix is then a multiple of the identity.
fn has_only_hydrostatic_invariants(point_group: &[Matrix3]) -> bool {
    if point_group.is_empty() {
        return false;
    }
    let sample = [[1.0, 0.3, 0.5], [0.3, 2.0, 0.7], [0.5, 0.7, 4.0]];
    let mut average = matrix3::zeros();
    for rotation in point_group {
        let conjugated = matrix3::mul(&matrix3::mul(rotation, &sample), &matrix3::transpose(rotation));
        average = matrix3::add(&average, &conjugated);
    }
    average = matrix3::scale(&average, 1.0 / point_group.len() as f64);
    let hydrostatic = matrix3::scale(&matrix3::identity(), matrix3::trace(&sample) / 3.0);
    matrix3::approx_eq(&average, &hydrostatic, 1e-8)
}

/// Lower bound on [`strain_cost`] without a polar decomposition
///
/// `|F v| / |v|` lies between the smallest and largest principal stretch of
/// `F` for every nonzero direction `v`. The columns of `directions` and the Cartesian
/// axes give six such ratios, and their spread bounds the principal stretches
/// from below. With the symmetry-breaking method the bound only holds when the
/// parent has no invariant strain besides the hydrostatic one, otherwise zero
/// is returned.
fn strain_cost_lower_bound(
    deformation: &Matrix3,
    directions: &Matrix3,
    method: StrainCostMethod,
    hydrostatic_parent: bool,
) -> f64 {
    let volume_ratio = matrix3::det(deformation);
    if volume_ratio <= 0.0 {
        return 0.0;
    }
    let normalization = volume_ratio.cbrt();

    let mut ratios = [0.0; 6];
    for j in 0..3 {
        let direction = matrix3::column(directions, j);
        let image = matrix3::mul_vec(deformation, &direction);
        ratios[2 * j] = (matrix3::norm_sq(&image) / matrix3::norm_sq(&direction)).sqrt() / normalization;
        ratios[2 * j + 1] = matrix3::norm_sq(&matrix3::column(deformation, j)).sqrt() / normalization;
    }
    let smallest = ratios.iter().copied().fold(f64::INFINITY, f64::min);
    let largest = ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = (largest - smallest).powi(2) / 2.0;

    let bound = match method {
        StrainCostMethod::Isotropic => {
            let farthest = ratios.iter().map(|r| (r - 1.0).powi(2)).fold(0.0, f64::max);
            farthest.max(spread)
        }
        StrainCostMethod::SymmetryBreaking if hydrostatic_parent => spread,
        StrainCostMethod::SymmetryBreaking => 0.0,
    };
    bound / 3.0
}

/// A lattice mapping that survived pruning
#[derive(Debug, Clone, Copy)]
struct LatticeCandidate {
    transformation: IMatrix3,
    reorientation: IMatrix3,
    deformation: Matrix3,
    polar: PolarDecomposition,
    lattice_cost: f64,
}

/// Maps structures by enumerating supercells, reorientations and atom assignments
#[derive(Debug, Clone, Copy, Default)]
pub struct LatticeMapper;

impl LatticeMapper {
    pub fn new() -> Self {
        Self
    }
}

impl StructureMapper for LatticeMapper {
    fn map_structures(&self, request: &MappingRequest<'_>) -> Result<Vec<StructureMapping>> {
        let parent = request.parent;
        let child = request.child;
        if request.max_vol == 0 || child.atom_count() != request.max_vol * parent.site_count() {
            return Ok(Vec::new());
        }

        let context = MappingContext::new(request)?;
        let forms = hermite_normal_forms(request.max_vol);

        let per_supercell: Vec<Result<Vec<LatticeCandidate>>> = forms
            .par_iter()
            .map(|transformation| context.lattice_candidates(transformation))
            .collect();
        let mut candidates = Vec::new();
        for supercell_candidates in per_supercell {
            candidates.extend(supercell_candidates?);
        }
        candidates.sort_by(|a, b| a.lattice_cost.total_cmp(&b.lattice_cost));

        let unique = context.remove_equivalent(candidates);
        debug!(
            "{} supercells of volume {}, {} distinct lattice mappings",
            forms.len(),
            request.max_vol,
            unique.len()
        );

        let mapped: Vec<Result<Option<StructureMapping>>> = unique
            .par_iter()
            .map(|candidate| context.map_atoms(candidate))
            .collect();
        let mut mappings = Vec::new();
        for mapping in mapped {
            if let Some(mapping) = mapping? {
                mappings.push(mapping);
            }
        }

        Ok(select_best(mappings, request.options))
    }
}

/// Keep results within the cost window, lowest first, then the `k_best` best
/// plus anything tied with the last of them
fn select_best(mut mappings: Vec<StructureMapping>, options: &MappingOptions) -> Vec<StructureMapping> {
    mappings.retain(|m| m.cost.total_cost >= options.min_cost && m.cost.total_cost <= options.max_cost);
    mappings.sort_by(|a, b| a.cost.total_cost.total_cmp(&b.cost.total_cost));

    if options.k_best == 0 {
        return Vec::new();
    }
    if mappings.len() > options.k_best {
        let cutoff = mappings[options.k_best - 1].cost.total_cost + options.cost_tol;
        let ties = mappings[options.k_best..]
            .iter()
            .take_while(|m| m.cost.total_cost <= cutoff)
            .count();
        mappings.truncate(options.k_best + ties);
    }
    mappings
}

/// Data shared by every candidate of one (child, parent) pair
struct MappingContext<'a> {
    request: MappingRequest<'a>,
    /// Parent point group used by the strain cost
    parent_point_group: Vec<Matrix3>,
    /// Parent point group leaves only hydrostatic strain invariant
    hydrostatic_parent: bool,
    /// Rotations used to detect equivalent lattice mappings
    parent_equivalence: Vec<Matrix3>,
    child_equivalence: Vec<Matrix3>,
    /// Parent factor group used by the symmetry-breaking atom cost
    parent_factor_group: Vec<SymOp>,
    child_reduced: Matrix3,
    child_reduced_inverse: Matrix3,
    /// `U_c`, with `L_child U_c` the reduced child lattice
    child_unimodular: IMatrix3,
    child_cart: Vec<Vector3>,
    /// `(volume per parent site)^(2/3)`
    displacement_normalization: f64,
}

impl<'a> MappingContext<'a> {
    fn new(request: &MappingRequest<'a>) -> Result<Self> {
        let options = request.options;
        let tol = options.tolerance;

        let mut parent_point_group = point_group_of(request.parent_factor_group, ROTATION_MATCH_TOL);
        if parent_point_group.is_empty() {
            parent_point_group.push(matrix3::identity());
        }
        let parent_equivalence = if options.use_parent_symmetry {
            parent_point_group.clone()
        } else {
            vec![matrix3::identity()]
        };
        let mut child_equivalence = if options.use_child_symmetry {
            point_group_of(request.child_factor_group, ROTATION_MATCH_TOL)
        } else {
            Vec::new()
        };
        if child_equivalence.is_empty() {
            child_equivalence.push(matrix3::identity());
        }

        let parent_factor_group = if request.parent_factor_group.is_empty() {
            vec![SymOp::identity()]
        } else {
            request.parent_factor_group.to_vec()
        };

        let (child_reduced, child_unimodular) = request.child.lattice().reduced();
        let child_reduced_inverse = child_reduced.inverse()?;
        let child_cart = (0..request.child.atom_count())
            .map(|i| request.child.lattice().frac_to_cart(&request.child.frac_coord(i)))
            .collect();

        let parent = request.parent;
        let displacement_normalization =
            (parent.lattice().volume() / parent.site_count() as f64).powf(2.0 / 3.0);

        let hydrostatic_parent = has_only_hydrostatic_invariants(&parent_point_group);

        debug!(
            "mapping with {} parent and {} child rotations (tol {})",
            parent_equivalence.len(),
            child_equivalence.len(),
            tol
        );

        Ok(Self {
            request: *request,
            parent_point_group,
            hydrostatic_parent,
            parent_equivalence,
            child_equivalence,
            parent_factor_group,
            child_reduced: *child_reduced.column_vectors(),
            child_reduced_inverse,
            child_unimodular,
            child_cart,
            displacement_normalization,
        })
    }

    fn options(&self) -> &MappingOptions {
        self.request.options
    }

    /// Every affordable lattice mapping of one supercell
    fn lattice_candidates(&self, transformation: &IMatrix3) -> Result<Vec<LatticeCandidate>> {
        let options = self.options();
        let supercell = self.request.parent.lattice().supercell(transformation)?;
        let (reduced, supercell_unimodular) = supercell.reduced();
        let reduced_inverse = reduced.inverse()?;
        let child_unimodular_inverse = matrix3::int_unimodular_inverse(&self.child_unimodular)?;
        let weight = options.lattice_cost_weight;

        let mut candidates = Vec::new();
        let mut skipped = 0usize;
        for (reorientation, reorientation_inverse) in REORIENTATIONS.iter() {
            let deformation = matrix3::mul(
                &matrix3::mul(&self.child_reduced, &matrix3::to_real(reorientation_inverse)),
                &reduced_inverse,
            );
            if matrix3::det(&deformation) <= 0.0 {
                continue;
            }

            // F maps the reoriented supercell vectors onto the reduced child vectors
            if weight > 0.0 {
                let directions = matrix3::mul(reduced.column_vectors(), &matrix3::to_real(reorientation));
                let bound = strain_cost_lower_bound(
                    &deformation,
                    &directions,
                    options.strain_cost_method,
                    self.hydrostatic_parent,
                );
                if weight * bound * (1.0 - STRAIN_BOUND_SLACK) > options.max_cost {
                    skipped += 1;
                    continue;
                }
            }

            let polar = matrix3::polar_decomposition(&deformation)?;
            let lattice_cost = strain_cost(
                &polar.right_stretch,
                options.strain_cost_method,
                &self.parent_point_group,
            );
            if weight > 0.0 && weight * lattice_cost > options.max_cost {
                continue;
            }

            candidates.push(LatticeCandidate {
                transformation: *transformation,
                reorientation: matrix3::int_mul(
                    &matrix3::int_mul(&supercell_unimodular, reorientation),
                    &child_unimodular_inverse,
                ),
                deformation,
                polar,
                lattice_cost,
            });
        }
        if skipped > 0 {
            debug!(
                "supercell {:?}: {} reorientations skipped before polar decomposition",
                transformation, skipped
            );
        }
        Ok(candidates)
    }

    /// Drop candidates related to an earlier one by `F' = R_child F R_parent`
    ///
    /// `candidates` must be sorted by lattice cost.
    fn remove_equivalent(&self, candidates: Vec<LatticeCandidate>) -> Vec<LatticeCandidate> {
        let mut unique: Vec<LatticeCandidate> = Vec::new();
        for candidate in candidates {
            let duplicate = unique
                .iter()
                .rev()
                .take_while(|kept| (candidate.lattice_cost - kept.lattice_cost).abs() <= EQUIVALENT_COST_TOL)
                .any(|kept| self.are_equivalent(kept, &candidate));
            if !duplicate {
                unique.push(candidate);
            }
        }
        unique
    }

    fn are_equivalent(&self, kept: &LatticeCandidate, candidate: &LatticeCandidate) -> bool {
        let Ok(kept_inverse) = matrix3::inverse(&kept.deformation) else {
            return false;
        };
        self.parent_equivalence.iter().any(|parent_rotation| {
            let child_rotation = matrix3::mul(
                &matrix3::mul(&candidate.deformation, &matrix3::transpose(parent_rotation)),
                &kept_inverse,
            );
            self.child_equivalence
                .iter()
                .any(|rotation| matrix3::approx_eq(rotation, &child_rotation, ROTATION_MATCH_TOL))
        })
    }

    /// Best atom assignment for one lattice mapping, if any is allowed
    fn map_atoms(&self, candidate: &LatticeCandidate) -> Result<Option<StructureMapping>> {
        let parent = self.request.parent;
        let child = self.request.child;
        let options = self.options();

        let sites = supercell_sites(parent, &candidate.transformation);
        let n = sites.len();
        if n != child.atom_count() || n == 0 {
            return Ok(None);
        }

        let deformation = candidate.deformation;
        let deformation_inverse = matrix3::inverse(&deformation)?;
        let deformed_prim = matrix3::mul(&deformation, parent.lattice().column_vectors());
        let deformed_sites: Vec<Vector3> = sites
            .iter()
            .map(|site| matrix3::mul_vec(&deformed_prim, &site.frac))
            .collect();

        let atom_types = child.atom_types();
        let allowed = |site: usize, atom: usize| parent.allows(sites[site].basis, &atom_types[atom]);

        let mut best: Option<(f64, Vec<usize>, Vec<Vector3>, Vector3)> = None;
        for (anchor, anchor_site) in deformed_sites.iter().enumerate() {
            if !allowed(anchor, 0) {
                continue;
            }
            let translation = matrix3::vec_sub(anchor_site, &self.child_cart[0]);
            let displacement = |site: usize, atom: usize| {
                let offset = matrix3::vec_sub(
                    &matrix3::vec_add(&self.child_cart[atom], &translation),
                    &deformed_sites[site],
                );
                matrix3::mul_vec(&deformation_inverse, &self.min_image(&offset))
            };

            let cost = Mat::from_fn(n, n, |site, atom| {
                if allowed(site, atom) {
                    matrix3::norm_sq(&displacement(site, atom))
                } else {
                    FORBIDDEN_PAIR_PENALTY
                }
            });
            let assignment = solve_assignment(&cost)?;
            if (0..n).any(|site| !allowed(site, assignment.row_to_col[site])) {
                continue;
            }

            let mut displacements: Vec<Vector3> = (0..n)
                .map(|site| displacement(site, assignment.row_to_col[site]))
                .collect();
            let mean = displacements
                .iter()
                .fold([0.0; 3], |acc, u| matrix3::vec_add(&acc, u));
            let mean = matrix3::vec_scale(&mean, 1.0 / n as f64);
            for u in displacements.iter_mut() {
                *u = matrix3::vec_sub(u, &mean);
            }
            let shifted = matrix3::vec_sub(&translation, &matrix3::mul_vec(&deformation, &mean));

            let squared: f64 = displacements.iter().map(matrix3::norm_sq).sum();
            if best.as_ref().map_or(true, |(current, ..)| squared < *current) {
                best = Some((squared, assignment.row_to_col, displacements, shifted));
            }
        }

        let Some((squared, permutation, displacements, translation)) = best else {
            return Ok(None);
        };

        let atom_cost = match options.atom_cost_method {
            AtomCostMethod::Isotropic => squared / n as f64 / self.displacement_normalization,
            AtomCostMethod::SymmetryBreaking => {
                let breaking = self.symmetry_breaking_displacements(&sites, &candidate.transformation, &displacements)?;
                breaking.iter().map(matrix3::norm_sq).sum::<f64>() / n as f64 / self.displacement_normalization
            }
        };
        let weight = options.lattice_cost_weight;
        let total_cost = weight * candidate.lattice_cost + (1.0 - weight) * atom_cost;

        let mut displacement = Array2::zeros((3, n));
        for (site, u) in displacements.iter().enumerate() {
            for axis in 0..3 {
                displacement[[axis, site]] = u[axis];
            }
        }

        Ok(Some(StructureMapping {
            cost: MappingCost {
                lattice_cost: candidate.lattice_cost,
                atom_cost,
                total_cost,
            },
            lattice: LatticeMapping {
                deformation_gradient: deformation,
                transformation_matrix_to_super: candidate.transformation,
                reorientation: candidate.reorientation,
                isometry: candidate.polar.isometry,
                left_stretch: candidate.polar.left_stretch,
            },
            atoms: AtomMapping {
                displacement,
                permutation,
                translation,
            },
        }))
    }

    /// Shortest Cartesian vector equivalent to `offset` on the child lattice
    fn min_image(&self, offset: &Vector3) -> Vector3 {
        let frac = wrap_difference(&matrix3::mul_vec(&self.child_reduced_inverse, offset));
        let mut best = matrix3::mul_vec(&self.child_reduced, &frac);
        let mut best_length = matrix3::norm_sq(&best);
        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    if i == 0 && j == 0 && k == 0 {
                        continue;
                    }
                    let shifted = [frac[0] + i as f64, frac[1] + j as f64, frac[2] + k as f64];
                    let image = matrix3::mul_vec(&self.child_reduced, &shifted);
                    let length = matrix3::norm_sq(&image);
                    if length < best_length {
                        best = image;
                        best_length = length;
                    }
                }
            }
        }
        best
    }

    /// Displacements minus their projection onto the symmetric subspace
    ///
    /// The projection averages the field over the parent factor group
    /// operations that map the supercell onto itself, combined with every
    /// prim lattice translation inside the supercell.
    fn symmetry_breaking_displacements(
        &self,
        sites: &[SupercellSite],
        transformation: &IMatrix3,
        displacements: &[Vector3],
    ) -> Result<Vec<Vector3>> {
        let transformation_real = matrix3::to_real(transformation);
        let transformation_inverse = matrix3::inverse(&transformation_real)?;
        let translations = lattice_points_in_supercell(transformation);

        let mut symmetric = vec![[0.0; 3]; displacements.len()];
        let mut operation_count = 0usize;
        for op in &self.parent_factor_group {
            let conjugated = matrix3::mul(
                &matrix3::mul(&transformation_inverse, &matrix3::to_real(&op.frac_rotation)),
                &transformation_real,
            );
            if matrix3::round_to_int(&conjugated, SITE_MATCH_TOL).is_none() {
                continue;
            }
            for shift in &translations {
                let Some(images) = site_images(op, shift, sites, &transformation_inverse) else {
                    continue;
                };
                for (site, image) in images.into_iter().enumerate() {
                    let rotated = matrix3::mul_vec(&op.cart_rotation, &displacements[site]);
                    symmetric[image] = matrix3::vec_add(&symmetric[image], &rotated);
                }
                operation_count += 1;
            }
        }

        if operation_count == 0 {
            return Ok(displacements.to_vec());
        }
        let factor = 1.0 / operation_count as f64;
        Ok(displacements
            .iter()
            .zip(&symmetric)
            .map(|(u, sum)| matrix3::vec_sub(u, &matrix3::vec_scale(sum, factor)))
            .collect())
    }
}

/// Where each supercell site lands under `op` followed by a lattice shift
fn site_images(
    op: &SymOp,
    shift: &Vector3,
    sites: &[SupercellSite],
    transformation_inverse: &Matrix3,
) -> Option<Vec<usize>> {
    sites
        .iter()
        .map(|site| {
            let image = matrix3::vec_add(&op.apply_frac(&site.frac), shift);
            sites.iter().position(|target| {
                let offset = matrix3::vec_sub(&image, &target.frac);
                let in_supercell = wrap_difference(&matrix3::mul_vec(transformation_inverse, &offset));
                in_supercell.iter().all(|value| value.abs() < SITE_MATCH_TOL)
            })
        })
        .collect()
}
