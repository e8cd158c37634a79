// tests/execution_modes.rs
//
// Integration tests for the dual execution paths:
// - Serial and Parallel must give the same energies and forces on the same
//   lattice snapshot, for both distortion types.
// - Launch tuning only changes how sites are split, never the values.
// - Overwrite / Accumulate and Interior / Full combine as documented.

use qtensor_ldg::dispatch::ExecutionMode;
use qtensor_ldg::free_energy::{ForcePass, LandauDeGennes, WriteMode};
use qtensor_ldg::geometry_mask::{add_boundary, mask_sphere, mask_z_walls};
use qtensor_ldg::initial_states::{init_cholesteric, init_uniform_with_noise};
use qtensor_ldg::lattice::{BoundaryObject, CubicLattice, Edges, Lattice};
use qtensor_ldg::params::{ElasticConstants, FieldCoupling};
use qtensor_ldg::qtensor::QTensor;

fn rel_close(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1.0)
}

/// 12x12x14 periodic box with z walls and a spherical colloid.
fn colloid_cell(seed: u64) -> CubicLattice {
    let mut l = CubicLattice::new(12, 12, 14, Edges::Periodic);
    let walls = mask_z_walls(&l, 1);
    add_boundary(&mut l, &walls, BoundaryObject::homeotropic(3.0, 0.53), |_| [0.0, 0.0, 1.0]);
    let sphere = mask_sphere(&l, 2.6, [0.0, 0.0, 0.0]);
    add_boundary(&mut l, &sphere, BoundaryObject::degenerate_planar(2.0, 1.0, 0.53), |p| p);
    init_uniform_with_noise(&mut l, [1.0, 0.2, 0.1], 0.53, 0.3, seed);
    l
}

fn setups() -> Vec<ElasticConstants> {
    vec![
        ElasticConstants::one_constant(-0.172, -2.12, 1.73, 1.0),
        ElasticConstants::multi_constant(-0.172, -2.12, 1.73, 1.0, 0.7, -0.2, 0.3, 0.4).with_chirality(0.1),
    ]
}

fn run(
    k: ElasticConstants,
    l: &mut CubicLattice,
    mode: ExecutionMode,
    repeats: usize,
) -> (qtensor_ldg::free_energy::EnergyChannels, Vec<f64>, Vec<QTensor>) {
    let mut ldg = LandauDeGennes::new(k).with_execution_mode(mode);
    ldg.set_e_field(FieldCoupling::electric([0.2, 0.0, 0.5], 1.5, 1.0).with_scale(1.0), true);
    ldg.set_h_field(FieldCoupling::magnetic([0.0, 0.3, 0.0], 0.8, 1.0).with_scale(1.0), true);
    ldg.bind_lattice(l).unwrap();
    let mut f = vec![[0.0; 5]; l.n_sites()];
    let mut e = ldg.compute_energy(&*l, false).unwrap();
    // Repeated launches walk the tuner through its candidates.
    for _ in 0..repeats {
        e = ldg.compute_energy(&*l, false).unwrap();
        ldg.compute_forces(&*l, &mut f, WriteMode::Overwrite, ForcePass::Full).unwrap();
    }
    (e, ldg.energy_density().to_vec(), f)
}

#[test]
fn serial_and_parallel_agree() {
    for k in setups() {
        let mut l = colloid_cell(17);
        let (es, ds, fs) = run(k, &mut l, ExecutionMode::Serial, 1);
        let (ep, dp, fp) = run(k, &mut l, ExecutionMode::Parallel, 1);

        for (a, b) in es.channels().iter().zip(ep.channels().iter()) {
            assert!(rel_close(*a, *b, 1e-10), "channel {a} vs {b}");
        }
        assert!(rel_close(es.total, ep.total, 1e-10));
        for (a, b) in ds.iter().zip(&dp) {
            assert!(rel_close(*a, *b, 1e-10));
        }
        for (a, b) in fs.iter().zip(&fp) {
            for m in 0..5 {
                assert!(rel_close(a[m], b[m], 1e-10), "{a:?} vs {b:?}");
            }
        }
    }
}

#[test]
fn tuning_never_changes_results() {
    let k = setups()[1];
    let mut l = colloid_cell(29);
    let (e1, _, f1) = run(k, &mut l, ExecutionMode::Parallel, 1);
    // enough launches to sample every candidate and lock one in
    let (e2, _, f2) = run(k, &mut l, ExecutionMode::Parallel, 60);
    assert_eq!(e1.total, e2.total);
    assert_eq!(f1, f2);
}

#[test]
fn accumulate_adds_onto_existing_forces() {
    for k in setups() {
        let mut l = CubicLattice::new(6, 6, 8, Edges::Periodic);
        let walls = mask_z_walls(&l, 1);
        add_boundary(&mut l, &walls, BoundaryObject::homeotropic(1.0, 0.5), |_| [0.0, 1.0, 1.0]);
        init_cholesteric(&mut l, 6.0, 0.5);

        let mut ldg = LandauDeGennes::new(k).with_execution_mode(ExecutionMode::Parallel);
        ldg.bind_lattice(&mut l).unwrap();

        let mut fresh = vec![[0.0; 5]; l.n_sites()];
        ldg.compute_forces(&l, &mut fresh, WriteMode::Overwrite, ForcePass::Full).unwrap();

        let offset = [0.25, -0.5, 1.0, 0.0, 2.0];
        let mut acc = vec![offset; l.n_sites()];
        ldg.compute_forces(&l, &mut acc, WriteMode::Accumulate, ForcePass::Full).unwrap();

        for (site, (a, f)) in acc.iter().zip(&fresh).enumerate() {
            for m in 0..5 {
                assert!(
                    (a[m] - offset[m] - f[m]).abs() < 1e-12,
                    "site {site} comp {m}: {} vs {}",
                    a[m] - offset[m],
                    f[m]
                );
            }
        }
    }
}

#[test]
fn interior_then_boundary_accumulate_matches_full() {
    for k in setups() {
        let mut l = colloid_cell(5);
        let mut ldg = LandauDeGennes::new(k).with_execution_mode(ExecutionMode::Serial);
        ldg.set_e_field(FieldCoupling::electric([0.0, 0.0, 1.0], 1.0, 1.0).with_scale(1.0), true);
        ldg.bind_lattice(&mut l).unwrap();

        let mut full = vec![[0.0; 5]; l.n_sites()];
        ldg.compute_forces(&l, &mut full, WriteMode::Overwrite, ForcePass::Full).unwrap();

        // Full = Interior + (Full - Interior) computed as two accumulating calls
        let mut interior = vec![[0.0; 5]; l.n_sites()];
        ldg.compute_forces(&l, &mut interior, WriteMode::Overwrite, ForcePass::Interior).unwrap();
        let mut twice = interior.clone();
        ldg.compute_forces(&l, &mut twice, WriteMode::Accumulate, ForcePass::Full).unwrap();

        for site in 0..l.n_sites() {
            for m in 0..5 {
                let expect = interior[site][m] + full[site][m];
                assert!((twice[site][m] - expect).abs() < 1e-12);
            }
        }
    }
}
