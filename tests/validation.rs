// tests/validation.rs
//
// Integration-style validation tests (free energy and force sanity checks).
// Run with: cargo test
// Or only these tests: cargo test --test validation

use qtensor_ldg::dispatch::ExecutionMode;
use qtensor_ldg::free_energy::{ElasticConstant, ForcePass, LandauDeGennes, WriteMode};
use qtensor_ldg::geometry_mask::{add_boundary, mask_from_fn};
use qtensor_ldg::lattice::{BoundaryObject, CubicLattice, Edges, Lattice, SiteKind};
use qtensor_ldg::params::{ElasticConstants, FieldCoupling};
use qtensor_ldg::qtensor::{uniaxial, QTensor};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn xorshift64(seed: &mut u64) -> u64 {
    let mut x = *seed;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *seed = x;
    x
}

fn rand_sym(seed: &mut u64, amp: f64) -> f64 {
    let u = (xorshift64(seed) >> 11) as f64 / (1u64 << 53) as f64;
    amp * (2.0 * u - 1.0)
}

/// Random (biaxial) tensors on every LC site.
fn randomize_lc(l: &mut CubicLattice, mut seed: u64) {
    for site in 0..l.n_sites() {
        if SiteKind::from_code(l.types[site]).is_lc() {
            let mut q = [0.0; 5];
            for c in q.iter_mut() {
                *c = rand_sym(&mut seed, 0.3);
            }
            l.q[site] = q;
        }
    }
}

/// Box with a homeotropic floor, a planar ceiling and a homeotropic pillar
/// along z, so anchored sites see faces on every axis.
fn walled_box(lx: usize, ly: usize, lz: usize, edges: Edges, seed: u64) -> CubicLattice {
    let mut l = CubicLattice::new(lx, ly, lz, edges);
    let zmax = 0.5 * lz as f64 - 1.0;
    let xmin = -0.5 * lx as f64 + 1.0;
    let ymin = -0.5 * ly as f64 + 1.0;
    let floor = mask_from_fn(&l, |p| p[2] < -zmax);
    let ceiling = mask_from_fn(&l, |p| p[2] > zmax);
    let pillar = mask_from_fn(&l, |p| p[0] < xmin && p[1] < ymin && p[2].abs() < zmax);
    add_boundary(&mut l, &floor, BoundaryObject::homeotropic(2.0, 0.5), |_| [0.2, 0.1, 1.0]);
    add_boundary(&mut l, &ceiling, BoundaryObject::degenerate_planar(1.5, 0.7, 0.5), |_| {
        [0.0, 0.3, -1.0]
    });
    add_boundary(&mut l, &pillar, BoundaryObject::homeotropic(0.8, 0.4), |_| [1.0, 0.0, 0.0]);
    randomize_lc(&mut l, seed);
    l
}

fn all_terms() -> ElasticConstants {
    ElasticConstants::multi_constant(-0.4, -1.3, 1.1, 1.0, 0.6, -0.35, 0.45, 0.3).with_chirality(0.25)
}

fn engine(k: ElasticConstants, l: &mut CubicLattice) -> LandauDeGennes {
    let mut ldg = LandauDeGennes::new(k).with_execution_mode(ExecutionMode::Serial);
    ldg.bind_lattice(l).unwrap();
    ldg
}

fn forces(ldg: &mut LandauDeGennes, l: &CubicLattice, pass: ForcePass) -> Vec<QTensor> {
    let mut f = vec![[0.0; 5]; l.n_sites()];
    ldg.compute_forces(l, &mut f, WriteMode::Overwrite, pass).unwrap();
    f
}

/// F_j = -dE/dq_j checked component by component with central differences.
fn assert_forces_match_energy(ldg: &mut LandauDeGennes, l: &mut CubicLattice) {
    let f = forces(ldg, l, ForcePass::Full);
    let h = 1e-5;
    let mut checked = 0;
    for site in 0..l.n_sites() {
        if !SiteKind::from_code(l.types[site]).is_lc() {
            assert_eq!(f[site], [0.0; 5]);
            continue;
        }
        for m in 0..5 {
            let q0 = l.q[site][m];
            l.q[site][m] = q0 + h;
            let ep = ldg.compute_energy(&*l, false).unwrap().total;
            l.q[site][m] = q0 - h;
            let em = ldg.compute_energy(&*l, false).unwrap().total;
            l.q[site][m] = q0;
            let fd = -(ep - em) / (2.0 * h);
            assert!(
                approx_eq(f[site][m], fd, 1e-6 * (1.0 + fd.abs())),
                "site {site} comp {m} ({:?}): force={:.9e}, -dE/dq={:.9e}",
                SiteKind::from_code(l.types[site]),
                f[site][m],
                fd
            );
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn two_site_chain_matches_reference_distortion() {
    let mut l = CubicLattice::new(2, 1, 1, Edges::Clamped);
    l.q[0] = [1.0, 0.0, 0.0, 0.0, 0.0];
    l.q[1] = [0.0; 5];
    let mut ldg = engine(ElasticConstants::one_constant(0.0, 0.0, 0.0, 1.0), &mut l);
    let e = ldg.compute_energy(&l, false).unwrap();

    // Clamped ends: each site reads itself on the open side, so
    // delta = 0.5 * (q1 - q0) at both sites and e = L1 * dot(delta, delta).
    let delta = [-0.5, 0.0, 0.0, 0.0, 0.0];
    let expected: f64 = delta.iter().map(|d| d * d).sum();
    assert_eq!(ldg.energy_density()[0], expected);
    assert_eq!(ldg.energy_density()[1], expected);
    assert_eq!(e.distortion, 2.0 * expected);
    assert_eq!(e.phase, 0.0);
    assert_eq!(e.total, 0.5);

    // Periodic: both neighbours of each site are the other site, so the
    // centred difference vanishes.
    let mut p = CubicLattice::new(2, 1, 1, Edges::Periodic);
    p.q = l.q.clone();
    let mut ldg = engine(ElasticConstants::one_constant(0.0, 0.0, 0.0, 1.0), &mut p);
    assert_eq!(ldg.compute_energy(&p, false).unwrap().distortion, 0.0);
}

#[test]
fn uniform_field_has_no_distortion_energy_or_force() {
    let q = uniaxial([0.3, -0.5, 0.8], 0.45);
    for k in [ElasticConstants::one_constant(-0.2, -1.0, 1.0, 1.3), all_terms()] {
        let mut l = CubicLattice::new(4, 3, 5, Edges::Periodic);
        l.set_uniform(q);
        let mut ldg = engine(k, &mut l);
        let e = ldg.compute_energy(&l, false).unwrap();
        assert!(e.distortion.abs() < 1e-14, "distortion={:.3e}", e.distortion);

        // Only the phase force remains.
        let f = forces(&mut ldg, &l, ForcePass::Interior);
        let mut phase_only = engine(ElasticConstants::one_constant(k.a, k.b, k.c, 0.0), &mut l);
        let g = forces(&mut phase_only, &l, ForcePass::Interior);
        for (a, b) in f.iter().zip(&g) {
            for m in 0..5 {
                assert!(approx_eq(a[m], b[m], 1e-13), "{a:?} vs {b:?}");
            }
        }
    }
}

#[test]
fn bulk_only_lattice_has_zero_anchoring() {
    let mut l = CubicLattice::new(5, 4, 3, Edges::Periodic);
    randomize_lc(&mut l, 11);
    let mut ldg = engine(all_terms(), &mut l);
    let e = ldg.compute_energy(&l, true).unwrap();
    assert_eq!(e.anchoring, 0.0);
    assert!(e.distortion != 0.0);
    let interior = forces(&mut ldg, &l, ForcePass::Interior);
    let full = forces(&mut ldg, &l, ForcePass::Full);
    assert_eq!(interior, full);
}

#[test]
fn bulk_code_next_to_boundary_skips_anchoring() {
    let mut l = walled_box(4, 4, 6, Edges::Periodic, 17);
    let mut touching = 0;
    for site in 0..l.n_sites() {
        if l.types[site] < 0 {
            l.types[site] = 0;
            touching += 1;
        }
    }
    assert!(touching > 0);
    let mut ldg = engine(all_terms(), &mut l);
    let e = ldg.compute_energy(&l, false).unwrap();
    assert_eq!(e.anchoring, 0.0);
    let interior = forces(&mut ldg, &l, ForcePass::Interior);
    let full = forces(&mut ldg, &l, ForcePass::Full);
    assert_eq!(interior, full);
}

#[test]
fn channel_total_equals_sum_of_channels_and_densities() {
    let mut l = walled_box(4, 4, 6, Edges::Periodic, 5);
    let mut ldg = engine(all_terms(), &mut l);
    ldg.set_e_field(FieldCoupling::electric([0.4, -0.2, 0.9], 1.7, 2.0).with_scale(1.0), true);
    ldg.set_h_field(FieldCoupling::magnetic([0.0, 0.5, 0.1], -0.6, 1.0).with_scale(1.0), true);
    let e = ldg.compute_energy(&l, false).unwrap();

    let channel_sum: f64 = e.channels().iter().sum();
    assert!(approx_eq(e.total, channel_sum, 1e-12));

    let density_sum: f64 = ldg.energy_density().iter().sum();
    assert!(approx_eq(e.total, density_sum, 1e-10 * (1.0 + e.total.abs())));

    for site in 0..l.n_sites() {
        if !SiteKind::from_code(l.types[site]).is_lc() {
            assert_eq!(ldg.energy_density()[site], 0.0);
        }
    }
    assert!(e.anchoring > 0.0);
    assert!(e.e_field != 0.0 && e.h_field != 0.0);
}

#[test]
fn disabled_field_contributes_nothing() {
    let mut l = walled_box(4, 4, 6, Edges::Periodic, 9);
    let mut ldg = engine(all_terms(), &mut l);
    let coupling = FieldCoupling::electric([0.4, -0.2, 0.9], 1.7, 2.0).with_scale(1.0);
    let before = forces(&mut ldg, &l, ForcePass::Full);
    ldg.set_e_field(coupling, false);
    assert_eq!(ldg.compute_energy(&l, false).unwrap().e_field, 0.0);
    assert_eq!(forces(&mut ldg, &l, ForcePass::Full), before);
    ldg.set_e_field(coupling, true);
    assert!(ldg.compute_energy(&l, false).unwrap().e_field != 0.0);
}

#[test]
fn multi_constant_forces_are_the_energy_gradient() {
    let mut l = walled_box(4, 4, 6, Edges::Periodic, 21);
    let mut ldg = engine(all_terms(), &mut l);
    ldg.set_e_field(FieldCoupling::electric([0.4, -0.2, 0.9], 1.7, 2.0).with_scale(1.0), true);
    ldg.set_h_field(FieldCoupling::magnetic([0.0, 0.5, 0.1], -0.6, 1.0).with_scale(1.0), true);
    assert_eq!(ldg.active_terms().len(), 6);
    assert_forces_match_energy(&mut ldg, &mut l);
}

#[test]
fn one_constant_forces_are_the_energy_gradient() {
    let mut l = walled_box(4, 5, 6, Edges::Periodic, 33);
    let mut ldg = engine(ElasticConstants::one_constant(-0.3, -1.1, 0.9, 1.4), &mut l);
    assert_forces_match_energy(&mut ldg, &mut l);
}

#[test]
fn clamped_lattice_forces_are_the_energy_gradient() {
    // Clamped edges make stencil slots coincide with the site itself.
    let mut l = walled_box(3, 2, 5, Edges::Clamped, 47);
    let mut ldg = engine(all_terms(), &mut l);
    assert_forces_match_energy(&mut ldg, &mut l);

    let mut l = walled_box(3, 2, 5, Edges::Clamped, 48);
    let mut ldg = engine(ElasticConstants::one_constant(0.0, 0.0, 0.0, 1.0), &mut l);
    assert_forces_match_energy(&mut ldg, &mut l);
}

#[test]
fn each_term_alone_is_consistent() {
    let singles = [
        (ElasticConstant::L1, ElasticConstants::multi_constant(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0)),
        (ElasticConstant::L2, ElasticConstants::multi_constant(0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0)),
        (ElasticConstant::L3, ElasticConstants::multi_constant(0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0)),
        (ElasticConstant::L4, ElasticConstants::multi_constant(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0)),
        (ElasticConstant::L6, ElasticConstants::multi_constant(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0)),
    ];
    for (constant, k) in singles {
        let mut l = walled_box(4, 4, 5, Edges::Periodic, 60);
        let mut ldg = engine(k, &mut l);
        let kinds: Vec<_> = ldg.active_terms().iter().map(|t| t.constant).collect();
        assert_eq!(kinds, vec![constant]);
        assert_forces_match_energy(&mut ldg, &mut l);
    }
}

#[test]
fn force_sensitivity_grows_with_coefficient() {
    let mut l = walled_box(4, 4, 6, Edges::Periodic, 77);
    let base = ElasticConstants::multi_constant(-0.3, -1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0);
    let mut ldg = engine(base, &mut l);
    let f0 = forces(&mut ldg, &l, ForcePass::Full);

    let mut last = 0.0;
    for l2 in [1e-4, 1e-3, 1e-2, 1e-1] {
        let mut k = base;
        k.l2 = l2;
        ldg.set_elastic_constants(k);
        let f = forces(&mut ldg, &l, ForcePass::Full);
        let diff: f64 = f
            .iter()
            .zip(&f0)
            .map(|(a, b)| (0..5).map(|m| (a[m] - b[m]).powi(2)).sum::<f64>())
            .sum::<f64>()
            .sqrt();
        assert!(diff > 0.0);
        assert!(diff >= last, "L2={l2}: {diff:.3e} < {last:.3e}");
        last = diff;
    }
}

#[test]
fn full_pass_adds_boundary_and_field_forces() {
    let mut l = walled_box(4, 4, 6, Edges::Periodic, 91);
    let mut ldg = engine(all_terms(), &mut l);
    let field = FieldCoupling::electric([0.0, 0.0, 1.0], 2.0, 1.0).with_scale(1.0);
    ldg.set_e_field(field, true);
    let interior = forces(&mut ldg, &l, ForcePass::Interior);
    let full = forces(&mut ldg, &l, ForcePass::Full);
    for site in 0..l.n_sites() {
        match SiteKind::from_code(l.types[site]) {
            SiteKind::BoundarySurface(_) => assert_eq!(full[site], [0.0; 5]),
            SiteKind::Bulk => {
                // field force only: -(0.5 de ez^2, 0, 0, 0.5 de ez^2, 0)
                assert!(approx_eq(full[site][0] - interior[site][0], -1.0, 1e-12));
                assert!(approx_eq(full[site][3] - interior[site][3], -1.0, 1e-12));
                assert!(approx_eq(full[site][1], interior[site][1], 1e-12));
            }
            SiteKind::AnchoredBoundaryNeighbor => {
                let d: f64 = (0..5).map(|m| (full[site][m] - interior[site][m]).abs()).sum();
                assert!(d > 0.0);
            }
        }
    }
}
