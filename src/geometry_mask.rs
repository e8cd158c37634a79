// src/geometry_mask.rs
//
// Site masks on a cubic lattice and boundary registration.
//
// Coordinates are centred site positions in lattice units:
//   x = i + 0.5 - lx/2   (likewise y, z)
// so (0,0,0) is the middle of the box.
//
// `add_boundary` turns the masked sites into the surface of a new boundary
// object and then re-marks the liquid-crystal sites: -1 next to any boundary
// surface, 0 otherwise.

use crate::lattice::{AnchoringLaw, BoundaryObject, CubicLattice, Lattice, SiteKind};
use crate::qtensor::uniaxial;
use crate::vec3::normalize;

/// One bool per site (true = inside).
pub type Mask3D = Vec<bool>;

#[inline]
pub fn site_center_centered(lattice: &CubicLattice, site: usize) -> [f64; 3] {
    let (i, j, k) = lattice.coords(site);
    [
        i as f64 + 0.5 - 0.5 * lattice.lx as f64,
        j as f64 + 0.5 - 0.5 * lattice.ly as f64,
        k as f64 + 0.5 - 0.5 * lattice.lz as f64,
    ]
}

/// Build a mask from a predicate on centred coordinates.
pub fn mask_from_fn<F>(lattice: &CubicLattice, f: F) -> Mask3D
where
    F: Fn([f64; 3]) -> bool,
{
    (0..lattice.n_sites())
        .map(|site| f(site_center_centered(lattice, site)))
        .collect()
}

/// The lowest and highest `thickness` layers along z.
pub fn mask_z_walls(lattice: &CubicLattice, thickness: usize) -> Mask3D {
    (0..lattice.n_sites())
        .map(|site| {
            let (_, _, k) = lattice.coords(site);
            k < thickness || k + thickness >= lattice.lz
        })
        .collect()
}

/// Solid sphere |r - c| <= radius.
pub fn mask_sphere(lattice: &CubicLattice, radius: f64, center: [f64; 3]) -> Mask3D {
    let r2 = radius * radius;
    mask_from_fn(lattice, move |p| {
        let dx = p[0] - center[0];
        let dy = p[1] - center[1];
        let dz = p[2] - center[2];
        dx * dx + dy * dy + dz * dz <= r2
    })
}

/// Union (A ∪ B).
pub fn mask_union(a: &[bool], b: &[bool]) -> Mask3D {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&aa, &bb)| aa || bb).collect()
}

/// Difference (A \ B).
pub fn mask_difference(a: &[bool], b: &[bool]) -> Mask3D {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&aa, &bb)| aa && !bb).collect()
}

pub fn mask_count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&v| v).count()
}

/// Register `object` over the masked sites and return its index.
///
/// Each surface site stores what its anchoring law reads: the preferred
/// tensor S0 (nn - I/3) with n = normal(x) for homeotropic anchoring, or the
/// normal itself in the first three components for degenerate planar.
pub fn add_boundary<F>(lattice: &mut CubicLattice, mask: &[bool], object: BoundaryObject, normal: F) -> usize
where
    F: Fn([f64; 3]) -> [f64; 3],
{
    assert_eq!(mask.len(), lattice.n_sites());
    let index = lattice.boundaries.len();
    lattice.boundaries.push(object);
    let code = index as i32 + 1;

    for site in 0..lattice.n_sites() {
        if !mask[site] {
            continue;
        }
        let nu = normalize(normal(site_center_centered(lattice, site)));
        lattice.types[site] = code;
        lattice.q[site] = match object.law {
            AnchoringLaw::Homeotropic => uniaxial(nu, object.s0),
            AnchoringLaw::DegeneratePlanar => [nu[0], nu[1], nu[2], 0.0, 0.0],
        };
    }
    mark_boundary_neighbors(lattice);
    log::debug!(
        "boundary object {} ({:?}): {} surface sites",
        index,
        object.law,
        mask_count(mask)
    );
    index
}

/// Recompute the sign of every liquid-crystal type code from adjacency.
pub fn mark_boundary_neighbors(lattice: &mut CubicLattice) {
    let codes: Vec<i32> = (0..lattice.n_sites())
        .map(|site| {
            let code = lattice.types[site];
            if !SiteKind::from_code(code).is_lc() {
                return code;
            }
            let touches = lattice
                .neighbors(site)
                .axis
                .iter()
                .any(|&n| !SiteKind::from_code(lattice.types[n]).is_lc());
            if touches {
                -1
            } else {
                0
            }
        })
        .collect();
    lattice.types = codes;
}
