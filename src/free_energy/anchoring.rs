// src/free_energy/anchoring.rs
//
// Surface anchoring at liquid-crystal sites next to boundary sites.
//
// Homeotropic (Rapini–Papoular in Q form):
//   f = W0 tr[(Q - Q_b)^2]
// with Q_b the tensor stored on the boundary site.
//
// Degenerate planar (Fournier–Galatola):
//   Q~    = Q + (S0/3) I
//   Q~perp = P Q~ P,  P = I - nu nu
//   f = W1 tr[(Q~ - Q~perp)^2] + W2 (tr Q~^2 - S0^2)^2
// with nu the surface normal stored in the first three components of the
// boundary site.
//
// Every boundary-typed face of a site contributes independently.

use crate::lattice::{AnchoringLaw, BoundaryObject};
use crate::qtensor::{
    add, contract, grad_tr_q2, mat_mul, project, scale, sub, to_matrix, tr_q2, Mat3, QTensor, ZERO,
};
use crate::vec3::normalize;

use super::stencil::SiteStencil;

/// Anchoring energy of `q` against one boundary face.
pub fn boundary_energy(q: &QTensor, q_boundary: &QTensor, object: &BoundaryObject) -> f64 {
    match object.law {
        AnchoringLaw::Homeotropic => object.strength * tr_q2(&sub(*q, *q_boundary)),
        AnchoringLaw::DegeneratePlanar => {
            let (qt, m) = planar_parts(q, q_boundary, object.s0);
            let excess = contract(&qt, &qt) - object.s0 * object.s0;
            object.strength * contract(&m, &m) + object.second_strength * excess * excess
        }
    }
}

/// d/dq of `boundary_energy`.
pub fn boundary_gradient(q: &QTensor, q_boundary: &QTensor, object: &BoundaryObject) -> QTensor {
    match object.law {
        AnchoringLaw::Homeotropic => scale(grad_tr_q2(&sub(*q, *q_boundary)), object.strength),
        AnchoringLaw::DegeneratePlanar => {
            let (qt, m) = planar_parts(q, q_boundary, object.s0);
            let excess = contract(&qt, &qt) - object.s0 * object.s0;
            // Q -> Q - PQP is an orthogonal projection, so d tr(M^2)/dQ~ = 2M.
            let mut g = [[0.0; 3]; 3];
            for i in 0..3 {
                for j in 0..3 {
                    g[i][j] = 2.0 * object.strength * m[i][j]
                        + 4.0 * object.second_strength * excess * qt[i][j];
                }
            }
            project(&g)
        }
    }
}

/// Returns (Q~, Q~ - P Q~ P).
fn planar_parts(q: &QTensor, q_boundary: &QTensor, s0: f64) -> (Mat3, Mat3) {
    let nu = normalize([q_boundary[0], q_boundary[1], q_boundary[2]]);
    let mut qt = to_matrix(q);
    for (i, row) in qt.iter_mut().enumerate() {
        row[i] += s0 / 3.0;
    }
    let mut p = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            p[i][j] = if i == j { 1.0 } else { 0.0 } - nu[i] * nu[j];
        }
    }
    let perp = mat_mul(&mat_mul(&p, &qt), &p);
    let mut m = qt;
    for i in 0..3 {
        for j in 0..3 {
            m[i][j] -= perp[i][j];
        }
    }
    (qt, m)
}

/// Total anchoring energy at a site (zero unless the stencil carries faces).
pub fn site_anchoring_energy(
    stencil: &SiteStencil,
    q: &[QTensor],
    boundaries: &[BoundaryObject],
) -> f64 {
    let mut e = 0.0;
    for (dir, face) in stencil.faces.iter().enumerate() {
        if let Some(object) = face {
            let neighbor = stencil.neighbors[dir];
            e += boundary_energy(&q[stencil.site], &q[neighbor], &boundaries[*object]);
        }
    }
    e
}

/// d/dq of `site_anchoring_energy`.
pub fn site_anchoring_gradient(
    stencil: &SiteStencil,
    q: &[QTensor],
    boundaries: &[BoundaryObject],
) -> QTensor {
    let mut g = ZERO;
    for (dir, face) in stencil.faces.iter().enumerate() {
        if let Some(object) = face {
            let neighbor = stencil.neighbors[dir];
            g = add(g, boundary_gradient(&q[stencil.site], &q[neighbor], &boundaries[*object]));
        }
    }
    g
}
