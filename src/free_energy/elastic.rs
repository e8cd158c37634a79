// src/free_energy/elastic.rs
//
// Distortion (elastic) energy terms.
//
// With d[k][i][j] = ∂_k Q_ij taken from one derivative snapshot per site:
//   L1 : (L1/2) ∂_k Q_ij ∂_k Q_ij
//   L2 : (L2/2) ∂_j Q_ij ∂_k Q_ik
//   L3 : (L3/2) ∂_k Q_ij ∂_j Q_ik
//   L4 : (L4/2) ε_lik Q_lj ∂_k Q_ij
//   L6 : (L6/2) Q_lk ∂_l Q_ij ∂_k Q_ij
//   q0 : 2 L1 q0 ε_ikl Q_lj ∂_k Q_ij
// The q0 term is the cross term of (L1/2)|∂_k Q_ij + 2 q0 ε_ikl Q_lj|^2. The
// remaining 4 L1 q0^2 tr Q^2 piece has no gradient and belongs in A.
//
// Each term is a descriptor carrying its coefficient and a density/gradient
// pair. Gradients are taken with respect to the full matrices (entries treated
// as independent) and projected onto the five components, so energy and force
// always come from the same expression.

use crate::params::{DistortionEnergyType, ElasticConstants};
use crate::qtensor::{add_scaled, contract, dot, levi_civita, project, to_matrix, Mat3, QTensor, MAT3_ZERO};

/// Which coefficient a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ElasticConstant {
    L1,
    L2,
    L3,
    L4,
    L6,
    Chiral,
}

/// Inputs shared by every term at one site.
#[derive(Debug, Clone, Copy)]
pub struct TermInput {
    pub q: QTensor,
    pub d: [QTensor; 3],
    pub qm: Mat3,
    pub dm: [Mat3; 3],
}

impl TermInput {
    pub fn new(q: QTensor, d: [QTensor; 3]) -> Self {
        Self {
            q,
            d,
            qm: to_matrix(&q),
            dm: [to_matrix(&d[0]), to_matrix(&d[1]), to_matrix(&d[2])],
        }
    }
}

/// dE/dq and dE/dD_a for one site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TermGradient {
    pub q: QTensor,
    pub d: [QTensor; 3],
}

type DensityFn = fn(&ElasticConstants, &TermInput) -> f64;
type GradientFn = fn(&ElasticConstants, &TermInput, &mut TermGradient);

#[derive(Clone, Copy)]
pub struct ElasticTerm {
    pub constant: ElasticConstant,
    pub coefficient: f64,
    density: DensityFn,
    gradient: GradientFn,
}

impl std::fmt::Debug for ElasticTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticTerm")
            .field("constant", &self.constant)
            .field("coefficient", &self.coefficient)
            .finish()
    }
}

impl ElasticTerm {
    #[inline]
    pub fn energy(&self, k: &ElasticConstants, input: &TermInput) -> f64 {
        (self.density)(k, input)
    }

    /// Adds this term's gradient into `out`.
    #[inline]
    pub fn accumulate_gradient(&self, k: &ElasticConstants, input: &TermInput, out: &mut TermGradient) {
        (self.gradient)(k, input, out)
    }
}

/// Ordered list of enabled terms. Terms with a coefficient of exactly zero are
/// left out.
pub fn active_terms(k: &ElasticConstants) -> Vec<ElasticTerm> {
    use ElasticConstant::*;
    let candidates = match k.distortion {
        DistortionEnergyType::OneConstant => vec![term(L1, k.l1, l1_density, l1_gradient)],
        DistortionEnergyType::MultiConstant => vec![
            term(L1, k.l1, l1_density, l1_gradient),
            term(L2, k.l2, l2_density, l2_gradient),
            term(L3, k.l3, l3_density, l3_gradient),
            term(L4, k.l4, l4_density, l4_gradient),
            term(L6, k.l6, l6_density, l6_gradient),
            term(Chiral, 2.0 * k.l1 * k.q0, chiral_density, chiral_gradient),
        ],
    };
    candidates.into_iter().filter(|t| t.coefficient != 0.0).collect()
}

fn term(constant: ElasticConstant, coefficient: f64, density: DensityFn, gradient: GradientFn) -> ElasticTerm {
    ElasticTerm {
        constant,
        coefficient,
        density,
        gradient,
    }
}

/// Sum of the densities of `terms` at one site.
#[inline]
pub fn distortion_energy(terms: &[ElasticTerm], k: &ElasticConstants, input: &TermInput) -> f64 {
    terms.iter().map(|t| t.energy(k, input)).sum()
}

// --- L1 ---
//
// Kept in five-component form: (1/2) ∂Q:∂Q = |D|^2 + D0 D3 per axis.

fn l1_density(k: &ElasticConstants, input: &TermInput) -> f64 {
    input
        .d
        .iter()
        .map(|d| k.l1 * (dot(d, d) + d[0] * d[3]))
        .sum()
}

fn l1_gradient(k: &ElasticConstants, input: &TermInput, out: &mut TermGradient) {
    for (g, d) in out.d.iter_mut().zip(input.d.iter()) {
        g[0] += k.l1 * (2.0 * d[0] + d[3]);
        g[1] += k.l1 * 2.0 * d[1];
        g[2] += k.l1 * 2.0 * d[2];
        g[3] += k.l1 * (2.0 * d[3] + d[0]);
        g[4] += k.l1 * 2.0 * d[4];
    }
}

// --- L2 ---

/// v_i = ∂_j Q_ij
#[inline]
fn divergence(dm: &[Mat3; 3]) -> [f64; 3] {
    let mut v = [0.0; 3];
    for (i, vi) in v.iter_mut().enumerate() {
        *vi = dm[0][i][0] + dm[1][i][1] + dm[2][i][2];
    }
    v
}

fn l2_density(k: &ElasticConstants, input: &TermInput) -> f64 {
    let v = divergence(&input.dm);
    0.5 * k.l2 * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2])
}

fn l2_gradient(k: &ElasticConstants, input: &TermInput, out: &mut TermGradient) {
    let v = divergence(&input.dm);
    for (kk, g) in out.d.iter_mut().enumerate() {
        let mut gm = MAT3_ZERO;
        for (a, va) in v.iter().enumerate() {
            gm[a][kk] = k.l2 * va;
        }
        add_scaled(g, 1.0, &project(&gm));
    }
}

// --- L3 ---

fn l3_density(k: &ElasticConstants, input: &TermInput) -> f64 {
    let dm = &input.dm;
    let mut s = 0.0;
    for kk in 0..3 {
        for i in 0..3 {
            for j in 0..3 {
                s += dm[kk][i][j] * dm[j][i][kk];
            }
        }
    }
    0.5 * k.l3 * s
}

fn l3_gradient(k: &ElasticConstants, input: &TermInput, out: &mut TermGradient) {
    let dm = &input.dm;
    for (a, g) in out.d.iter_mut().enumerate() {
        let mut gm = MAT3_ZERO;
        for b in 0..3 {
            for c in 0..3 {
                gm[b][c] = k.l3 * dm[c][b][a];
            }
        }
        add_scaled(g, 1.0, &project(&gm));
    }
}

// --- L4 ---

fn l4_density(k: &ElasticConstants, input: &TermInput) -> f64 {
    let (qm, dm) = (&input.qm, &input.dm);
    let mut s = 0.0;
    for l in 0..3 {
        for i in 0..3 {
            for kk in 0..3 {
                let e = levi_civita(l, i, kk);
                if e == 0.0 {
                    continue;
                }
                for j in 0..3 {
                    s += e * qm[l][j] * dm[kk][i][j];
                }
            }
        }
    }
    0.5 * k.l4 * s
}

fn l4_gradient(k: &ElasticConstants, input: &TermInput, out: &mut TermGradient) {
    let (qm, dm) = (&input.qm, &input.dm);
    let mut gq = MAT3_ZERO;
    let mut gd = [MAT3_ZERO; 3];
    for l in 0..3 {
        for i in 0..3 {
            for kk in 0..3 {
                let e = 0.5 * k.l4 * levi_civita(l, i, kk);
                if e == 0.0 {
                    continue;
                }
                for j in 0..3 {
                    gq[l][j] += e * dm[kk][i][j];
                    gd[kk][i][j] += e * qm[l][j];
                }
            }
        }
    }
    add_scaled(&mut out.q, 1.0, &project(&gq));
    for (g, m) in out.d.iter_mut().zip(gd.iter()) {
        add_scaled(g, 1.0, &project(m));
    }
}

// --- L6 ---

fn l6_density(k: &ElasticConstants, input: &TermInput) -> f64 {
    let (qm, dm) = (&input.qm, &input.dm);
    let mut s = 0.0;
    for l in 0..3 {
        for kk in 0..3 {
            if qm[l][kk] != 0.0 {
                s += qm[l][kk] * contract(&dm[l], &dm[kk]);
            }
        }
    }
    0.5 * k.l6 * s
}

fn l6_gradient(k: &ElasticConstants, input: &TermInput, out: &mut TermGradient) {
    let (qm, dm) = (&input.qm, &input.dm);
    let mut gq = MAT3_ZERO;
    for l in 0..3 {
        for kk in 0..3 {
            gq[l][kk] = 0.5 * k.l6 * contract(&dm[l], &dm[kk]);
        }
    }
    add_scaled(&mut out.q, 1.0, &project(&gq));

    for (a, g) in out.d.iter_mut().enumerate() {
        let mut gm = MAT3_ZERO;
        for kk in 0..3 {
            let w = 0.5 * k.l6 * (qm[a][kk] + qm[kk][a]);
            if w == 0.0 {
                continue;
            }
            for i in 0..3 {
                for j in 0..3 {
                    gm[i][j] += w * dm[kk][i][j];
                }
            }
        }
        add_scaled(g, 1.0, &project(&gm));
    }
}

// --- chiral (q0) ---

fn chiral_density(k: &ElasticConstants, input: &TermInput) -> f64 {
    let (qm, dm) = (&input.qm, &input.dm);
    let mut s = 0.0;
    for i in 0..3 {
        for kk in 0..3 {
            for l in 0..3 {
                let e = levi_civita(i, kk, l);
                if e == 0.0 {
                    continue;
                }
                for j in 0..3 {
                    s += e * qm[l][j] * dm[kk][i][j];
                }
            }
        }
    }
    2.0 * k.l1 * k.q0 * s
}

fn chiral_gradient(k: &ElasticConstants, input: &TermInput, out: &mut TermGradient) {
    let (qm, dm) = (&input.qm, &input.dm);
    let pref = 2.0 * k.l1 * k.q0;
    let mut gq = MAT3_ZERO;
    let mut gd = [MAT3_ZERO; 3];
    for i in 0..3 {
        for kk in 0..3 {
            for l in 0..3 {
                let e = pref * levi_civita(i, kk, l);
                if e == 0.0 {
                    continue;
                }
                for j in 0..3 {
                    gq[l][j] += e * dm[kk][i][j];
                    gd[kk][i][j] += e * qm[l][j];
                }
            }
        }
    }
    add_scaled(&mut out.q, 1.0, &project(&gq));
    for (g, m) in out.d.iter_mut().zip(gd.iter()) {
        add_scaled(g, 1.0, &project(m));
    }
}
