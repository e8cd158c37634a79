// src/free_energy/phase.rs
//
// Bulk Landau–de Gennes phase energy:
//   f_phase = (A/2) tr Q^2 + (B/3) tr Q^3 + (C/4) (tr Q^2)^2

use crate::params::ElasticConstants;
use crate::qtensor::{add_scaled, grad_tr_q2, grad_tr_q3, tr_q2, tr_q2_squared, tr_q3, QTensor, ZERO};

#[inline]
pub fn phase_energy(k: &ElasticConstants, q: &QTensor) -> f64 {
    let a = 0.5 * k.a;
    let b = k.b / 3.0;
    let c = 0.25 * k.c;
    a * tr_q2(q) + b * tr_q3(q) + c * tr_q2_squared(q)
}

/// d f_phase / dq
pub fn phase_gradient(k: &ElasticConstants, q: &QTensor) -> QTensor {
    let a = 0.5 * k.a;
    let b = k.b / 3.0;
    let c = 0.25 * k.c;
    let g2 = grad_tr_q2(q);
    let mut g = ZERO;
    add_scaled(&mut g, a + 2.0 * c * tr_q2(q), &g2);
    if b != 0.0 {
        add_scaled(&mut g, b, &grad_tr_q3(q));
    }
    g
}
