// src/qtensor.rs
//
// Five-component representation of the nematic order parameter.
//
// A symmetric traceless 3x3 tensor is stored as [q0, q1, q2, q3, q4] with
//
//     | q0  q1  q2       |
//     | q1  q3  q4       |
//     | q2  q4  -q0 - q3 |
//
// Tracelessness holds by construction. Gradients of functions of the full
// matrix are mapped back onto the five components with `project`, which is the
// transpose of the linear map `to_matrix`.

/// Q-tensor at one lattice site.
pub type QTensor = [f64; 5];

/// Full 3x3 matrix, row-major.
pub type Mat3 = [[f64; 3]; 3];

pub const ZERO: QTensor = [0.0; 5];
pub const MAT3_ZERO: Mat3 = [[0.0; 3]; 3];

#[inline]
pub fn add(a: QTensor, b: QTensor) -> QTensor {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3], a[4] + b[4]]
}

#[inline]
pub fn sub(a: QTensor, b: QTensor) -> QTensor {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3], a[4] - b[4]]
}

#[inline]
pub fn scale(a: QTensor, s: f64) -> QTensor {
    [s * a[0], s * a[1], s * a[2], s * a[3], s * a[4]]
}

/// acc += s * a
#[inline]
pub fn add_scaled(acc: &mut QTensor, s: f64, a: &QTensor) {
    for (x, y) in acc.iter_mut().zip(a.iter()) {
        *x += s * y;
    }
}

/// Plain component dot product (not the matrix contraction).
#[inline]
pub fn dot(a: &QTensor, b: &QTensor) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3] + a[4] * b[4]
}

/// Expand to the full symmetric traceless matrix.
#[inline]
pub fn to_matrix(q: &QTensor) -> Mat3 {
    [
        [q[0], q[1], q[2]],
        [q[1], q[3], q[4]],
        [q[2], q[4], -q[0] - q[3]],
    ]
}

/// Chain rule from d/dQ_ij (all nine entries treated as independent) to d/dq_m.
#[inline]
pub fn project(g: &Mat3) -> QTensor {
    [
        g[0][0] - g[2][2],
        g[0][1] + g[1][0],
        g[0][2] + g[2][0],
        g[1][1] - g[2][2],
        g[1][2] + g[2][1],
    ]
}

#[inline]
pub fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = MAT3_ZERO;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Frobenius contraction a_ij b_ij.
#[inline]
pub fn contract(a: &Mat3, b: &Mat3) -> f64 {
    let mut s = 0.0;
    for i in 0..3 {
        for j in 0..3 {
            s += a[i][j] * b[i][j];
        }
    }
    s
}

/// Levi-Civita symbol.
#[inline]
pub fn levi_civita(i: usize, j: usize, k: usize) -> f64 {
    match (i, j, k) {
        (0, 1, 2) | (1, 2, 0) | (2, 0, 1) => 1.0,
        (0, 2, 1) | (2, 1, 0) | (1, 0, 2) => -1.0,
        _ => 0.0,
    }
}

/// tr(Q^2)
#[inline]
pub fn tr_q2(q: &QTensor) -> f64 {
    2.0 * (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3] + q[4] * q[4] + q[0] * q[3])
}

/// tr(Q^3)
pub fn tr_q3(q: &QTensor) -> f64 {
    let m = to_matrix(q);
    let m2 = mat_mul(&m, &m);
    contract(&m2, &m)
}

/// (tr Q^2)^2
#[inline]
pub fn tr_q2_squared(q: &QTensor) -> f64 {
    let t = tr_q2(q);
    t * t
}

/// d tr(Q^2) / dq
#[inline]
pub fn grad_tr_q2(q: &QTensor) -> QTensor {
    [
        2.0 * (2.0 * q[0] + q[3]),
        4.0 * q[1],
        4.0 * q[2],
        2.0 * (2.0 * q[3] + q[0]),
        4.0 * q[4],
    ]
}

/// d tr(Q^3) / dq
pub fn grad_tr_q3(q: &QTensor) -> QTensor {
    let m = to_matrix(q);
    let m2 = mat_mul(&m, &m);
    // d tr(Q^3) / dQ_ij = 3 (Q^2)_ji, and Q^2 is symmetric
    scale(project(&m2), 3.0)
}

/// Uniaxial tensor S (n n - I/3) for a director n (normalised here).
pub fn uniaxial(director: [f64; 3], s: f64) -> QTensor {
    let n = crate::vec3::normalize(director);
    [
        s * (n[0] * n[0] - 1.0 / 3.0),
        s * n[0] * n[1],
        s * n[0] * n[2],
        s * (n[1] * n[1] - 1.0 / 3.0),
        s * n[1] * n[2],
    ]
}
