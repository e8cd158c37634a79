// src/free_energy/field.rs
//
// Electric / magnetic field coupling. Purely local and linear in Q, so the
// force is a constant per call and independent of the site.

use crate::params::FieldCoupling;
use crate::qtensor::QTensor;

/// Field energy density at a site.
#[inline]
pub fn field_energy(f: &FieldCoupling, q: &QTensor) -> f64 {
    let [ex, ey, ez] = f.field;
    let eps = f.baseline;
    let de = f.anisotropy;
    f.scale
        * (-0.5 * ex * ex * (eps + de * q[0])
            - de * ex * ey * q[1]
            - de * ex * ez * q[2]
            - 0.5 * ez * ez * (eps - de * q[0] - de * q[3])
            - 0.5 * ey * ey * (eps + de * q[3])
            - de * ey * ez * q[4])
}

/// d f_field / dq (does not depend on q).
#[inline]
pub fn field_gradient(f: &FieldCoupling) -> QTensor {
    let [ex, ey, ez] = f.field;
    let de = f.anisotropy;
    let s = f.scale;
    [
        s * 0.5 * de * (ez * ez - ex * ex),
        -s * de * ex * ey,
        -s * de * ex * ez,
        s * 0.5 * de * (ez * ez - ey * ey),
        -s * de * ey * ez,
    ]
}
