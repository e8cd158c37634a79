// src/params.rs

use serde::{Deserialize, Serialize};

/// Vacuum permittivity (F/m).
pub const EPSILON0: f64 = 8.854_187_812_8e-12;
/// Vacuum permeability (T·m/A).
pub const MU0: f64 = 1.256_637_062_12e-6;

/// Which elastic expansion is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistortionEnergyType {
    /// L1 only; forces use a single fused kernel.
    OneConstant,
    /// Every nonzero term of L1, L2, L3, L4, L6 and the q0 chiral completion.
    MultiConstant,
}

impl DistortionEnergyType {
    /// Depth of neighbour list the lattice is asked to fill on bind.
    pub fn neighbor_depth(self) -> usize {
        match self {
            DistortionEnergyType::OneConstant => 0,
            DistortionEnergyType::MultiConstant => 1,
        }
    }
}

/// Bulk (A, B, C) and elastic (L1..L6, q0) coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticConstants {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l4: f64,
    pub l6: f64,
    /// Cholesteric wavenumber; only used in multi-constant mode.
    pub q0: f64,
    pub distortion: DistortionEnergyType,
}

impl ElasticConstants {
    /// Build from A, B, C and up to five elastic coefficients in the order
    /// [L1, L2, L3, L4, L6]. Missing entries are zero; extra entries are ignored.
    pub fn new(a: f64, b: f64, c: f64, l: &[f64], distortion: DistortionEnergyType) -> Self {
        debug_assert!(l.len() <= 5, "at most five elastic coefficients (L1, L2, L3, L4, L6)");
        let at = |k: usize| l.get(k).copied().unwrap_or(0.0);
        Self {
            a,
            b,
            c,
            l1: at(0),
            l2: at(1),
            l3: at(2),
            l4: at(3),
            l6: at(4),
            q0: 0.0,
            distortion,
        }
    }

    pub fn one_constant(a: f64, b: f64, c: f64, l1: f64) -> Self {
        Self::new(a, b, c, &[l1], DistortionEnergyType::OneConstant)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn multi_constant(a: f64, b: f64, c: f64, l1: f64, l2: f64, l3: f64, l4: f64, l6: f64) -> Self {
        Self::new(a, b, c, &[l1, l2, l3, l4, l6], DistortionEnergyType::MultiConstant)
    }

    pub fn with_chirality(mut self, q0: f64) -> Self {
        self.q0 = q0;
        self
    }
}

/// Coupling of the order parameter to a uniform external field.
///
/// Energy density (E field shown; H identical with chi in place of epsilon):
///   f = scale * ( -1/2 Ex^2 (eps + deps q0) - deps Ex Ey q1 - deps Ex Ez q2
///                 -1/2 Ez^2 (eps - deps q0 - deps q3) - 1/2 Ey^2 (eps + deps q3)
///                 - deps Ey Ez q4 )
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldCoupling {
    pub field: [f64; 3],
    /// Dielectric (or diamagnetic) anisotropy.
    pub anisotropy: f64,
    /// Baseline permittivity (or susceptibility).
    pub baseline: f64,
    /// epsilon0 for electric fields, mu0 for magnetic ones.
    pub scale: f64,
}

impl FieldCoupling {
    pub fn electric(field: [f64; 3], delta_epsilon: f64, epsilon: f64) -> Self {
        Self {
            field,
            anisotropy: delta_epsilon,
            baseline: epsilon,
            scale: EPSILON0,
        }
    }

    pub fn magnetic(field: [f64; 3], delta_chi: f64, chi: f64) -> Self {
        Self {
            field,
            anisotropy: delta_chi,
            baseline: chi,
            scale: MU0,
        }
    }

    /// Replace the vacuum constant, e.g. with 1.0 for lattice units.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_coefficients_default_to_zero() {
        let k = ElasticConstants::new(-1.0, -2.0, 3.0, &[1.0, 0.5], DistortionEnergyType::MultiConstant);
        assert_eq!(k.l1, 1.0);
        assert_eq!(k.l2, 0.5);
        assert_eq!(k.l3, 0.0);
        assert_eq!(k.l6, 0.0);
        assert_eq!(k.q0, 0.0);
    }

    #[test]
    fn neighbor_depth_follows_distortion_type() {
        assert_eq!(DistortionEnergyType::OneConstant.neighbor_depth(), 0);
        assert_eq!(DistortionEnergyType::MultiConstant.neighbor_depth(), 1);
    }
}
