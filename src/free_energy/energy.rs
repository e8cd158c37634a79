// src/free_energy/energy.rs
//
// Per-site energy split into the five channels, and the channel totals.

use serde::{Deserialize, Serialize};

use crate::lattice::{BoundaryObject, Lattice};
use crate::params::{ElasticConstants, FieldCoupling};
use crate::qtensor::QTensor;

use super::anchoring::site_anchoring_energy;
use super::elastic::{distortion_energy, ElasticTerm, TermInput};
use super::field::field_energy;
use super::phase::phase_energy;
use super::stencil::SiteStencil;

pub const PHASE: usize = 0;
pub const DISTORTION: usize = 1;
pub const ANCHORING: usize = 2;
pub const E_FIELD: usize = 3;
pub const H_FIELD: usize = 4;

/// Energy totals of the last evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyChannels {
    pub phase: f64,
    pub distortion: f64,
    pub anchoring: f64,
    pub e_field: f64,
    pub h_field: f64,
    pub total: f64,
}

impl EnergyChannels {
    pub fn from_channels(c: [f64; 5]) -> Self {
        Self {
            phase: c[PHASE],
            distortion: c[DISTORTION],
            anchoring: c[ANCHORING],
            e_field: c[E_FIELD],
            h_field: c[H_FIELD],
            total: c.iter().sum(),
        }
    }

    /// [phase, distortion, anchoring, e_field, h_field]
    pub fn channels(&self) -> [f64; 5] {
        [self.phase, self.distortion, self.anchoring, self.e_field, self.h_field]
    }
}

/// Everything one evaluation reads. Built per call, shared by all site kernels.
pub(crate) struct Evaluation<'a, L: ?Sized> {
    pub lattice: &'a L,
    pub q: &'a [QTensor],
    pub boundaries: &'a [BoundaryObject],
    pub constants: &'a ElasticConstants,
    pub terms: &'a [ElasticTerm],
    pub e_field: Option<&'a FieldCoupling>,
    pub h_field: Option<&'a FieldCoupling>,
}

impl<'a, L: Lattice + ?Sized> Evaluation<'a, L> {
    /// Channel energies of one site. Non-LC sites contribute nothing.
    pub fn site_energy(&self, site: usize) -> [f64; 5] {
        let mut out = [0.0; 5];
        let stencil = SiteStencil::new(self.lattice, site);
        if !stencil.kind.is_lc() {
            return out;
        }
        let q = &self.q[site];

        out[PHASE] = phase_energy(self.constants, q);
        if let Some(f) = self.e_field {
            out[E_FIELD] = field_energy(f, q);
        }
        if let Some(f) = self.h_field {
            out[H_FIELD] = field_energy(f, q);
        }
        if !self.terms.is_empty() {
            let input = TermInput::new(*q, stencil.first_derivatives(self.q));
            out[DISTORTION] = distortion_energy(self.terms, self.constants, &input);
        }
        if !self.boundaries.is_empty() {
            out[ANCHORING] = site_anchoring_energy(&stencil, self.q, self.boundaries);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::free_energy::elastic::active_terms;
    use crate::lattice::{CubicLattice, Edges};
    use crate::qtensor::ZERO;
    use approx::assert_abs_diff_eq;

    #[test]
    fn total_is_sum_of_channels() {
        let e = EnergyChannels::from_channels([1.0, 2.0, 3.0, 4.0, 5.5]);
        assert_eq!(e.total, 15.5);
        assert_eq!(e.channels(), [1.0, 2.0, 3.0, 4.0, 5.5]);
    }

    #[test]
    fn boundary_surface_sites_carry_no_energy() {
        let mut l = CubicLattice::new(3, 1, 1, Edges::Periodic);
        l.boundaries.push(BoundaryObject::homeotropic(1.0, 0.5));
        l.types = vec![1, -1, 0];
        l.q = vec![[0.3, 0.0, 0.0, 0.0, 0.0], [0.1, 0.0, 0.0, 0.2, 0.0], ZERO];
        let k = ElasticConstants::one_constant(1.0, 0.0, 0.0, 1.0);
        let terms = active_terms(&k);
        let eval = Evaluation {
            lattice: &l,
            q: &l.q,
            boundaries: &l.boundaries,
            constants: &k,
            terms: &terms,
            e_field: None,
            h_field: None,
        };
        assert_eq!(eval.site_energy(0), [0.0; 5]);
        let anchored = eval.site_energy(1);
        assert!(anchored[ANCHORING] > 0.0);
        // forward difference away from site 0: D_x = Q[2] - Q[1]
        assert_abs_diff_eq!(anchored[DISTORTION], 0.01 + 0.04 + 0.1 * 0.2, epsilon = 1e-14);
        assert_eq!(eval.site_energy(2)[ANCHORING], 0.0);
    }

    #[test]
    fn bulk_code_skips_anchoring_beside_a_boundary() {
        let mut l = CubicLattice::new(3, 1, 1, Edges::Periodic);
        l.boundaries.push(BoundaryObject::homeotropic(1.0, 0.5));
        l.types = vec![1, 0, -1];
        l.q = vec![[0.3, 0.0, 0.0, 0.0, 0.0], [0.1, 0.0, 0.0, 0.2, 0.0], [0.1, 0.0, 0.0, 0.2, 0.0]];
        let k = ElasticConstants::one_constant(1.0, 0.0, 0.0, 1.0);
        let terms = active_terms(&k);
        let eval = Evaluation {
            lattice: &l,
            q: &l.q,
            boundaries: &l.boundaries,
            constants: &k,
            terms: &terms,
            e_field: None,
            h_field: None,
        };
        // both LC sites touch the surface at site 0; only the anchored one pays
        assert_eq!(eval.site_energy(1)[ANCHORING], 0.0);
        assert_eq!(eval.boundary_force(1), ZERO);
        assert!(eval.site_energy(2)[ANCHORING] > 0.0);
        assert_ne!(eval.boundary_force(2), ZERO);
    }
}
