// src/free_energy/forces.rs
//
// Force kernels. The force on site j is minus the gradient of the discrete
// total energy E = sum_i e_i with respect to q_j:
//
//   F_j = -de_j/dq_j - sum_{i reads j} sum_a w_a(i -> j) de_i/dD_a(i)
//
// where w_a(i -> j) is the weight with which the axis-a stencil of site i
// reads site j. Sites that read j are j itself and its axis neighbours.
//
// Each kernel writes only its own site's entry, so the passes parallelise
// without synchronisation.

use serde::{Deserialize, Serialize};

use crate::lattice::Lattice;
use crate::params::ElasticConstants;
use crate::qtensor::{add, add_scaled, scale, QTensor, ZERO};

use super::anchoring::site_anchoring_gradient;
use super::elastic::{ElasticTerm, TermGradient, TermInput};
use super::energy::Evaluation;
use super::field::field_gradient;
use super::phase::phase_gradient;
use super::stencil::SiteStencil;

/// How a force pass combines with what is already in the force array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    Overwrite,
    Accumulate,
}

impl WriteMode {
    #[inline]
    pub fn apply(self, slot: &mut QTensor, value: QTensor) {
        match self {
            WriteMode::Overwrite => *slot = value,
            WriteMode::Accumulate => *slot = add(*slot, value),
        }
    }
}

/// Which contributions a force call includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForcePass {
    /// Phase and elastic terms.
    Interior,
    /// Interior plus anchoring and field forces.
    Full,
}

/// Derivative snapshot of one site, shared by all multi-constant terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteDerivatives {
    pub stencil: SiteStencil,
    pub d: [QTensor; 3],
}

impl<'a, L: Lattice + ?Sized> Evaluation<'a, L> {
    pub fn snapshot(&self, site: usize) -> SiteDerivatives {
        let stencil = SiteStencil::new(self.lattice, site);
        let d = stencil.first_derivatives(self.q);
        SiteDerivatives { stencil, d }
    }

    /// Phase plus every elastic term in one sweep, recomputing the stencils of
    /// the reading sites on the fly. Used in one-constant mode.
    pub fn fused_force(&self, site: usize) -> QTensor {
        let own = SiteStencil::new(self.lattice, site);
        if !own.kind.is_lc() {
            return ZERO;
        }
        let mut grad = phase_gradient(self.constants, &self.q[site]);
        if !self.terms.is_empty() {
            let (readers, count) = own.readers();
            for &reader in &readers[..count] {
                let stencil = if reader == site {
                    own
                } else {
                    SiteStencil::new(self.lattice, reader)
                };
                if !stencil.kind.is_lc() {
                    continue;
                }
                let input = TermInput::new(self.q[reader], stencil.first_derivatives(self.q));
                let mut g = TermGradient::default();
                for term in self.terms {
                    term.accumulate_gradient(self.constants, &input, &mut g);
                }
                if reader == site {
                    grad = add(grad, g.q);
                }
                stencil.add_transposed(site, &g.d, &mut grad);
            }
        }
        scale(grad, -1.0)
    }

    /// -de/dq of the phase energy.
    pub fn phase_force(&self, site: usize) -> QTensor {
        if !SiteStencil::new(self.lattice, site).kind.is_lc() {
            return ZERO;
        }
        scale(phase_gradient(self.constants, &self.q[site]), -1.0)
    }

    /// Anchoring force on an anchored LC site.
    pub fn boundary_force(&self, site: usize) -> QTensor {
        if self.boundaries.is_empty() {
            return ZERO;
        }
        let stencil = SiteStencil::new(self.lattice, site);
        if !stencil.kind.is_lc() {
            return ZERO;
        }
        scale(site_anchoring_gradient(&stencil, self.q, self.boundaries), -1.0)
    }

    /// E and H field forces. Constant over LC sites.
    pub fn field_force(&self, site: usize) -> QTensor {
        if !SiteStencil::new(self.lattice, site).kind.is_lc() {
            return ZERO;
        }
        let mut g = ZERO;
        for f in [self.e_field, self.h_field].into_iter().flatten() {
            add_scaled(&mut g, -1.0, &field_gradient(f));
        }
        g
    }
}

/// dE/dq and dE/dD of a single term at a site (zero off the LC region).
pub fn term_assist(term: &ElasticTerm, k: &ElasticConstants, q: &QTensor, snap: &SiteDerivatives) -> TermGradient {
    let mut g = TermGradient::default();
    if snap.stencil.kind.is_lc() {
        let input = TermInput::new(*q, snap.d);
        term.accumulate_gradient(k, &input, &mut g);
    }
    g
}

/// Gathers one term's force on `site` from the assist array.
pub fn gather_term_force(site: usize, snapshots: &[SiteDerivatives], assist: &[TermGradient]) -> QTensor {
    let own = &snapshots[site].stencil;
    if !own.kind.is_lc() {
        return ZERO;
    }
    let mut grad = assist[site].q;
    let (readers, count) = own.readers();
    for &reader in &readers[..count] {
        snapshots[reader]
            .stencil
            .add_transposed(site, &assist[reader].d, &mut grad);
    }
    scale(grad, -1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_mode_overwrites_or_adds() {
        let mut slot = [1.0, 2.0, 3.0, 4.0, 5.0];
        WriteMode::Accumulate.apply(&mut slot, [1.0; 5]);
        assert_eq!(slot, [2.0, 3.0, 4.0, 5.0, 6.0]);
        WriteMode::Overwrite.apply(&mut slot, [0.5; 5]);
        assert_eq!(slot, [0.5; 5]);
    }

    #[test]
    fn gather_skips_non_lc_sites() {
        let mut snaps = vec![SiteDerivatives::default(); 2];
        snaps[0].stencil.kind = crate::lattice::SiteKind::BoundarySurface(0);
        let assist = vec![
            TermGradient {
                q: [1.0; 5],
                d: [[1.0; 5]; 3],
            };
            2
        ];
        assert_eq!(gather_term_force(0, &snaps, &assist), ZERO);
    }
}
