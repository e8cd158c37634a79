// src/free_energy/mod.rs
//
// Landau–de Gennes free energy of a Q-tensor lattice.
//
// Channels:
//   phase       (A/2) tr Q^2 + (B/3) tr Q^3 + (C/4) (tr Q^2)^2
//   distortion  enabled elastic terms on the stencil derivatives
//   anchoring   boundary laws at LC sites next to boundary surfaces
//   e_field     dielectric coupling (scale eps0)
//   h_field     diamagnetic coupling (scale mu0)
//
// Only LC sites (type code <= 0) carry energy and receive forces. Anchoring
// and one-sided derivatives apply to type code < 0 only.

pub mod anchoring;
pub mod elastic;
pub mod energy;
pub mod field;
pub mod forces;
pub mod phase;
pub mod stencil;

pub use elastic::{ElasticConstant, ElasticTerm};
pub use energy::EnergyChannels;
pub use forces::{ForcePass, WriteMode};

use crate::dispatch::{for_each_site, ExecutionMode};
use crate::error::{ConfigError, Result};
use crate::lattice::{Lattice, SiteKind};
use crate::params::{DistortionEnergyType, ElasticConstants, FieldCoupling};
use crate::qtensor::QTensor;
use crate::tuner::LaunchTuner;

use elastic::{active_terms, TermGradient};
use energy::Evaluation;
use forces::{gather_term_force, term_assist, SiteDerivatives};

/// One tuner per kernel family.
#[derive(Debug, Clone, Default)]
pub struct KernelTuners {
    pub energy: LaunchTuner,
    pub force: LaunchTuner,
    pub snapshot: LaunchTuner,
    pub assist: LaunchTuner,
    pub boundary: LaunchTuner,
    pub field: LaunchTuner,
}

#[derive(Debug, Clone)]
pub struct LandauDeGennes {
    constants: ElasticConstants,
    terms: Vec<ElasticTerm>,
    e_field: Option<FieldCoupling>,
    h_field: Option<FieldCoupling>,
    execution: ExecutionMode,
    bound_sites: Option<usize>,

    energy_density: Vec<f64>,
    site_channels: Vec<[f64; 5]>,
    derivatives: Vec<SiteDerivatives>,
    assist: Vec<TermGradient>,
    channels: EnergyChannels,

    tuners: KernelTuners,
}

impl LandauDeGennes {
    /// Execution mode comes from `LDG_EXECUTION` (default parallel).
    pub fn new(constants: ElasticConstants) -> Self {
        Self {
            terms: active_terms(&constants),
            constants,
            e_field: None,
            h_field: None,
            execution: ExecutionMode::from_env(),
            bound_sites: None,
            energy_density: Vec::new(),
            site_channels: Vec::new(),
            derivatives: Vec::new(),
            assist: Vec::new(),
            channels: EnergyChannels::default(),
            tuners: KernelTuners::default(),
        }
    }

    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution = mode;
        self
    }

    pub fn set_execution_mode(&mut self, mode: ExecutionMode) {
        self.execution = mode;
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.execution
    }

    pub fn constants(&self) -> &ElasticConstants {
        &self.constants
    }

    /// Replace the constants between calls. If the neighbour depth changes the
    /// lattice must be bound again.
    pub fn set_elastic_constants(&mut self, constants: ElasticConstants) {
        if constants.distortion.neighbor_depth() != self.constants.distortion.neighbor_depth()
            && self.bound_sites.is_some()
        {
            log::warn!(
                "distortion type changed to {:?}; rebind the lattice to refill neighbour lists",
                constants.distortion
            );
            self.bound_sites = None;
        }
        self.terms = active_terms(&constants);
        self.constants = constants;
    }

    pub fn set_e_field(&mut self, coupling: FieldCoupling, enabled: bool) {
        self.e_field = enabled.then_some(coupling);
    }

    pub fn set_h_field(&mut self, coupling: FieldCoupling, enabled: bool) {
        self.h_field = enabled.then_some(coupling);
    }

    pub fn active_terms(&self) -> &[ElasticTerm] {
        &self.terms
    }

    /// Per-site energy density of the last `compute_energy`.
    pub fn energy_density(&self) -> &[f64] {
        &self.energy_density
    }

    pub fn energy_channels(&self) -> EnergyChannels {
        self.channels
    }

    pub fn tuners(&self) -> &KernelTuners {
        &self.tuners
    }

    /// Fill the lattice's neighbour lists to the depth the distortion type
    /// needs, check its boundary codes and size the scratch storage.
    pub fn bind_lattice<L: Lattice + ?Sized>(&mut self, lattice: &mut L) -> Result<()> {
        let depth = self.constants.distortion.neighbor_depth();
        lattice.fill_neighbor_lists(depth);
        validate_type_codes(lattice)?;

        let n = lattice.n_sites();
        self.energy_density = vec![0.0; n];
        self.site_channels = vec![[0.0; 5]; n];
        self.derivatives = match self.constants.distortion {
            DistortionEnergyType::MultiConstant => vec![SiteDerivatives::default(); n],
            DistortionEnergyType::OneConstant => Vec::new(),
        };
        self.assist = match self.constants.distortion {
            DistortionEnergyType::MultiConstant => vec![TermGradient::default(); n],
            DistortionEnergyType::OneConstant => Vec::new(),
        };
        self.bound_sites = Some(n);

        log::debug!(
            "bound lattice: {} sites, neighbour depth {}, {} boundary objects, terms {:?}",
            n,
            depth,
            lattice.boundaries().len(),
            self.terms.iter().map(|t| t.constant).collect::<Vec<_>>()
        );
        Ok(())
    }

    fn check_bound<L: Lattice + ?Sized>(&self, lattice: &L) -> Result<usize> {
        let expected = self.bound_sites.ok_or(ConfigError::LatticeNotBound)?;
        let found = lattice.n_sites();
        if found != expected || lattice.q_tensors().len() != expected || lattice.type_codes().len() != expected {
            return Err(ConfigError::SiteCountMismatch { expected, found });
        }
        validate_type_codes(lattice)?;
        Ok(expected)
    }

    /// Evaluate all channels and the per-site density.
    pub fn compute_energy<L: Lattice + ?Sized>(&mut self, lattice: &L, verbose: bool) -> Result<EnergyChannels> {
        self.check_bound(lattice)?;

        let execution = self.execution;
        let Self {
            constants,
            terms,
            e_field,
            h_field,
            energy_density,
            site_channels,
            channels,
            tuners,
            ..
        } = self;
        let eval = Evaluation {
            lattice,
            q: lattice.q_tensors(),
            boundaries: lattice.boundaries(),
            constants: &*constants,
            terms: &terms[..],
            e_field: e_field.as_ref(),
            h_field: h_field.as_ref(),
        };
        for_each_site(execution, &mut tuners.energy, site_channels, |site, out| {
            *out = eval.site_energy(site);
        });

        // Serial reduction so both execution modes give the same totals.
        let mut sums = [0.0; 5];
        for (density, site) in energy_density.iter_mut().zip(site_channels.iter()) {
            *density = site.iter().sum();
            for (acc, c) in sums.iter_mut().zip(site) {
                *acc += c;
            }
        }
        *channels = EnergyChannels::from_channels(sums);

        let c = &self.channels;
        if verbose {
            log::info!(
                "energy: phase {:.6e} distortion {:.6e} anchoring {:.6e} E {:.6e} H {:.6e} total {:.6e}",
                c.phase,
                c.distortion,
                c.anchoring,
                c.e_field,
                c.h_field,
                c.total
            );
        } else {
            log::debug!("energy total {:.6e}", c.total);
        }
        Ok(self.channels)
    }

    /// Write or add forces into `forces` (one entry per site).
    ///
    /// The first pass of the call (phase, fused with L1 in one-constant mode)
    /// honours `mode`; every later pass accumulates. Non-LC sites receive zero
    /// in `Overwrite` mode and are left as they were in `Accumulate` mode.
    pub fn compute_forces<L: Lattice + ?Sized>(
        &mut self,
        lattice: &L,
        forces: &mut [QTensor],
        mode: WriteMode,
        pass: ForcePass,
    ) -> Result<()> {
        let n = self.check_bound(lattice)?;
        if forces.len() != n {
            return Err(ConfigError::ForceLengthMismatch {
                expected: n,
                found: forces.len(),
            });
        }

        let execution = self.execution;
        let Self {
            constants,
            terms,
            e_field,
            h_field,
            derivatives,
            assist,
            tuners,
            ..
        } = self;
        let (constants, terms) = (&*constants, &terms[..]);
        let eval = Evaluation {
            lattice,
            q: lattice.q_tensors(),
            boundaries: lattice.boundaries(),
            constants,
            terms,
            e_field: e_field.as_ref(),
            h_field: h_field.as_ref(),
        };

        match constants.distortion {
            DistortionEnergyType::OneConstant => {
                for_each_site(execution, &mut tuners.force, forces, |site, f| {
                    mode.apply(f, eval.fused_force(site));
                });
            }
            DistortionEnergyType::MultiConstant => {
                for_each_site(execution, &mut tuners.force, forces, |site, f| {
                    mode.apply(f, eval.phase_force(site));
                });
                if !terms.is_empty() {
                    for_each_site(execution, &mut tuners.snapshot, derivatives, |site, d| {
                        *d = eval.snapshot(site);
                    });
                }
                let snapshots = &derivatives[..];
                for term in terms {
                    for_each_site(execution, &mut tuners.assist, assist, |site, g| {
                        *g = term_assist(term, constants, &eval.q[site], &snapshots[site]);
                    });
                    let gradients = &assist[..];
                    for_each_site(execution, &mut tuners.force, forces, |site, f| {
                        WriteMode::Accumulate.apply(f, gather_term_force(site, snapshots, gradients));
                    });
                }
            }
        }

        if pass == ForcePass::Full {
            if !eval.boundaries.is_empty() {
                for_each_site(execution, &mut tuners.boundary, forces, |site, f| {
                    WriteMode::Accumulate.apply(f, eval.boundary_force(site));
                });
            }
            if eval.e_field.is_some() || eval.h_field.is_some() {
                for_each_site(execution, &mut tuners.field, forces, |site, f| {
                    WriteMode::Accumulate.apply(f, eval.field_force(site));
                });
            }
        }
        Ok(())
    }
}

/// Every positive type code must name a registered boundary object.
fn validate_type_codes<L: Lattice + ?Sized>(lattice: &L) -> Result<()> {
    let registered = lattice.boundaries().len();
    for (site, &code) in lattice.type_codes().iter().enumerate() {
        if let SiteKind::BoundarySurface(object) = SiteKind::from_code(code) {
            if object >= registered {
                return Err(ConfigError::UnknownBoundaryObject {
                    site,
                    object,
                    registered,
                });
            }
        }
    }
    Ok(())
}
