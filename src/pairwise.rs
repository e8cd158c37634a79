// src/pairwise.rs
//
// Harmonic repulsion between soft spheres:
//
//   f_ij = k_ij (1/sigma) (1 - d/sigma) (r_ij / d)   for d <= sigma
//   f_ij = 0                                         otherwise
//
// with r_ij = r_i - r_j, d = |r_ij|, sigma = R_i + R_j and k_ij looked up by
// the two particle types. Forces are gathered per particle from a neighbour
// list, so each particle's entry is written by exactly one unit of work.

use serde::{Deserialize, Serialize};

use crate::dispatch::{for_each_site, ExecutionMode};
use crate::error::{ConfigError, Result};
use crate::free_energy::WriteMode;
use crate::tuner::LaunchTuner;
use crate::vec3::{norm, scale, sub};

/// Stiffness and contact distance of one particle pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairParameters {
    pub stiffness: f64,
    /// Sum of the two radii; the force vanishes beyond it.
    pub cutoff: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    pub positions: Vec<[f64; 3]>,
    pub types: Vec<usize>,
    pub radii: Vec<f64>,
}

impl ParticleSystem {
    pub fn new(positions: Vec<[f64; 3]>, types: Vec<usize>, radii: Vec<f64>) -> Self {
        Self {
            positions,
            types,
            radii,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn max_radius(&self) -> f64 {
        self.radii.iter().copied().fold(0.0, f64::max)
    }

    /// Per-particle arrays must line up and every type must index the
    /// `n_types`×`n_types` stiffness matrix.
    pub fn validate(&self, n_types: usize) -> Result<()> {
        let n = self.len();
        for (field, found) in [("types", self.types.len()), ("radii", self.radii.len())] {
            if found != n {
                return Err(ConfigError::ParticleDataMismatch {
                    field,
                    expected: n,
                    found,
                });
            }
        }
        if let Some((particle, &ty)) = self.types.iter().enumerate().find(|&(_, &t)| t >= n_types) {
            return Err(ConfigError::TypeOutOfRange {
                particle,
                ty,
                n_types,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborEntry {
    pub index: usize,
    /// r_i - r_j
    pub separation: [f64; 3],
}

/// Per-particle neighbour entries (each pair appears once from each side).
#[derive(Debug, Clone, Default)]
pub struct NeighborList {
    entries: Vec<Vec<NeighborEntry>>,
}

impl NeighborList {
    /// O(N^2) build with open boundaries; pairs closer than `cutoff` are kept.
    pub fn brute_force(positions: &[[f64; 3]], cutoff: f64) -> Self {
        let n = positions.len();
        let mut entries = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                let r = sub(positions[i], positions[j]);
                if norm(r) < cutoff {
                    entries[i].push(NeighborEntry { index: j, separation: r });
                    entries[j].push(NeighborEntry {
                        index: i,
                        separation: scale(r, -1.0),
                    });
                }
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn neighbors(&self, particle: usize) -> &[NeighborEntry] {
        &self.entries[particle]
    }
}

#[derive(Debug, Clone)]
pub struct HarmonicRepulsion {
    n_types: usize,
    stiffness: Vec<f64>,
    use_neighbor_list: bool,
    tuner: LaunchTuner,
}

impl Default for HarmonicRepulsion {
    fn default() -> Self {
        Self::new()
    }
}

impl HarmonicRepulsion {
    /// One particle type with unit stiffness.
    pub fn new() -> Self {
        Self {
            n_types: 1,
            stiffness: vec![1.0],
            use_neighbor_list: true,
            tuner: LaunchTuner::default(),
        }
    }

    pub fn with_neighbor_list(mut self, use_neighbor_list: bool) -> Self {
        self.use_neighbor_list = use_neighbor_list;
        self
    }

    /// Load the n×n type-pair stiffness matrix, row-major. The stored matrix
    /// is the symmetric part: k_ij = (p[i n + j] + p[j n + i]) / 2.
    pub fn set_force_parameters(&mut self, params: &[f64]) -> Result<()> {
        let n = (params.len() as f64).sqrt().round() as usize;
        if n == 0 || n * n != params.len() {
            return Err(ConfigError::NotPerfectSquare(params.len()));
        }
        let mut k = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                k[i * n + j] = 0.5 * (params[i * n + j] + params[j * n + i]);
            }
        }
        self.n_types = n;
        self.stiffness = k;
        log::debug!("harmonic repulsion: {n} particle types");
        Ok(())
    }

    pub fn n_types(&self) -> usize {
        self.n_types
    }

    #[inline]
    pub fn stiffness(&self, type_i: usize, type_j: usize) -> f64 {
        self.stiffness[type_i * self.n_types + type_j]
    }

    /// Stiffness for the two particles' types and the sum of their radii.
    /// Types are assumed to be in range; see [`ParticleSystem::validate`].
    #[inline]
    pub fn parameters_for_pair(&self, system: &ParticleSystem, i: usize, j: usize) -> PairParameters {
        PairParameters {
            stiffness: self.stiffness(system.types[i], system.types[j]),
            cutoff: system.radii[i] + system.radii[j],
        }
    }

    /// Force on particle i from particle j given r = r_i - r_j. Coincident
    /// particles are not supported.
    #[inline]
    pub fn compute_pairwise_force(separation: [f64; 3], p: &PairParameters) -> [f64; 3] {
        let d = norm(separation);
        debug_assert!(d > 0.0, "coincident particles");
        if d <= p.cutoff {
            let s = p.stiffness * (1.0 / p.cutoff) * (1.0 - d / p.cutoff) * (1.0 / d);
            scale(separation, s)
        } else {
            [0.0; 3]
        }
    }

    /// Sum pair forces into `forces`, one entry per particle.
    pub fn compute_forces(
        &mut self,
        system: &ParticleSystem,
        neighbors: Option<&NeighborList>,
        forces: &mut [[f64; 3]],
        mode: WriteMode,
        execution: ExecutionMode,
    ) -> Result<()> {
        let neighbors = match neighbors {
            Some(list) if self.use_neighbor_list => list,
            _ => return Err(ConfigError::MissingNeighborList),
        };
        system.validate(self.n_types)?;
        let n = system.len();
        if forces.len() != n {
            return Err(ConfigError::ForceLengthMismatch {
                expected: n,
                found: forces.len(),
            });
        }
        if neighbors.len() != n {
            return Err(ConfigError::NeighborListMismatch {
                expected: n,
                found: neighbors.len(),
            });
        }

        let this = &*self;
        let mut tuner = this.tuner.clone();
        for_each_site(execution, &mut tuner, forces, |i, f| {
            let mut total = [0.0; 3];
            for entry in neighbors.neighbors(i) {
                let p = this.parameters_for_pair(system, i, entry.index);
                let fij = Self::compute_pairwise_force(entry.separation, &p);
                for a in 0..3 {
                    total[a] += fij[a];
                }
            }
            match mode {
                WriteMode::Overwrite => *f = total,
                WriteMode::Accumulate => {
                    for a in 0..3 {
                        f[a] += total[a];
                    }
                }
            }
        });
        self.tuner = tuner;
        Ok(())
    }
}
