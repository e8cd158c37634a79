// src/config.rs
//
// Run snapshot written next to simulation output as config.json.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::dispatch::ExecutionMode;
use crate::lattice::{BoundaryObject, CubicLattice, Edges};
use crate::params::{ElasticConstants, FieldCoupling};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub lattice: LatticeConfig,
    pub constants: ElasticConstants,
    pub boundaries: Vec<BoundaryObject>,
    pub fields: FieldConfig,
    pub execution: ExecutionMode,
    pub run: RunInfo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatticeConfig {
    pub lx: usize,
    pub ly: usize,
    pub lz: usize,
    pub edges: Edges,
}

impl LatticeConfig {
    pub fn from_lattice(l: &CubicLattice) -> Self {
        Self {
            lx: l.lx,
            ly: l.ly,
            lz: l.lz,
            edges: l.edges,
        }
    }
}

/// Disabled fields are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    pub e_field: Option<FieldCoupling>,
    pub h_field: Option<FieldCoupling>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,

    // Optional provenance
    pub git_commit: Option<String>,
    pub timestamp_utc: Option<String>,
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> std::io::Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn read_from_dir(out_dir: &Path) -> std::io::Result<Self> {
        let file = File::open(out_dir.join("config.json"))?;
        let cfg = serde_json::from_reader(file)?;
        Ok(cfg)
    }
}
