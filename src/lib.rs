// src/lib.rs

pub mod config;
pub mod dispatch;
pub mod error;
pub mod free_energy;
pub mod geometry_mask;
pub mod initial_states;
pub mod lattice;
pub mod pairwise;
pub mod params;
pub mod qtensor;
pub mod tuner;
pub mod vec3;
