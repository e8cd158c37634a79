// src/dispatch.rs
//
// Serial or data-parallel execution of a per-site kernel.
//
// Every kernel handed to `for_each_site` writes exactly one output element
// (its own site), so both paths produce the same values; only the order in
// which sites are visited differs.

use std::sync::OnceLock;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tuner::LaunchTuner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Sequential loop over site indices.
    Serial,
    /// rayon over sites, split according to a `LaunchTuner`.
    Parallel,
}

static EXECUTION_FROM_ENV: OnceLock<ExecutionMode> = OnceLock::new();

impl ExecutionMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "serial" | "cpu" | "scalar" => Some(Self::Serial),
            "parallel" | "par" | "rayon" => Some(Self::Parallel),
            _ => None,
        }
    }

    /// `LDG_EXECUTION` (serial / parallel), read once. Defaults to parallel.
    pub fn from_env() -> Self {
        *EXECUTION_FROM_ENV.get_or_init(|| match std::env::var("LDG_EXECUTION") {
            Ok(v) => Self::parse(&v).unwrap_or_else(|| {
                log::warn!("unknown LDG_EXECUTION '{v}', using parallel");
                Self::Parallel
            }),
            Err(_) => Self::Parallel,
        })
    }
}

/// Run `kernel(site, &mut out[site])` for every site.
pub fn for_each_site<T, F>(mode: ExecutionMode, tuner: &mut LaunchTuner, out: &mut [T], kernel: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    match mode {
        ExecutionMode::Serial => {
            for (site, value) in out.iter_mut().enumerate() {
                kernel(site, value);
            }
        }
        ExecutionMode::Parallel => {
            let min_len = tuner.parameter();
            tuner.begin();
            out.par_iter_mut()
                .enumerate()
                .with_min_len(min_len)
                .for_each(|(site, value)| kernel(site, value));
            tuner.end();
        }
    }
}
