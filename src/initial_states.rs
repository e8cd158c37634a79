// src/initial_states.rs
//
// Initial Q-tensor fields.
//
// All seeders write uniaxial tensors S (nn - I/3) and touch liquid-crystal
// sites only; boundary surface sites keep what `add_boundary` stored there.

use std::f64::consts::PI;

use crate::lattice::{CubicLattice, SiteKind};
use crate::qtensor::uniaxial;
use crate::vec3::normalize;

fn for_each_lc_site<F>(lattice: &mut CubicLattice, mut f: F)
where
    F: FnMut(usize, usize, usize, usize) -> [f64; 5],
{
    for site in 0..lattice.q.len() {
        if !SiteKind::from_code(lattice.types[site]).is_lc() {
            continue;
        }
        let (i, j, k) = lattice.coords(site);
        lattice.q[site] = f(site, i, j, k);
    }
}

/// Same director everywhere.
pub fn init_uniform(lattice: &mut CubicLattice, director: [f64; 3], s: f64) {
    let q = uniaxial(director, s);
    for_each_lc_site(lattice, |_, _, _, _| q);
}

/// Uniform director with a small random tilt per site.
pub fn init_uniform_with_noise(lattice: &mut CubicLattice, director: [f64; 3], s: f64, noise: f64, seed: u64) {
    let base = normalize(director);
    let mut rng = XorShift64::new(seed);
    for_each_lc_site(lattice, |_, _, _, _| {
        let dx = noise * (rng.next_f64() * 2.0 - 1.0);
        let dy = noise * (rng.next_f64() * 2.0 - 1.0);
        let dz = noise * (rng.next_f64() * 2.0 - 1.0);
        uniaxial([base[0] + dx, base[1] + dy, base[2] + dz], s)
    });
}

/// Helix about z: n = (cos 2πz/p, sin 2πz/p, 0), pitch in sites.
pub fn init_cholesteric(lattice: &mut CubicLattice, pitch: f64, s: f64) {
    let q0 = 2.0 * PI / pitch;
    for_each_lc_site(lattice, |_, _, _, k| {
        let phi = q0 * k as f64;
        uniaxial([phi.cos(), phi.sin(), 0.0], s)
    });
}

/// Random directors.
pub fn init_random(lattice: &mut CubicLattice, s: f64, seed: u64) {
    let mut rng = XorShift64::new(seed);
    for_each_lc_site(lattice, |_, _, _, _| {
        let x = rng.next_f64() * 2.0 - 1.0;
        let y = rng.next_f64() * 2.0 - 1.0;
        let z = rng.next_f64() * 2.0 - 1.0;
        uniaxial([x, y, z], s)
    });
}

struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        let s = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        // top 53 bits -> [0,1)
        let u = self.next_u64() >> 11;
        (u as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}
