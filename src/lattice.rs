// src/lattice.rs
//
// Lattice collaborator contract and a concrete cubic lattice.
//
// Type code convention (per site, i32):
//   code == 0 : bulk liquid-crystal site
//   code <  0 : liquid-crystal site adjacent to at least one boundary site
//   code >  0 : boundary surface site belonging to object (code - 1)
//
// The free energy reads a lattice only through the `Lattice` trait. The axis
// neighbour relation must be reciprocal: if up_a(i) = j != i then down_a(j) = i.
// Periodic and clamped cubic lattices both satisfy this.

use serde::{Deserialize, Serialize};

use crate::qtensor::{QTensor, ZERO};

/// Functional form of an anchoring condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchoringLaw {
    /// W0 tr[(Q - Q_b)^2]; the boundary site stores the preferred tensor Q_b.
    Homeotropic,
    /// Fournier–Galatola degenerate planar; the boundary site stores the surface
    /// normal in its first three components.
    DegeneratePlanar,
}

/// One registered anchoring law instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryObject {
    pub law: AnchoringLaw,
    /// W0 (homeotropic) or W1 (degenerate planar).
    pub strength: f64,
    /// W2 (degenerate planar only).
    pub second_strength: f64,
    /// Preferred scalar order parameter.
    pub s0: f64,
}

impl BoundaryObject {
    pub fn homeotropic(w0: f64, s0: f64) -> Self {
        Self {
            law: AnchoringLaw::Homeotropic,
            strength: w0,
            second_strength: 0.0,
            s0,
        }
    }

    pub fn degenerate_planar(w1: f64, w2: f64, s0: f64) -> Self {
        Self {
            law: AnchoringLaw::DegeneratePlanar,
            strength: w1,
            second_strength: w2,
            s0,
        }
    }
}

/// Decoded site type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteKind {
    #[default]
    Bulk,
    AnchoredBoundaryNeighbor,
    /// Index into the boundary registry.
    BoundarySurface(usize),
}

impl SiteKind {
    #[inline]
    pub fn from_code(code: i32) -> Self {
        if code > 0 {
            SiteKind::BoundarySurface((code - 1) as usize)
        } else if code == 0 {
            SiteKind::Bulk
        } else {
            SiteKind::AnchoredBoundaryNeighbor
        }
    }

    /// Liquid-crystal sites carry energy and receive forces.
    #[inline]
    pub fn is_lc(self) -> bool {
        !matches!(self, SiteKind::BoundarySurface(_))
    }
}

/// Axis neighbours in (-x, +x, -y, +y, -z, +z) order.
pub const X_DOWN: usize = 0;
pub const X_UP: usize = 1;
pub const Y_DOWN: usize = 2;
pub const Y_UP: usize = 3;
pub const Z_DOWN: usize = 4;
pub const Z_UP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteNeighbors {
    pub axis: [usize; 6],
    /// Number of neighbours held for the site in the filled list (6, or more
    /// when mixed-partial neighbours were requested).
    pub count: usize,
}

/// What the free energy needs from a lattice.
pub trait Lattice: Sync {
    fn n_sites(&self) -> usize;
    fn q_tensors(&self) -> &[QTensor];
    fn type_codes(&self) -> &[i32];
    fn neighbors(&self, site: usize) -> SiteNeighbors;
    fn boundaries(&self) -> &[BoundaryObject];
    /// depth 0: axis neighbours only; depth 1: also the in-plane diagonals
    /// needed for mixed partials.
    fn fill_neighbor_lists(&mut self, depth: usize);
}

/// Behaviour at the faces of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edges {
    /// Wrap around.
    Periodic,
    /// The missing neighbour is the site itself.
    Clamped,
}

/// Simple cubic lattice of lx × ly × lz sites, x fastest.
#[derive(Debug, Clone)]
pub struct CubicLattice {
    pub lx: usize,
    pub ly: usize,
    pub lz: usize,
    pub edges: Edges,
    pub q: Vec<QTensor>,
    pub types: Vec<i32>,
    pub boundaries: Vec<BoundaryObject>,
    neighbor_depth: usize,
    neighbor_stride: usize,
    neighbor_table: Vec<usize>,
}

impl CubicLattice {
    /// Create an all-bulk lattice with Q = 0 and axis neighbour lists filled.
    pub fn new(lx: usize, ly: usize, lz: usize, edges: Edges) -> Self {
        let n = lx * ly * lz;
        let mut lattice = Self {
            lx,
            ly,
            lz,
            edges,
            q: vec![ZERO; n],
            types: vec![0; n],
            boundaries: Vec::new(),
            neighbor_depth: 0,
            neighbor_stride: 6,
            neighbor_table: Vec::new(),
        };
        lattice.fill_neighbor_lists(0);
        lattice
    }

    /// Flat index for (i, j, k).
    #[inline]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.lx && j < self.ly && k < self.lz);
        (k * self.ly + j) * self.lx + i
    }

    /// Inverse of `idx`.
    #[inline]
    pub fn coords(&self, site: usize) -> (usize, usize, usize) {
        let i = site % self.lx;
        let j = (site / self.lx) % self.ly;
        let k = site / (self.lx * self.ly);
        (i, j, k)
    }

    pub fn neighbor_depth(&self) -> usize {
        self.neighbor_depth
    }

    /// Full filled neighbour list of a site (axis neighbours first).
    pub fn neighbor_list(&self, site: usize) -> &[usize] {
        let s = self.neighbor_stride;
        &self.neighbor_table[site * s..(site + 1) * s]
    }

    pub fn set_uniform(&mut self, q: QTensor) {
        for cell in &mut self.q {
            *cell = q;
        }
    }

    #[inline]
    fn shift(&self, c: usize, delta: isize, len: usize) -> usize {
        let target = c as isize + delta;
        match self.edges {
            Edges::Periodic => target.rem_euclid(len as isize) as usize,
            Edges::Clamped => target.clamp(0, len as isize - 1) as usize,
        }
    }

    fn offset(&self, site: usize, d: [isize; 3]) -> usize {
        let (i, j, k) = self.coords(site);
        self.idx(
            self.shift(i, d[0], self.lx),
            self.shift(j, d[1], self.ly),
            self.shift(k, d[2], self.lz),
        )
    }
}

const AXIS_OFFSETS: [[isize; 3]; 6] = [
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
    [0, 0, -1],
    [0, 0, 1],
];

const DIAGONAL_OFFSETS: [[isize; 3]; 12] = [
    [-1, -1, 0],
    [-1, 1, 0],
    [1, -1, 0],
    [1, 1, 0],
    [-1, 0, -1],
    [-1, 0, 1],
    [1, 0, -1],
    [1, 0, 1],
    [0, -1, -1],
    [0, -1, 1],
    [0, 1, -1],
    [0, 1, 1],
];

impl Lattice for CubicLattice {
    fn n_sites(&self) -> usize {
        self.lx * self.ly * self.lz
    }

    fn q_tensors(&self) -> &[QTensor] {
        &self.q
    }

    fn type_codes(&self) -> &[i32] {
        &self.types
    }

    #[inline]
    fn neighbors(&self, site: usize) -> SiteNeighbors {
        let list = self.neighbor_list(site);
        let mut axis = [0usize; 6];
        axis.copy_from_slice(&list[..6]);
        SiteNeighbors {
            axis,
            count: list.len(),
        }
    }

    fn boundaries(&self) -> &[BoundaryObject] {
        &self.boundaries
    }

    fn fill_neighbor_lists(&mut self, depth: usize) {
        let stride = if depth == 0 { 6 } else { 6 + DIAGONAL_OFFSETS.len() };
        let n = self.n_sites();
        let mut table = Vec::with_capacity(n * stride);
        for site in 0..n {
            for d in AXIS_OFFSETS {
                table.push(self.offset(site, d));
            }
            if depth > 0 {
                for d in DIAGONAL_OFFSETS {
                    table.push(self.offset(site, d));
                }
            }
        }
        self.neighbor_depth = depth;
        self.neighbor_stride = stride;
        self.neighbor_table = table;
    }
}
