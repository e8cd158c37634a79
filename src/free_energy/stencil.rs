// src/free_energy/stencil.rs
//
// First derivatives of Q on the cubic stencil.
//
// Each axis derivative is a three-point combination
//   D_a = w_down Q[down] + w_self Q[site] + w_up Q[up]
// centred by default (-1/2, 0, +1/2). At a liquid-crystal site adjacent to a
// boundary (type code < 0) the difference is taken away from the boundary:
//   lower neighbour is a boundary surface -> D_a = Q[up] - Q[site]
//   upper neighbour is a boundary surface -> D_a = Q[site] - Q[down]
// The two checks run in that order, so the upper rule wins when both hold.
//
// Keeping the weights explicit lets the force kernels apply the transpose of
// exactly the stencil the energy used.

use crate::lattice::{Lattice, SiteKind};
use crate::qtensor::{add_scaled, QTensor, ZERO};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisStencil {
    pub down: usize,
    pub up: usize,
    pub w_down: f64,
    pub w_self: f64,
    pub w_up: f64,
}

impl AxisStencil {
    #[inline]
    pub fn centered(down: usize, up: usize) -> Self {
        Self {
            down,
            up,
            w_down: -0.5,
            w_self: 0.0,
            w_up: 0.5,
        }
    }

    #[inline]
    fn forward(&mut self) {
        self.w_down = 0.0;
        self.w_self = -1.0;
        self.w_up = 1.0;
    }

    #[inline]
    fn backward(&mut self) {
        self.w_down = -1.0;
        self.w_self = 1.0;
        self.w_up = 0.0;
    }

    #[inline]
    pub fn derivative(&self, site: usize, q: &[QTensor]) -> QTensor {
        let mut d = ZERO;
        add_scaled(&mut d, self.w_down, &q[self.down]);
        add_scaled(&mut d, self.w_self, &q[site]);
        add_scaled(&mut d, self.w_up, &q[self.up]);
        d
    }
}

/// Stencil of one site: decoded kind, three axis stencils and, for anchored
/// sites, the boundary object behind each of the six faces.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SiteStencil {
    pub site: usize,
    pub kind: SiteKind,
    pub neighbors: [usize; 6],
    pub axes: [AxisStencil; 3],
    pub faces: [Option<usize>; 6],
}

impl SiteStencil {
    pub fn new<L: Lattice + ?Sized>(lattice: &L, site: usize) -> Self {
        let types = lattice.type_codes();
        let kind = SiteKind::from_code(types[site]);
        let nb = lattice.neighbors(site).axis;

        let mut axes = [
            AxisStencil::centered(nb[0], nb[1]),
            AxisStencil::centered(nb[2], nb[3]),
            AxisStencil::centered(nb[4], nb[5]),
        ];
        let mut faces = [None; 6];

        if kind == SiteKind::AnchoredBoundaryNeighbor {
            for (dir, &n) in nb.iter().enumerate() {
                if let SiteKind::BoundarySurface(object) = SiteKind::from_code(types[n]) {
                    faces[dir] = Some(object);
                }
            }
            for (a, axis) in axes.iter_mut().enumerate() {
                if faces[2 * a].is_some() {
                    axis.forward();
                }
                if faces[2 * a + 1].is_some() {
                    axis.backward();
                }
            }
        }

        Self {
            site,
            kind,
            neighbors: nb,
            axes,
            faces,
        }
    }

    /// d/dx, d/dy, d/dz at this site.
    #[inline]
    pub fn first_derivatives(&self, q: &[QTensor]) -> [QTensor; 3] {
        [
            self.axes[0].derivative(self.site, q),
            self.axes[1].derivative(self.site, q),
            self.axes[2].derivative(self.site, q),
        ]
    }

    /// out += sum over slots that read `target` of weight * grad_d[axis].
    ///
    /// This is row `target` of the transposed stencil applied to dE/dD.
    #[inline]
    pub fn add_transposed(&self, target: usize, grad_d: &[QTensor; 3], out: &mut QTensor) {
        for (axis, g) in self.axes.iter().zip(grad_d.iter()) {
            let mut w = 0.0;
            if axis.down == target {
                w += axis.w_down;
            }
            if self.site == target {
                w += axis.w_self;
            }
            if axis.up == target {
                w += axis.w_up;
            }
            if w != 0.0 {
                add_scaled(out, w, g);
            }
        }
    }

    /// Distinct sites whose stencils may read this site: itself and its axis
    /// neighbours. Returns the buffer and the number of valid entries.
    #[inline]
    pub fn readers(&self) -> ([usize; 7], usize) {
        let mut out = [self.site; 7];
        let mut count = 1;
        for &n in &self.neighbors {
            if !out[..count].contains(&n) {
                out[count] = n;
                count += 1;
            }
        }
        (out, count)
    }
}
