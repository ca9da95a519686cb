//! Implicit diffusion operators for the phase and heat equations.
//!
//! Both operators are 5-point (2D) or 7-point (3D) stencils on the flat
//! row-major index. Each in-bounds axis neighbour contributes `-β` off the
//! diagonal and `+β` on it; out-of-bounds neighbours are dropped, which
//! is the natural Neumann closure. `β` uses the X spacing on every axis.
//!
//! The operators only depend on the grid and a few scalars, so
//! [`OperatorCache`] keeps one of each and rebuilds only when the key
//! changes.

use std::sync::Arc;

use dendrite_core::GridSpec;
use dendrite_linalg::CsrMatrix;
use log::debug;

/// `A_p`: diagonal `τ + nβ`, off-diagonals `-β`, with `β = dt·ε²/dx²`.
///
/// Symmetric and strictly diagonally dominant for `τ > 0`.
pub fn phase_operator(grid: &GridSpec, tau: f64, epsilon: f64, dt: f64) -> CsrMatrix {
    let dx = grid.dx();
    let beta = dt * epsilon * epsilon / (dx * dx);
    assemble(grid, tau, beta, false)
}

/// `A_T`: diagonal `1 + nβ`, off-diagonals `-β`, with `β = dt/dx²`.
///
/// Rows on the `i = 0` face are identity rows. Rows next to that face
/// still couple to it, so the matrix is not symmetric.
pub fn heat_operator(grid: &GridSpec, dt: f64) -> CsrMatrix {
    let dx = grid.dx();
    let beta = dt / (dx * dx);
    assemble(grid, 1.0, beta, true)
}

fn assemble(grid: &GridSpec, base: f64, beta: f64, dirichlet_low_x: bool) -> CsrMatrix {
    let n = grid.cell_count();
    let stencil = 1 + 2 * grid.active_axes().len();
    let mut row_ptr = Vec::with_capacity(n + 1);
    let mut col_idx = Vec::with_capacity(n * stencil);
    let mut values = Vec::with_capacity(n * stencil);
    row_ptr.push(0);

    for idx in 0..n {
        let [i, j, k] = grid.coords(idx);
        if dirichlet_low_x && i == 0 {
            col_idx.push(idx);
            values.push(1.0);
            row_ptr.push(col_idx.len());
            continue;
        }
        let nbrs = grid.neighbours(i, j, k);
        let diag = base + beta * nbrs.len() as f64;
        // Neighbours arrive sorted; slot the diagonal in between.
        let split = nbrs.partition_point(|&c| c < idx);
        for &c in &nbrs[..split] {
            col_idx.push(c);
            values.push(-beta);
        }
        col_idx.push(idx);
        values.push(diag);
        for &c in &nbrs[split..] {
            col_idx.push(c);
            values.push(-beta);
        }
        row_ptr.push(col_idx.len());
    }

    CsrMatrix::from_parts(n, row_ptr, col_idx, values)
}

#[derive(Clone, Debug, PartialEq)]
struct CacheKey {
    grid: GridSpec,
    coefficients: [u64; 3],
}

impl CacheKey {
    fn new(grid: &GridSpec, coefficients: [f64; 3]) -> Self {
        Self {
            grid: *grid,
            coefficients: coefficients.map(f64::to_bits),
        }
    }
}

/// Memoised phase and heat operators.
///
/// Keys compare coefficient bit patterns, so any change in `τ`, `ε` or
/// `dt` (or the grid) triggers a rebuild.
#[derive(Debug, Default)]
pub struct OperatorCache {
    phase: Option<(CacheKey, Arc<CsrMatrix>)>,
    heat: Option<(CacheKey, Arc<CsrMatrix>)>,
    hits: u64,
    misses: u64,
}

impl OperatorCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The phase operator for these coefficients, building it on a miss.
    pub fn phase(&mut self, grid: &GridSpec, tau: f64, epsilon: f64, dt: f64) -> Arc<CsrMatrix> {
        let key = CacheKey::new(grid, [tau, epsilon, dt]);
        let (slot, hits, misses) = (&mut self.phase, &mut self.hits, &mut self.misses);
        lookup(slot, key, hits, misses, || {
            debug!("building phase operator for {} cells", grid.cell_count());
            phase_operator(grid, tau, epsilon, dt)
        })
    }

    /// The heat operator for this time step, building it on a miss.
    pub fn heat(&mut self, grid: &GridSpec, dt: f64) -> Arc<CsrMatrix> {
        let key = CacheKey::new(grid, [dt, 0.0, 0.0]);
        let (slot, hits, misses) = (&mut self.heat, &mut self.hits, &mut self.misses);
        lookup(slot, key, hits, misses, || {
            debug!("building heat operator for {} cells", grid.cell_count());
            heat_operator(grid, dt)
        })
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to assemble a matrix.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop both cached operators. Counters are kept.
    pub fn clear(&mut self) {
        self.phase = None;
        self.heat = None;
    }
}

fn lookup(
    slot: &mut Option<(CacheKey, Arc<CsrMatrix>)>,
    key: CacheKey,
    hits: &mut u64,
    misses: &mut u64,
    build: impl FnOnce() -> CsrMatrix,
) -> Arc<CsrMatrix> {
    if let Some((cached, op)) = slot {
        if *cached == key {
            *hits += 1;
            return Arc::clone(op);
        }
    }
    *misses += 1;
    let op = Arc::new(build());
    *slot = Some((key, Arc::clone(&op)));
    op
}
