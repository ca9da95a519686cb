//! Owned simulation state: the phase field `p`, the temperature `T`
//! and their next-step buffers.

use std::fmt;

use crate::error::GridError;
use crate::grid::GridSpec;

/// Width of the initial solid seed, in percent of the X cell count.
pub const SEED_PERCENT: usize = 5;

/// Which of the two model fields a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Phase-field order parameter (0 = liquid, 1 = solid).
    Phase,
    /// Temperature.
    Temperature,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phase => write!(f, "p"),
            Self::Temperature => write!(f, "T"),
        }
    }
}

/// Mutable views over all four buffers of a [`FieldState`] at once.
///
/// Lets a step read the current fields while writing the next ones
/// without fighting the borrow checker.
pub struct FieldBuffers<'a> {
    /// Current phase field.
    pub p: &'a mut [f64],
    /// Current temperature.
    pub t: &'a mut [f64],
    /// Phase field of the step in progress.
    pub p_next: &'a mut [f64],
    /// Temperature of the step in progress.
    pub t_next: &'a mut [f64],
}

/// The `p` and `T` arrays of a run plus their "next" buffers.
///
/// All four arrays have one entry per cell of the [`GridSpec`] and use its
/// row-major flattening. Values are not clamped: `p` is a free-running
/// PDE field and may leave `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldState {
    grid: GridSpec,
    p: Vec<f64>,
    t: Vec<f64>,
    p_next: Vec<f64>,
    t_next: Vec<f64>,
}

impl FieldState {
    /// All-liquid state at uniform temperature `t_liquid`.
    pub fn uniform(grid: GridSpec, t_liquid: f64) -> Self {
        let n = grid.cell_count();
        Self {
            grid,
            p: vec![0.0; n],
            t: vec![t_liquid; n],
            p_next: vec![0.0; n],
            t_next: vec![0.0; n],
        }
    }

    /// Initial condition for directional solidification.
    ///
    /// The leftmost [`SEED_PERCENT`] of the X cells (rounded down) are solid
    /// (`p = 1`), everything else is liquid (`p = 0`), and `T` is uniform at
    /// `t_liquid`.
    ///
    /// ```
    /// use dendrite_core::{FieldState, GridSpec};
    ///
    /// let grid = GridSpec::planar(40, 4, 1.0, 1.0).unwrap();
    /// let state = FieldState::seeded(grid, 0.0);
    /// assert_eq!(state.solid_width(), 2);
    /// assert_eq!(state.phase()[grid.index(1, 3, 0)], 1.0);
    /// assert_eq!(state.phase()[grid.index(2, 0, 0)], 0.0);
    /// ```
    pub fn seeded(grid: GridSpec, t_liquid: f64) -> Self {
        let mut state = Self::uniform(grid, t_liquid);
        let width = state.solid_width();
        let plane = grid.stride(crate::grid::Axis::X);
        state.p[..width * plane].fill(1.0);
        state
    }

    /// Rebuild a state from stored arrays (e.g. a restart dump).
    ///
    /// # Errors
    ///
    /// [`GridError::ShapeMismatch`] if either array length differs from the
    /// grid's cell count.
    pub fn from_arrays(grid: GridSpec, p: Vec<f64>, t: Vec<f64>) -> Result<Self, GridError> {
        let n = grid.cell_count();
        for len in [p.len(), t.len()] {
            if len != n {
                return Err(GridError::ShapeMismatch {
                    expected: n,
                    found: len,
                });
            }
        }
        Ok(Self {
            grid,
            p,
            t,
            p_next: vec![0.0; n],
            t_next: vec![0.0; n],
        })
    }

    /// Number of solid X layers deposited by [`seeded`](Self::seeded).
    pub fn solid_width(&self) -> usize {
        self.grid.nx() * SEED_PERCENT / 100
    }

    /// The grid these arrays live on.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Current phase field.
    pub fn phase(&self) -> &[f64] {
        &self.p
    }

    /// Current temperature field.
    pub fn temperature(&self) -> &[f64] {
        &self.t
    }

    /// Current array of the given field.
    pub fn field(&self, kind: FieldKind) -> &[f64] {
        match kind {
            FieldKind::Phase => &self.p,
            FieldKind::Temperature => &self.t,
        }
    }

    /// Mutable current phase field.
    pub fn phase_mut(&mut self) -> &mut [f64] {
        &mut self.p
    }

    /// Mutable current temperature field.
    pub fn temperature_mut(&mut self) -> &mut [f64] {
        &mut self.t
    }

    /// Split borrow of all four buffers.
    pub fn buffers_mut(&mut self) -> FieldBuffers<'_> {
        FieldBuffers {
            p: &mut self.p,
            t: &mut self.t,
            p_next: &mut self.p_next,
            t_next: &mut self.t_next,
        }
    }

    /// Phase field staged for the step in progress.
    pub fn phase_next(&self) -> &[f64] {
        &self.p_next
    }

    /// Temperature staged for the step in progress.
    pub fn temperature_next(&self) -> &[f64] {
        &self.t_next
    }

    /// Make the staged buffers current (`p <- p_next`, `T <- T_next`).
    ///
    /// The old arrays become the next step's scratch buffers.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.p, &mut self.p_next);
        std::mem::swap(&mut self.t, &mut self.t_next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Axis;

    #[test]
    fn seed_occupies_leftmost_five_percent() {
        let grid = GridSpec::planar(100, 100, 1.0, 1.0).unwrap();
        let state = FieldState::seeded(grid, 0.0);
        assert_eq!(state.solid_width(), 5);
        for idx in 0..grid.cell_count() {
            let [i, _, _] = grid.coords(idx);
            let expected = if i < 5 { 1.0 } else { 0.0 };
            assert_eq!(state.phase()[idx], expected, "cell {idx}");
        }
        assert!(state.temperature().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn seed_rounds_down() {
        let grid = GridSpec::planar(30, 2, 1.0, 1.0).unwrap();
        let state = FieldState::seeded(grid, 0.0);
        assert_eq!(state.solid_width(), 1);
        assert_eq!(state.phase().iter().filter(|&&p| p == 1.0).count(), 2);
    }

    #[test]
    fn narrow_grid_has_no_seed() {
        let grid = GridSpec::planar(10, 3, 1.0, 1.0).unwrap();
        let state = FieldState::seeded(grid, 0.25);
        assert!(state.phase().iter().all(|&p| p == 0.0));
        assert!(state.temperature().iter().all(|&t| t == 0.25));
    }

    #[test]
    fn seed_spans_full_3d_layers() {
        let grid = GridSpec::volume(40, 3, 4, 1.0, 1.0, 1.0).unwrap();
        let state = FieldState::seeded(grid, 0.0);
        let mut solid = 0;
        for layer in 0..2 {
            grid.for_each_in_layer(Axis::X, layer, |idx| {
                assert_eq!(state.phase()[idx], 1.0);
                solid += 1;
            });
        }
        assert_eq!(solid, 24);
        assert_eq!(state.phase().iter().sum::<f64>(), 24.0);
    }

    #[test]
    fn commit_swaps_buffers() {
        let grid = GridSpec::planar(2, 2, 1.0, 1.0).unwrap();
        let mut state = FieldState::uniform(grid, 0.0);
        {
            let bufs = state.buffers_mut();
            bufs.p_next.fill(0.5);
            bufs.t_next.fill(-1.0);
        }
        state.commit();
        assert!(state.phase().iter().all(|&p| p == 0.5));
        assert!(state.temperature().iter().all(|&t| t == -1.0));
        assert!(state.phase_next().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn from_arrays_checks_length() {
        let grid = GridSpec::planar(2, 2, 1.0, 1.0).unwrap();
        let err = FieldState::from_arrays(grid, vec![0.0; 4], vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            GridError::ShapeMismatch {
                expected: 4,
                found: 3
            }
        );
        let ok = FieldState::from_arrays(grid, vec![1.0; 4], vec![2.0; 4]).unwrap();
        assert_eq!(ok.field(FieldKind::Temperature), &[2.0; 4]);
    }
}
