//! Ghost-copy boundary conditions.
//!
//! Neumann (zero-flux) faces copy the adjacent interior layer onto the
//! boundary layer. The Dirichlet face `i = 0` of the temperature is pinned
//! to the cooling temperature. All rules operate on flat row-major arrays
//! and dispatch on the grid's active axes, so 2D and 3D share one path.
//!
//! Faces are processed axis by axis (X, Y, Z), low face before high face.
//! An axis with a single cell has no interior neighbour and is left
//! untouched.

use dendrite_core::{Axis, GridSpec};

/// Enforce the model's boundary conditions in place.
///
/// - `p` (when given): Neumann on every face.
/// - `t`: Dirichlet `T = t_cool` on the `i = 0` face, Neumann elsewhere.
///
/// Idempotent: a second application changes nothing.
pub fn apply_boundary_conditions(
    grid: &GridSpec,
    p: Option<&mut [f64]>,
    t: &mut [f64],
    t_cool: f64,
) {
    if let Some(p) = p {
        apply_neumann(grid, p);
    }
    apply_dirichlet_low_x(grid, t, t_cool);
    for &axis in grid.active_axes() {
        let n = grid.cells(axis);
        if n < 2 {
            continue;
        }
        if axis != Axis::X {
            copy_layer(grid, t, axis, 1, 0);
        }
        copy_layer(grid, t, axis, n - 2, n - 1);
    }
}

/// Zero-flux copy on every face of every active axis.
pub fn apply_neumann(grid: &GridSpec, field: &mut [f64]) {
    debug_assert_eq!(field.len(), grid.cell_count());
    for &axis in grid.active_axes() {
        let n = grid.cells(axis);
        if n < 2 {
            continue;
        }
        copy_layer(grid, field, axis, 1, 0);
        copy_layer(grid, field, axis, n - 2, n - 1);
    }
}

/// Set the `i = 0` layer to `value`.
pub fn apply_dirichlet_low_x(grid: &GridSpec, field: &mut [f64], value: f64) {
    debug_assert_eq!(field.len(), grid.cell_count());
    let plane = grid.stride(Axis::X);
    field[..plane].fill(value);
}

/// `field[layer dst] = field[layer src]` along `axis`.
fn copy_layer(grid: &GridSpec, field: &mut [f64], axis: Axis, src: usize, dst: usize) {
    let offset = grid.stride(axis);
    if src > dst {
        let shift = (src - dst) * offset;
        grid.for_each_in_layer(axis, dst, |idx| field[idx] = field[idx + shift]);
    } else {
        let shift = (dst - src) * offset;
        grid.for_each_in_layer(axis, dst, |idx| field[idx] = field[idx - shift]);
    }
}
