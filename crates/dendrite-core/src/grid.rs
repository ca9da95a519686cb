//! Uniform Cartesian discretization in two or three dimensions.
//!
//! [`GridSpec`] is immutable after construction. Cells are flattened in
//! row-major order, `I(i, j, k) = i*ny*nz + j*nz + k`, so a 2D grid is
//! simply a 3D grid with a single Z layer.

use std::fmt;

use smallvec::{smallvec, SmallVec};

use crate::error::GridError;

/// A Cartesian axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// First (slowest-varying) axis. The Dirichlet face lies at `i = 0`.
    X,
    /// Second axis.
    Y,
    /// Third (fastest-varying) axis. Inactive in 2D.
    Z,
}

impl Axis {
    /// All three axes in storage order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in `[x, y, z]` arrays.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// Spatial dimensionality of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    /// Planar run; Z stencil and boundary terms are skipped entirely.
    Two,
    /// Volumetric run.
    Three,
}

impl Dimensionality {
    /// Numeric value (2 or 3).
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl TryFrom<u32> for Dimensionality {
    type Error = GridError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(GridError::InvalidDimension { value }),
        }
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.as_u32())
    }
}

/// Discretization of the simulation domain.
///
/// Holds the cell counts and physical extents per axis. Spacing is
/// derived as `extent / cells`, matching a cell-centred layout without a
/// closing endpoint.
///
/// # Examples
///
/// ```
/// use dendrite_core::GridSpec;
///
/// let grid = GridSpec::planar(20, 10, 1.0, 0.5).unwrap();
/// assert_eq!(grid.cell_count(), 200);
/// assert_eq!(grid.shape().as_slice(), &[20, 10]);
/// assert_eq!(grid.index(1, 2, 0), 12);
/// assert!((grid.dx() - 0.05).abs() < 1e-15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    dim: Dimensionality,
    cells: [usize; 3],
    extent: [f64; 3],
}

impl GridSpec {
    /// Create a grid, validating every axis.
    ///
    /// # Errors
    ///
    /// - [`GridError::EmptyAxis`] if any cell count is zero.
    /// - [`GridError::InvalidExtent`] if any extent is not finite and positive.
    /// - [`GridError::DepthInTwoDimensions`] if `dim` is 2D and `nz != 1`.
    /// - [`GridError::CellCountOverflow`] if the product of counts overflows.
    pub fn new(
        dim: Dimensionality,
        cells: [usize; 3],
        extent: [f64; 3],
    ) -> Result<Self, GridError> {
        for axis in Axis::ALL {
            if cells[axis.index()] == 0 {
                return Err(GridError::EmptyAxis { axis });
            }
            let l = extent[axis.index()];
            if !l.is_finite() || l <= 0.0 {
                return Err(GridError::InvalidExtent { axis, value: l });
            }
        }
        if dim == Dimensionality::Two && cells[2] != 1 {
            return Err(GridError::DepthInTwoDimensions { nz: cells[2] });
        }
        cells[0]
            .checked_mul(cells[1])
            .and_then(|n| n.checked_mul(cells[2]))
            .ok_or(GridError::CellCountOverflow)?;
        Ok(Self { dim, cells, extent })
    }

    /// A 2D grid of `nx * ny` cells. The Z extent is set to `lx`.
    pub fn planar(nx: usize, ny: usize, lx: f64, ly: f64) -> Result<Self, GridError> {
        Self::new(Dimensionality::Two, [nx, ny, 1], [lx, ly, lx])
    }

    /// A 3D grid of `nx * ny * nz` cells.
    pub fn volume(
        nx: usize,
        ny: usize,
        nz: usize,
        lx: f64,
        ly: f64,
        lz: f64,
    ) -> Result<Self, GridError> {
        Self::new(Dimensionality::Three, [nx, ny, nz], [lx, ly, lz])
    }

    /// Dimensionality of the run.
    pub fn dim(&self) -> Dimensionality {
        self.dim
    }

    /// Cells along X.
    pub fn nx(&self) -> usize {
        self.cells[0]
    }

    /// Cells along Y.
    pub fn ny(&self) -> usize {
        self.cells[1]
    }

    /// Cells along Z (always 1 in 2D).
    pub fn nz(&self) -> usize {
        self.cells[2]
    }

    /// Cells along `axis`.
    pub fn cells(&self, axis: Axis) -> usize {
        self.cells[axis.index()]
    }

    /// Physical extent along `axis`.
    pub fn extent(&self, axis: Axis) -> f64 {
        self.extent[axis.index()]
    }

    /// Cell spacing along `axis`.
    pub fn spacing(&self, axis: Axis) -> f64 {
        self.extent[axis.index()] / self.cells[axis.index()] as f64
    }

    /// Cell spacing along X. The stencils use this spacing on every axis.
    pub fn dx(&self) -> f64 {
        self.spacing(Axis::X)
    }

    /// Cell spacing along Y.
    pub fn dy(&self) -> f64 {
        self.spacing(Axis::Y)
    }

    /// Cell spacing along Z.
    pub fn dz(&self) -> f64 {
        self.spacing(Axis::Z)
    }

    /// Total number of cells, `nx * ny * nz`.
    pub fn cell_count(&self) -> usize {
        self.cells[0] * self.cells[1] * self.cells[2]
    }

    /// Array shape: `[nx, ny]` in 2D, `[nx, ny, nz]` in 3D.
    pub fn shape(&self) -> SmallVec<[usize; 3]> {
        match self.dim {
            Dimensionality::Two => smallvec![self.cells[0], self.cells[1]],
            Dimensionality::Three => smallvec![self.cells[0], self.cells[1], self.cells[2]],
        }
    }

    /// Axes that carry stencil and boundary terms.
    pub fn active_axes(&self) -> &'static [Axis] {
        match self.dim {
            Dimensionality::Two => &[Axis::X, Axis::Y],
            Dimensionality::Three => &[Axis::X, Axis::Y, Axis::Z],
        }
    }

    /// Distance in the flat index between neighbours along `axis`.
    pub fn stride(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.cells[1] * self.cells[2],
            Axis::Y => self.cells[2],
            Axis::Z => 1,
        }
    }

    /// Flat row-major index of cell `(i, j, k)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.cells[0] && j < self.cells[1] && k < self.cells[2]);
        i * self.cells[1] * self.cells[2] + j * self.cells[2] + k
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn coords(&self, idx: usize) -> [usize; 3] {
        let plane = self.cells[1] * self.cells[2];
        [
            idx / plane,
            (idx % plane) / self.cells[2],
            idx % self.cells[2],
        ]
    }

    /// In-bounds axis neighbours of `(i, j, k)`, in ascending flat-index order.
    ///
    /// Neighbours outside the grid are omitted rather than mirrored, so
    /// boundary cells have fewer entries. Z neighbours are only produced
    /// in 3D.
    pub fn neighbours(&self, i: usize, j: usize, k: usize) -> SmallVec<[usize; 6]> {
        let centre = self.index(i, j, k);
        let sx = self.stride(Axis::X);
        let sy = self.stride(Axis::Y);
        let three_d = self.dim == Dimensionality::Three;
        let mut out = SmallVec::new();
        if i > 0 {
            out.push(centre - sx);
        }
        if j > 0 {
            out.push(centre - sy);
        }
        if three_d && k > 0 {
            out.push(centre - 1);
        }
        if three_d && k + 1 < self.cells[2] {
            out.push(centre + 1);
        }
        if j + 1 < self.cells[1] {
            out.push(centre + sy);
        }
        if i + 1 < self.cells[0] {
            out.push(centre + sx);
        }
        out
    }

    /// Visit the flat index of every cell in the layer `axis = layer`.
    ///
    /// Cells are visited in ascending index order.
    pub fn for_each_in_layer(&self, axis: Axis, layer: usize, mut f: impl FnMut(usize)) {
        debug_assert!(layer < self.cells(axis));
        let [nx, ny, nz] = self.cells;
        match axis {
            Axis::X => {
                for j in 0..ny {
                    for k in 0..nz {
                        f(self.index(layer, j, k));
                    }
                }
            }
            Axis::Y => {
                for i in 0..nx {
                    for k in 0..nz {
                        f(self.index(i, layer, k));
                    }
                }
            }
            Axis::Z => {
                for i in 0..nx {
                    for j in 0..ny {
                        f(self.index(i, j, layer));
                    }
                }
            }
        }
    }
}
