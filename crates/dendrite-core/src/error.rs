//! Error types for grid construction and parameter validation.
//!
//! Both are startup errors: they surface before any time step runs and
//! the engine wraps them in its `ConfigError`.

use std::error::Error;
use std::fmt;

use crate::grid::Axis;

/// Errors from [`GridSpec`](crate::GridSpec) construction.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// Dimensionality other than 2 or 3.
    InvalidDimension {
        /// The rejected value.
        value: u32,
    },
    /// An axis was given zero cells.
    EmptyAxis {
        /// The offending axis.
        axis: Axis,
    },
    /// A physical extent is zero, negative, NaN or infinite.
    InvalidExtent {
        /// The offending axis.
        axis: Axis,
        /// The rejected extent.
        value: f64,
    },
    /// A 2D grid was given more than one cell along Z.
    DepthInTwoDimensions {
        /// The configured `nz`.
        nz: usize,
    },
    /// `nx * ny * nz` does not fit in `usize`.
    CellCountOverflow,
    /// An array does not have one entry per grid cell.
    ShapeMismatch {
        /// Expected length (`cell_count`).
        expected: usize,
        /// Actual length.
        found: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { value } => {
                write!(f, "dimensionality must be 2 or 3, got {value}")
            }
            Self::EmptyAxis { axis } => write!(f, "axis {axis} has zero cells"),
            Self::InvalidExtent { axis, value } => {
                write!(f, "extent along {axis} must be finite and > 0, got {value}")
            }
            Self::DepthInTwoDimensions { nz } => {
                write!(f, "2D grid requires nz = 1, got {nz}")
            }
            Self::CellCountOverflow => write!(f, "cell count overflows usize"),
            Self::ShapeMismatch { expected, found } => {
                write!(f, "array has {found} entries, grid has {expected} cells")
            }
        }
    }
}

impl Error for GridError {}

/// Errors from [`SimulationParameters::validate`](crate::SimulationParameters::validate).
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterError {
    /// A parameter is NaN or infinite.
    NotFinite {
        /// Parameter name as it appears in configuration files.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A parameter that must be strictly positive is not.
    NotPositive {
        /// Parameter name as it appears in configuration files.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A parameter that must be non-negative is negative.
    Negative {
        /// Parameter name as it appears in configuration files.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// `output_interval` is zero.
    ZeroOutputInterval,
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinite { name, value } => write!(f, "{name} must be finite, got {value}"),
            Self::NotPositive { name, value } => write!(f, "{name} must be > 0, got {value}"),
            Self::Negative { name, value } => write!(f, "{name} must be >= 0, got {value}"),
            Self::ZeroOutputInterval => write!(f, "output_interval must be >= 1"),
        }
    }
}

impl Error for ParameterError {}
