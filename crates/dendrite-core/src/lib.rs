//! Core types for the Dendrite phase-field solidification solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the discretization ([`GridSpec`]), the owned simulation state
//! ([`FieldState`]), the immutable run parameters
//! ([`SimulationParameters`]) and the error types shared across the
//! workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod grid;
pub mod id;
pub mod params;

pub use error::{GridError, ParameterError};
pub use field::{FieldBuffers, FieldKind, FieldState, SEED_PERCENT};
pub use grid::{Axis, Dimensionality, GridSpec};
pub use id::StepId;
pub use params::SimulationParameters;
