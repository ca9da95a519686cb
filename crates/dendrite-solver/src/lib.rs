//! Discretization and per-equation steppers for the Kobayashi
//! phase-field model.
//!
//! One time step of the model is, in order:
//!
//! 1. [`apply_boundary_conditions`] on `p` and `T`.
//! 2. [`fill_driving_force`] computes `m(T)`.
//! 3. [`PhaseFieldStepper::step`] solves the IMEX phase equation.
//! 4. [`latent_heat_source`] derives the `dp/dt` coupling term.
//! 5. [`HeatStepper::step`] solves the backward-Euler heat equation.
//!
//! The orchestration (buffer swaps, output, events) lives in
//! `dendrite-engine`; this crate is purely numerical and has no
//! notion of a run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod coupling;
pub mod driving_force;
pub mod heat;
pub mod noise;
pub mod operator;
pub mod phase;

pub use boundary::{apply_boundary_conditions, apply_dirichlet_low_x, apply_neumann};
pub use coupling::{latent_heat_source, LATENT_WEIGHT};
pub use driving_force::{driving_force, fill_driving_force};
pub use heat::HeatStepper;
pub use noise::NoiseField;
pub use operator::{heat_operator, phase_operator, OperatorCache};
pub use phase::PhaseFieldStepper;

/// Which equation a solve belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Equation {
    /// The phase-field (Allen-Cahn type) equation.
    Phase,
    /// The heat equation.
    Heat,
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phase => write!(f, "phase"),
            Self::Heat => write!(f, "heat"),
        }
    }
}
