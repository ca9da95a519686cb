//! Sparse linear algebra for the Dendrite solver.
//!
//! Provides a compressed-sparse-row matrix ([`CsrMatrix`]), a Jacobi
//! preconditioner and two preconditioned Krylov methods behind the
//! [`LinearSolver`] trait:
//!
//! - [`ConjugateGradient`] for symmetric positive definite systems.
//! - [`BiCgStab`] for general non-symmetric systems.
//!
//! Solvers never panic on numerical trouble. Non-convergence, breakdown
//! and deadline expiry are reported through [`SolveReport::status`] and
//! the caller decides whether to keep the iterate.
//!
//! With the `parallel` feature, [`CsrMatrix::mul_vec`] runs row-parallel
//! on the rayon global pool.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bicgstab;
pub mod cg;
pub mod csr;
pub mod error;
pub mod precond;
pub mod solver;
pub mod vector;

pub use bicgstab::BiCgStab;
pub use cg::ConjugateGradient;
pub use csr::{CsrBuilder, CsrMatrix};
pub use error::CsrError;
pub use precond::Jacobi;
pub use solver::{LinearSolver, SolveReport, SolveStatus, SolverConfig};
