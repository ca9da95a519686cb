//! Run orchestration for the Dendrite phase-field solver.
//!
//! [`TimeIntegrator`] owns the field state and drives the
//! boundary → driving force → phase → coupling → heat → commit sequence
//! once per step, handing deep-copied frames to an [`OutputSink`] at the
//! configured cadence. Solver trouble never aborts a run: it is logged and
//! published as a [`SolverEvent`] on a channel the caller may drain.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod config;
pub mod events;
pub mod integrator;
pub mod metrics;
pub mod output;
pub mod sanity;

pub use cancel::CancelToken;
pub use config::{ConfigError, ParamMap, SimConfig, OPTIONAL_KEYS, REQUIRED_KEYS, SEED_KEY};
pub use events::SolverEvent;
pub use integrator::{IntegratorState, RunSummary, StepError, StepReport, TimeIntegrator};
pub use metrics::StepMetrics;
pub use output::{BackgroundSink, NullSink, OutputError, OutputFrame, OutputSink};
pub use sanity::SanityPolicy;
