//! File formats for Dendrite runs.
//!
//! - [`params`]: the flat YAML parameter file (`Nx: 200`, `dt: 1.0e-4`, ...)
//!   read into a [`ParamMap`](dendrite_engine::ParamMap) plus an exact
//!   integer seed.
//! - [`codec`]: a small binary dump of one [`OutputFrame`](dendrite_engine::OutputFrame).
//! - [`sink`]: [`DumpSink`], an output sink writing one dump per frame,
//!   and [`restore_fields`] for restarting from a dump.
//!
//! # Dump format
//!
//! ```text
//! [MAGIC "DNDR"] [VERSION u8] [dim u8] [nx ny nz: u32] [lx ly lz: f64]
//! [step u64] [time f64] [p: f64 × n] [T: f64 × n]
//! ```
//!
//! All values are little-endian; arrays are row-major.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod params;
pub mod sink;

pub use codec::{read_dump, write_dump};
pub use error::IoError;
pub use params::{
    load_config, load_params, parse_params, render_config, save_config, ParamFile,
};
pub use sink::{restore_fields, DumpSink};

/// Magic bytes at the start of every dump file.
pub const MAGIC: [u8; 4] = *b"DNDR";

/// Current dump format version.
pub const FORMAT_VERSION: u8 = 1;
