//! Error types for parameter files and dumps.

use std::fmt;
use std::io;

use dendrite_core::GridError;
use dendrite_engine::{ConfigError, OutputError};

/// Errors raised while reading or writing Dendrite files.
#[derive(Debug)]
pub enum IoError {
    /// The underlying read or write failed.
    Io(io::Error),
    /// The parameter file is not valid YAML or not a mapping.
    Yaml(serde_yaml::Error),
    /// A parameter the solver reads has a non-numeric value.
    NotANumber {
        /// Offending key.
        key: String,
    },
    /// The parameters do not form a valid configuration.
    Config(ConfigError),
    /// The file does not start with `b"DNDR"`.
    InvalidMagic,
    /// The dump was written by an unsupported format version.
    UnsupportedVersion {
        /// Version byte found in the file.
        found: u8,
    },
    /// The dump header describes an impossible grid.
    Grid(GridError),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Yaml(e) => write!(f, "parameter file: {e}"),
            Self::NotANumber { key } => write!(f, "parameter '{key}' is not a number"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"DNDR\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported dump format version {found}")
            }
            Self::Grid(e) => write!(f, "dump header: {e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Yaml(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for IoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for IoError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

impl From<ConfigError> for IoError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<GridError> for IoError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<IoError> for OutputError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Io(e) => OutputError::Io(e),
            other => OutputError::Rejected {
                reason: other.to_string(),
            },
        }
    }
}
