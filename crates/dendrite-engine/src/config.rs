//! Run configuration, validation and error types.
//!
//! [`SimConfig`] is the single immutable input to
//! [`TimeIntegrator::new`](crate::TimeIntegrator::new). It is usually built
//! from a flat name → number mapping ([`ParamMap`]) as produced by a
//! parameter-file loader, via [`SimConfig::from_params`]. The noise seed
//! is a full `u64` and travels beside the map, under [`SEED_KEY`].

use std::error::Error;
use std::fmt;

use dendrite_core::{Axis, Dimensionality, GridError, GridSpec, ParameterError, SimulationParameters};
use dendrite_linalg::SolverConfig;
use indexmap::IndexMap;

use crate::sanity::SanityPolicy;

/// Flat key-value parameter mapping, in file order.
pub type ParamMap = IndexMap<String, f64>;

/// Keys that must be present in a [`ParamMap`].
pub const REQUIRED_KEYS: [&str; 13] = [
    "Nx",
    "Ny",
    "Lx",
    "Ly",
    "dt",
    "steps",
    "output_interval",
    "epsilon",
    "tau",
    "K",
    "a",
    "alpha",
    "gamma",
];

/// Keys [`SimConfig::from_params`] reads when present.
pub const OPTIONAL_KEYS: [&str; 5] = ["Nz", "Lz", "dim", "T_cool", "T_liquid"];

/// Parameter-file key of the noise seed. Not part of a [`ParamMap`]: an
/// `f64` cannot hold every `u64`.
pub const SEED_KEY: &str = "seed";

// ── ConfigError ────────────────────────────────────────────────────

/// Fatal startup errors. Nothing has been stepped when one is returned.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A required key is absent from the parameter map.
    MissingKey {
        /// The missing key.
        key: &'static str,
    },
    /// A count or index is negative, fractional or too large.
    InvalidInteger {
        /// The offending key.
        key: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Grid construction failed.
    Grid(GridError),
    /// Physical or run-control parameters are invalid.
    Parameters(ParameterError),
    /// Linear solver settings are unusable.
    InvalidSolver {
        /// Which setting and why.
        reason: String,
    },
    /// A restart state does not live on the configured grid.
    StateGridMismatch,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey { key } => write!(f, "missing required parameter '{key}'"),
            Self::InvalidInteger { key, value } => {
                write!(f, "parameter '{key}' must be a non-negative integer, got {value}")
            }
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Parameters(e) => write!(f, "parameters: {e}"),
            Self::InvalidSolver { reason } => write!(f, "invalid solver config: {reason}"),
            Self::StateGridMismatch => {
                write!(f, "restart state grid differs from the configured grid")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Parameters(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<ParameterError> for ConfigError {
    fn from(e: ParameterError) -> Self {
        Self::Parameters(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Discretization.
    pub grid: GridSpec,
    /// Model and run-control parameters.
    pub params: SimulationParameters,
    /// Seed of the interface noise.
    pub seed: u64,
    /// Stopping criteria for both linear solves.
    pub solver: SolverConfig,
    /// Reaction to non-finite values after a step.
    pub sanity: SanityPolicy,
}

impl SimConfig {
    /// Configuration with seed 0, default solver settings and
    /// [`SanityPolicy::Warn`].
    pub fn new(grid: GridSpec, params: SimulationParameters) -> Self {
        Self {
            grid,
            params,
            seed: 0,
            solver: SolverConfig::default(),
            sanity: SanityPolicy::default(),
        }
    }

    /// Set the noise seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the linear solver settings.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Set the sanity policy.
    pub fn with_sanity(mut self, sanity: SanityPolicy) -> Self {
        self.sanity = sanity;
        self
    }

    /// Build from a flat parameter map.
    ///
    /// Required keys are listed in [`REQUIRED_KEYS`]. Optional keys and
    /// their defaults: `Nz` (1), `Lz` (`Lx`), `dim` (2), `T_cool` (0),
    /// `T_liquid` (0). Unknown keys are ignored, `seed` included; the seed
    /// starts at 0 and is set with [`with_seed`](Self::with_seed). The
    /// result is validated before it is returned.
    pub fn from_params(map: &ParamMap) -> Result<Self, ConfigError> {
        for key in REQUIRED_KEYS {
            if !map.contains_key(key) {
                return Err(ConfigError::MissingKey { key });
            }
        }
        let get = |key: &'static str| map.get(key).copied().ok_or(ConfigError::MissingKey { key });
        let get_or = |key: &str, default: f64| map.get(key).copied().unwrap_or(default);

        let dim_raw = integer("dim", get_or("dim", 2.0))?;
        let dim = u32::try_from(dim_raw)
            .map_err(|_| GridError::InvalidDimension { value: u32::MAX })
            .and_then(Dimensionality::try_from)?;

        let lx = get("Lx")?;
        let cells = [
            cell_count("Nx", get("Nx")?)?,
            cell_count("Ny", get("Ny")?)?,
            cell_count("Nz", get_or("Nz", 1.0))?,
        ];
        let extent = [lx, get("Ly")?, get_or("Lz", lx)];
        let grid = GridSpec::new(dim, cells, extent)?;

        let params = SimulationParameters {
            epsilon: get("epsilon")?,
            tau: get("tau")?,
            latent_heat: get("K")?,
            alpha: get("alpha")?,
            gamma: get("gamma")?,
            noise_amplitude: get("a")?,
            dt: get("dt")?,
            steps: integer("steps", get("steps")?)?,
            output_interval: integer("output_interval", get("output_interval")?)?,
            t_cool: get_or("T_cool", 0.0),
            t_liquid: get_or("T_liquid", 0.0),
        };
        let config = Self::new(grid, params);
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the integrator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        let s = &self.solver;
        if !s.rtol.is_finite() || s.rtol < 0.0 {
            return Err(ConfigError::InvalidSolver {
                reason: format!("rtol must be finite and >= 0, got {}", s.rtol),
            });
        }
        if !s.atol.is_finite() || s.atol < 0.0 {
            return Err(ConfigError::InvalidSolver {
                reason: format!("atol must be finite and >= 0, got {}", s.atol),
            });
        }
        if s.max_iterations == 0 {
            return Err(ConfigError::InvalidSolver {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The flat mapping this configuration was (or could have been)
    /// loaded from. The seed is left out; see [`SEED_KEY`].
    pub fn to_params(&self) -> ParamMap {
        let p = &self.params;
        let g = &self.grid;
        [
            ("Nx", g.nx() as f64),
            ("Ny", g.ny() as f64),
            ("Nz", g.nz() as f64),
            ("Lx", g.extent(Axis::X)),
            ("Ly", g.extent(Axis::Y)),
            ("Lz", g.extent(Axis::Z)),
            ("dim", f64::from(g.dim().as_u32())),
            ("dt", p.dt),
            ("steps", p.steps as f64),
            ("output_interval", p.output_interval as f64),
            ("epsilon", p.epsilon),
            ("tau", p.tau),
            ("K", p.latent_heat),
            ("a", p.noise_amplitude),
            ("alpha", p.alpha),
            ("gamma", p.gamma),
            ("T_cool", p.t_cool),
            ("T_liquid", p.t_liquid),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

fn integer(key: &'static str, value: f64) -> Result<u64, ConfigError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_EXACT {
        return Err(ConfigError::InvalidInteger { key, value });
    }
    Ok(value as u64)
}

fn cell_count(key: &'static str, value: f64) -> Result<usize, ConfigError> {
    let n = integer(key, value)?;
    usize::try_from(n).map_err(|_| ConfigError::InvalidInteger { key, value })
}
