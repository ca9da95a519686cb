//! YAML parameter files.
//!
//! The file is a flat mapping of names to numbers:
//!
//! ```yaml
//! Nx: 200
//! Ny: 200
//! Lx: 1.0
//! dt: 1.0e-4
//! seed: 18446744073709551557
//! ```
//!
//! Entries the solver reads must be numeric. Anything else (comments,
//! plot settings, output paths) is skipped. The `seed` entry is kept as an
//! exact unsigned integer rather than folded into the [`ParamMap`].

use std::fs;
use std::path::Path;

use dendrite_engine::{ConfigError, ParamMap, SimConfig, OPTIONAL_KEYS, REQUIRED_KEYS, SEED_KEY};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::IoError;

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Integer(u64),
    Number(f64),
    Other(Value),
}

fn is_solver_key(key: &str) -> bool {
    REQUIRED_KEYS.contains(&key) || OPTIONAL_KEYS.contains(&key)
}

/// A parsed parameter file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamFile {
    /// Numeric parameters, in file order.
    pub params: ParamMap,
    /// Noise seed, if the file sets one.
    pub seed: Option<u64>,
}

impl ParamFile {
    /// Build and validate the run configuration. A missing seed is 0.
    pub fn to_config(&self) -> Result<SimConfig, ConfigError> {
        Ok(SimConfig::from_params(&self.params)?.with_seed(self.seed.unwrap_or(0)))
    }
}

/// Parse a YAML document, preserving file order.
///
/// # Errors
///
/// [`IoError::Yaml`] if the text is not a mapping with string keys;
/// [`IoError::NotANumber`] if a key the solver reads has a non-numeric
/// value; [`IoError::Config`] if `seed` is not a non-negative integer.
pub fn parse_params(text: &str) -> Result<ParamFile, IoError> {
    let raw: IndexMap<String, Entry> = serde_yaml::from_str(text)?;
    let mut file = ParamFile {
        params: ParamMap::with_capacity(raw.len()),
        seed: None,
    };
    for (key, entry) in raw {
        match entry {
            Entry::Integer(v) if key == SEED_KEY => file.seed = Some(v),
            Entry::Number(value) if key == SEED_KEY => {
                return Err(ConfigError::InvalidInteger {
                    key: SEED_KEY,
                    value,
                }
                .into());
            }
            Entry::Integer(v) => {
                file.params.insert(key, v as f64);
            }
            Entry::Number(v) => {
                file.params.insert(key, v);
            }
            Entry::Other(_) if key == SEED_KEY || is_solver_key(&key) => {
                return Err(IoError::NotANumber { key });
            }
            Entry::Other(_) => debug!("ignoring non-numeric parameter '{key}'"),
        }
    }
    Ok(file)
}

/// Read and parse a parameter file.
pub fn load_params(path: impl AsRef<Path>) -> Result<ParamFile, IoError> {
    let text = fs::read_to_string(path)?;
    parse_params(&text)
}

/// Read a parameter file and build a validated [`SimConfig`] from it.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig, IoError> {
    Ok(load_params(path)?.to_config()?)
}

/// Render `config` as a flat YAML mapping, seed last.
pub fn render_config(config: &SimConfig) -> Result<String, IoError> {
    let mut doc = Mapping::new();
    for (key, value) in config.to_params() {
        doc.insert(Value::String(key), Value::from(value));
    }
    doc.insert(Value::from(SEED_KEY), Value::from(config.seed));
    Ok(serde_yaml::to_string(&doc)?)
}

/// Write `config` as a parameter file [`load_config`] reads back.
pub fn save_config(path: impl AsRef<Path>, config: &SimConfig) -> Result<(), IoError> {
    fs::write(path, render_config(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "\
Nx: 20
Ny: 20
Lx: 1.0
Ly: 1.0
dt: 1.0e-4
steps: 5
output_interval: 1
epsilon: 0.01
tau: 0.001
K: 1.5
a: 0.0
alpha: 0.9
gamma: 10.0
";

    #[test]
    fn integers_and_floats_parse() {
        let map = parse_params(REFERENCE).unwrap().params;
        assert_eq!(map["Nx"], 20.0);
        assert_eq!(map["dt"], 1e-4);
        assert_eq!(map.keys().next().map(String::as_str), Some("Nx"));
        assert_eq!(map.len(), 13);
    }

    #[test]
    fn reference_file_builds_config() {
        let config = parse_params(REFERENCE).unwrap().to_config().unwrap();
        assert_eq!(config.seed, 0);
        assert_eq!(config.grid.nx(), 20);
        assert_eq!(config.params.steps, 5);
        assert_eq!(config.params.latent_heat, 1.5);
    }

    #[test]
    fn unrelated_strings_are_skipped() {
        let text = format!("{REFERENCE}output_dir: data\ncolormap: viridis\n");
        let map = parse_params(&text).unwrap().params;
        assert!(!map.contains_key("output_dir"));
    }

    #[test]
    fn solver_key_must_be_numeric() {
        let text = REFERENCE.replace("tau: 0.001", "tau: fast");
        match parse_params(&text) {
            Err(IoError::NotANumber { key }) => assert_eq!(key, "tau"),
            other => panic!("expected NotANumber, got {other:?}"),
        }
    }

    #[test]
    fn sequence_is_not_a_parameter_file() {
        assert!(matches!(parse_params("- 1\n- 2\n"), Err(IoError::Yaml(_))));
    }

    #[test]
    fn missing_key_surfaces_as_config_error() {
        let text = REFERENCE.replace("gamma: 10.0\n", "");
        let map = parse_params(&text).unwrap().params;
        assert_eq!(
            SimConfig::from_params(&map),
            Err(ConfigError::MissingKey { key: "gamma" })
        );
    }

    #[test]
    fn seed_beyond_f64_precision_is_exact() {
        let seed = (1u64 << 60) + 1;
        let file = parse_params(&format!("{REFERENCE}seed: {seed}\n")).unwrap();
        assert_eq!(file.seed, Some(seed));
        assert!(!file.params.contains_key(SEED_KEY));
        assert_eq!(file.to_config().unwrap().seed, seed);
    }

    #[test]
    fn rendered_seed_is_an_integer() {
        let config = parse_params(REFERENCE)
            .unwrap()
            .to_config()
            .unwrap()
            .with_seed(u64::MAX);
        let text = render_config(&config).unwrap();
        assert!(text.contains("seed: 18446744073709551615"), "{text}");
        assert_eq!(parse_params(&text).unwrap().to_config().unwrap(), config);
    }

    #[test]
    fn fractional_or_negative_seed_rejected() {
        for bad in ["1.5", "-3"] {
            let text = format!("{REFERENCE}seed: {bad}\n");
            assert!(
                matches!(
                    parse_params(&text),
                    Err(IoError::Config(ConfigError::InvalidInteger { key: "seed", .. }))
                ),
                "seed {bad}"
            );
        }
        let text = format!("{REFERENCE}seed: lucky\n");
        assert!(matches!(parse_params(&text), Err(IoError::NotANumber { .. })));
    }
}
