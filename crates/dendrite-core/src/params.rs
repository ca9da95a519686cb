//! Immutable physical and run-control parameters.

use crate::error::ParameterError;

/// Parameters of the Kobayashi model and of the time loop.
///
/// Constructed once at startup and passed by reference into the steppers;
/// never mutated during a run. Field names follow the model's symbols;
/// the configuration keys they are loaded from are noted per field.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
    /// Gradient energy coefficient, sets the interface width (`epsilon`).
    pub epsilon: f64,
    /// Phase-field relaxation time (`tau`).
    pub tau: f64,
    /// Dimensionless latent heat (`K`).
    pub latent_heat: f64,
    /// Driving-force strength (`alpha`).
    pub alpha: f64,
    /// Thermal sensitivity of the driving force (`gamma`).
    pub gamma: f64,
    /// Amplitude of the uniform interface noise (`a`).
    pub noise_amplitude: f64,
    /// Time step (`dt`).
    pub dt: f64,
    /// Number of time steps to run (`steps`).
    pub steps: u64,
    /// Output cadence in steps; step 0 is always delivered (`output_interval`).
    pub output_interval: u64,
    /// Dirichlet temperature on the `i = 0` face (`T_cool`).
    pub t_cool: f64,
    /// Initial uniform temperature (`T_liquid`).
    pub t_liquid: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            tau: 1e-3,
            latent_heat: 1.5,
            alpha: 0.9,
            gamma: 10.0,
            noise_amplitude: 0.0,
            dt: 1e-4,
            steps: 5,
            output_interval: 1,
            t_cool: 0.0,
            t_liquid: 0.0,
        }
    }
}

impl SimulationParameters {
    /// Check that every value is usable by the steppers.
    ///
    /// `epsilon`, `tau` and `dt` must be strictly positive, the noise
    /// amplitude non-negative, every float finite and `output_interval`
    /// at least 1. `steps = 0` is allowed and produces an empty run.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let finite = [
            ("epsilon", self.epsilon),
            ("tau", self.tau),
            ("K", self.latent_heat),
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("a", self.noise_amplitude),
            ("dt", self.dt),
            ("T_cool", self.t_cool),
            ("T_liquid", self.t_liquid),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite { name, value });
            }
        }
        for (name, value) in [("epsilon", self.epsilon), ("tau", self.tau), ("dt", self.dt)] {
            if value <= 0.0 {
                return Err(ParameterError::NotPositive { name, value });
            }
        }
        if self.noise_amplitude < 0.0 {
            return Err(ParameterError::Negative {
                name: "a",
                value: self.noise_amplitude,
            });
        }
        if self.output_interval == 0 {
            return Err(ParameterError::ZeroOutputInterval);
        }
        Ok(())
    }

    /// Whether step `step` is an output step (`step % output_interval == 0`).
    pub fn is_output_step(&self, step: u64) -> bool {
        self.output_interval != 0 && step % self.output_interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimulationParameters::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_tau() {
        let p = SimulationParameters {
            tau: 0.0,
            ..Default::default()
        };
        assert_eq!(
            p.validate(),
            Err(ParameterError::NotPositive {
                name: "tau",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_nan_alpha() {
        let p = SimulationParameters {
            alpha: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParameterError::NotFinite { name: "alpha", .. })
        ));
    }

    #[test]
    fn rejects_negative_noise() {
        let p = SimulationParameters {
            noise_amplitude: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParameterError::Negative { name: "a", .. })
        ));
    }

    #[test]
    fn rejects_zero_output_interval() {
        let p = SimulationParameters {
            output_interval: 0,
            ..Default::default()
        };
        assert_eq!(p.validate(), Err(ParameterError::ZeroOutputInterval));
        assert!(!p.is_output_step(0));
    }

    #[test]
    fn output_cadence_includes_step_zero() {
        let p = SimulationParameters {
            output_interval: 3,
            ..Default::default()
        };
        let hits: Vec<u64> = (0..10).filter(|&s| p.is_output_step(s)).collect();
        assert_eq!(hits, vec![0, 3, 6, 9]);
    }
}
