//! Post-solve scan for NaN and infinite values.

use std::fmt;

/// What to do when a freshly solved field contains a non-finite value.
///
/// The scan runs after both solves and before the step is committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SanityPolicy {
    /// Skip the scan.
    Off,
    /// Log, publish an event and commit the step anyway.
    #[default]
    Warn,
    /// Log, publish an event, discard the step and stop the run.
    Abort,
}

impl fmt::Display for SanityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Warn => write!(f, "warn"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Index of the first NaN or infinite entry.
pub fn first_non_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_bad_cell() {
        assert_eq!(first_non_finite(&[0.0, 1.0]), None);
        assert_eq!(first_non_finite(&[0.0, f64::INFINITY, f64::NAN]), Some(1));
        assert_eq!(first_non_finite(&[]), None);
    }

    #[test]
    fn warn_is_default() {
        assert_eq!(SanityPolicy::default(), SanityPolicy::Warn);
        assert_eq!(SanityPolicy::Abort.to_string(), "abort");
    }
}
