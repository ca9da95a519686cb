//! Temperature-dependent driving force `m(T)`.

use std::f64::consts::PI;

/// `m(T) = (α/π)·atan(γ(1 - T))`.
///
/// Bounded in `(-α/2, α/2)` for finite input, monotonically decreasing in
/// `T` for `α, γ > 0`, and zero at `T = 1`.
///
/// ```
/// use dendrite_solver::driving_force;
///
/// assert_eq!(driving_force(1.0, 0.9, 10.0), 0.0);
/// assert!(driving_force(0.0, 0.9, 10.0) > 0.0);
/// ```
#[inline]
pub fn driving_force(t: f64, alpha: f64, gamma: f64) -> f64 {
    (alpha / PI) * (gamma * (1.0 - t)).atan()
}

/// Elementwise [`driving_force`] of `t` into `out`.
pub fn fill_driving_force(t: &[f64], alpha: f64, gamma: f64, out: &mut [f64]) {
    debug_assert_eq!(t.len(), out.len());
    for (m, &ti) in out.iter_mut().zip(t) {
        *m = driving_force(ti, alpha, gamma);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fills_elementwise() {
        let t = [0.0, 1.0, 2.0];
        let mut m = [0.0; 3];
        fill_driving_force(&t, 0.9, 10.0, &mut m);
        assert_eq!(m[1], 0.0);
        assert!((m[0] + m[2]).abs() < 1e-15);
    }

    proptest! {
        #[test]
        fn bounded_and_decreasing(
            t in -1e6f64..1e6,
            dt in 1e-3f64..10.0,
            alpha in 1e-3f64..10.0,
            gamma in 1e-3f64..100.0,
        ) {
            let m = driving_force(t, alpha, gamma);
            prop_assert!(m.abs() <= alpha / 2.0 * (1.0 + 1e-12));
            prop_assert!(driving_force(t + dt, alpha, gamma) <= m);
            prop_assert_eq!(driving_force(1.0, alpha, gamma), 0.0);
        }

        #[test]
        fn strictly_inside_for_moderate_arguments(
            t in -10.0f64..10.0,
            alpha in 1e-3f64..10.0,
            gamma in 1e-3f64..10.0,
        ) {
            let m = driving_force(t, alpha, gamma);
            prop_assert!(m > -alpha / 2.0 && m < alpha / 2.0);
        }
    }
}
