//! Latent-heat source feeding the heat equation.

/// Weight of the interface-velocity estimate in the latent-heat source.
pub const LATENT_WEIGHT: f64 = 6.0;

/// `dpdt = 6·p·(1-p)·(p_new - p)/dt`.
///
/// A weighted interface-velocity estimate used only as the coupling
/// source `K·dpdt`; the `p·(1-p)` factor confines the release to the
/// diffuse interface.
pub fn latent_heat_source(p: &[f64], p_new: &[f64], dt: f64, out: &mut [f64]) {
    debug_assert_eq!(p.len(), p_new.len());
    debug_assert_eq!(p.len(), out.len());
    for ((d, &old), &new) in out.iter_mut().zip(p).zip(p_new) {
        *d = LATENT_WEIGHT * old * (1.0 - old) * (new - old) / dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanishes_in_bulk_phases() {
        let p = [0.0, 1.0, 0.5];
        let p_new = [0.3, 0.2, 0.6];
        let mut out = [f64::NAN; 3];
        latent_heat_source(&p, &p_new, 0.1, &mut out);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert!((out[2] - 6.0 * 0.25 * 0.1 / 0.1).abs() < 1e-12);
    }

    #[test]
    fn sign_follows_solidification() {
        let mut out = [0.0; 2];
        latent_heat_source(&[0.4, 0.4], &[0.5, 0.3], 1e-4, &mut out);
        assert!(out[0] > 0.0);
        assert!(out[1] < 0.0);
    }
}
