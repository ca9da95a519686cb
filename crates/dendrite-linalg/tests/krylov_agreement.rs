//! CG and BiCGStab must agree on diagonally dominant symmetric systems,
//! and both must leave a residual below the configured threshold.

use dendrite_linalg::{BiCgStab, ConjugateGradient, CsrBuilder, CsrMatrix, LinearSolver, SolverConfig};
use proptest::prelude::*;

/// Symmetric 1D stencil with per-row diagonal shifts.
fn shifted_laplacian(shifts: &[f64], coupling: f64) -> CsrMatrix {
    let n = shifts.len();
    let mut b = CsrBuilder::new(n);
    for i in 0..n {
        let mut row = Vec::new();
        if i > 0 {
            row.push((i - 1, -coupling));
        }
        row.push((i, 2.0 * coupling + shifts[i]));
        if i + 1 < n {
            row.push((i + 1, -coupling));
        }
        b.push_row(row).unwrap();
    }
    b.build().unwrap()
}

proptest! {
    #[test]
    fn solvers_agree(
        shifts in prop::collection::vec(0.01f64..2.0, 2..40),
        coupling in 0.0f64..5.0,
        seed in prop::collection::vec(-1.0f64..1.0, 40),
    ) {
        let a = shifted_laplacian(&shifts, coupling);
        prop_assert!(a.is_symmetric(0.0));
        let n = a.n();
        let b = &seed[..n];
        let config = SolverConfig::default();

        let mut x_cg = vec![0.0; n];
        let r_cg = ConjugateGradient::new(config.clone()).solve(&a, b, &mut x_cg);
        let mut x_bi = vec![0.0; n];
        let r_bi = BiCgStab::new(config.clone()).solve(&a, b, &mut x_bi);

        prop_assert!(r_cg.converged(), "cg: {}", r_cg);
        prop_assert!(r_bi.converged(), "bicgstab: {}", r_bi);

        let mut r = vec![0.0; n];
        a.residual(&x_cg, b, &mut r);
        let res: f64 = r.iter().map(|v| v * v).sum::<f64>().sqrt();
        prop_assert!(res <= config.threshold(r_cg.rhs_norm) * 10.0);

        for (u, v) in x_cg.iter().zip(&x_bi) {
            prop_assert!((u - v).abs() < 1e-6, "{} vs {}", u, v);
        }
    }
}
