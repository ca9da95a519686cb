//! Jacobi (diagonal) preconditioning.

use crate::csr::CsrMatrix;

/// `M^{-1} = diag(A)^{-1}`.
///
/// Rows whose diagonal is zero or non-finite fall back to the identity so
/// the preconditioner is always applicable.
#[derive(Clone, Debug, Default)]
pub struct Jacobi {
    inv_diag: Vec<f64>,
}

impl Jacobi {
    /// Build from the diagonal of `a`.
    pub fn new(a: &CsrMatrix) -> Self {
        let mut p = Self::default();
        p.update(a);
        p
    }

    /// Recompute for a new matrix, reusing the allocation.
    pub fn update(&mut self, a: &CsrMatrix) {
        self.inv_diag.clear();
        self.inv_diag.extend(a.diagonal().into_iter().map(|d| {
            if d != 0.0 && d.is_finite() {
                1.0 / d
            } else {
                1.0
            }
        }));
    }

    /// `z = M^{-1} r`.
    pub fn apply(&self, r: &[f64], z: &mut [f64]) {
        for ((zi, &ri), &m) in z.iter_mut().zip(r).zip(&self.inv_diag) {
            *zi = ri * m;
        }
    }
}
