//! Compressed sparse row storage for square matrices.
//!
//! Rows are assembled in order through [`CsrBuilder`]; column indices
//! inside a row must be strictly ascending, which lets [`CsrMatrix::get`]
//! binary-search and keeps the layout deterministic.

use crate::error::CsrError;

/// Square sparse matrix in CSR layout.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// The `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self {
            n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![1.0; n],
        }
    }

    /// Wrap raw CSR arrays assembled by a stencil loop.
    ///
    /// Column indices must be strictly ascending within each row; this is
    /// only checked in debug builds.
    ///
    /// # Panics
    ///
    /// If the array lengths are inconsistent with an `n x n` matrix.
    pub fn from_parts(
        n: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> Self {
        assert_eq!(row_ptr.len(), n + 1, "row_ptr must have n + 1 entries");
        assert_eq!(col_idx.len(), values.len(), "col_idx and values differ in length");
        assert_eq!(row_ptr[n], values.len(), "row_ptr must end at nnz");
        debug_assert!(row_ptr.windows(2).all(|w| w[0] <= w[1]));
        debug_assert!((0..n).all(|r| {
            let cols = &col_idx[row_ptr[r]..row_ptr[r + 1]];
            cols.windows(2).all(|w| w[0] < w[1]) && cols.iter().all(|&c| c < n)
        }));
        Self {
            n,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Matrix order.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Column indices and values of row `row`.
    ///
    /// # Panics
    ///
    /// If `row >= n`.
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        (&self.col_idx[range.clone()], &self.values[range])
    }

    /// Stored value at `(row, col)`, or `0.0` if the entry is structurally zero.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.n {
            return 0.0;
        }
        let (cols, vals) = self.row(row);
        match cols.binary_search(&col) {
            Ok(pos) => vals[pos],
            Err(_) => 0.0,
        }
    }

    /// Main diagonal; structurally missing entries read as `0.0`.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.get(i, i)).collect()
    }

    /// `y = A x`.
    ///
    /// # Panics
    ///
    /// If `x` or `y` do not have length `n`.
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.n, "x length must equal matrix order");
        assert_eq!(y.len(), self.n, "y length must equal matrix order");
        self.mul_vec_rows(x, y);
    }

    #[cfg(not(feature = "parallel"))]
    fn mul_vec_rows(&self, x: &[f64], y: &mut [f64]) {
        for (row, out) in y.iter_mut().enumerate() {
            *out = self.row_dot(row, x);
        }
    }

    #[cfg(feature = "parallel")]
    fn mul_vec_rows(&self, x: &[f64], y: &mut [f64]) {
        use rayon::prelude::*;
        y.par_iter_mut()
            .enumerate()
            .for_each(|(row, out)| *out = self.row_dot(row, x));
    }

    #[inline]
    fn row_dot(&self, row: usize, x: &[f64]) -> f64 {
        let (cols, vals) = self.row(row);
        cols.iter().zip(vals).map(|(&c, &v)| v * x[c]).sum()
    }

    /// `r = b - A x`.
    pub fn residual(&self, x: &[f64], b: &[f64], r: &mut [f64]) {
        self.mul_vec(x, r);
        for (ri, &bi) in r.iter_mut().zip(b) {
            *ri = bi - *ri;
        }
    }

    /// Whether `|A[i][j] - A[j][i]| <= tol` for every stored entry.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.n).all(|i| {
            let (cols, vals) = self.row(i);
            cols.iter()
                .zip(vals)
                .all(|(&j, &v)| (v - self.get(j, i)).abs() <= tol)
        })
    }
}

/// Row-by-row assembler for [`CsrMatrix`].
///
/// ```
/// use dendrite_linalg::CsrBuilder;
///
/// let mut b = CsrBuilder::new(2);
/// b.push_row([(0, 2.0), (1, -1.0)]).unwrap();
/// b.push_row([(0, -1.0), (1, 2.0)]).unwrap();
/// let a = b.build().unwrap();
/// assert_eq!(a.get(1, 0), -1.0);
/// assert!(a.is_symmetric(0.0));
/// ```
#[derive(Debug)]
pub struct CsrBuilder {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrBuilder {
    /// Empty builder for an `n x n` matrix.
    pub fn new(n: usize) -> Self {
        let mut row_ptr = Vec::with_capacity(n + 1);
        row_ptr.push(0);
        Self {
            n,
            row_ptr,
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Empty builder with room for `nnz` entries.
    pub fn with_capacity(n: usize, nnz: usize) -> Self {
        let mut b = Self::new(n);
        b.col_idx.reserve(nnz);
        b.values.reserve(nnz);
        b
    }

    /// Rows pushed so far.
    pub fn rows(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// Append the next row as `(column, value)` pairs in ascending column order.
    pub fn push_row<I>(&mut self, entries: I) -> Result<(), CsrError>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let row = self.rows();
        if row >= self.n {
            return Err(CsrError::TooManyRows { n: self.n });
        }
        let start = self.col_idx.len();
        let mut last: Option<usize> = None;
        for (col, value) in entries {
            if col >= self.n {
                self.col_idx.truncate(start);
                self.values.truncate(start);
                return Err(CsrError::ColumnOutOfRange { row, col, n: self.n });
            }
            if last.is_some_and(|prev| col <= prev) {
                self.col_idx.truncate(start);
                self.values.truncate(start);
                return Err(CsrError::UnsortedRow { row });
            }
            last = Some(col);
            self.col_idx.push(col);
            self.values.push(value);
        }
        self.row_ptr.push(self.col_idx.len());
        Ok(())
    }

    /// Finish assembly.
    pub fn build(self) -> Result<CsrMatrix, CsrError> {
        let rows = self.rows();
        if rows != self.n {
            return Err(CsrError::IncompleteMatrix { rows, n: self.n });
        }
        Ok(CsrMatrix {
            n: self.n,
            row_ptr: self.row_ptr,
            col_idx: self.col_idx,
            values: self.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laplacian_1d(n: usize) -> CsrMatrix {
        let mut b = CsrBuilder::new(n);
        for i in 0..n {
            let mut row = Vec::new();
            if i > 0 {
                row.push((i - 1, -1.0));
            }
            row.push((i, 2.0));
            if i + 1 < n {
                row.push((i + 1, -1.0));
            }
            b.push_row(row).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn identity_mul_is_copy() {
        let a = CsrMatrix::identity(4);
        let x = [1.0, -2.0, 3.5, 0.0];
        let mut y = [9.0; 4];
        a.mul_vec(&x, &mut y);
        assert_eq!(y, x);
        assert_eq!(a.nnz(), 4);
    }

    #[test]
    fn laplacian_structure() {
        let a = laplacian_1d(5);
        assert_eq!(a.nnz(), 13);
        assert_eq!(a.get(2, 2), 2.0);
        assert_eq!(a.get(2, 3), -1.0);
        assert_eq!(a.get(0, 4), 0.0);
        assert_eq!(a.get(7, 0), 0.0);
        assert_eq!(a.diagonal(), vec![2.0; 5]);
        assert!(a.is_symmetric(0.0));
    }

    #[test]
    fn mul_vec_matches_dense() {
        let a = laplacian_1d(3);
        let x = [1.0, 2.0, 3.0];
        let mut y = [0.0; 3];
        a.mul_vec(&x, &mut y);
        assert_eq!(y, [0.0, 0.0, 4.0]);
        let mut r = [0.0; 3];
        a.residual(&x, &[1.0, 1.0, 1.0], &mut r);
        assert_eq!(r, [1.0, 1.0, -3.0]);
    }

    #[test]
    fn asymmetric_detected() {
        let mut b = CsrBuilder::new(2);
        b.push_row([(0, 1.0)]).unwrap();
        b.push_row([(0, -1.0), (1, 3.0)]).unwrap();
        let a = b.build().unwrap();
        assert!(!a.is_symmetric(1e-12));
    }

    #[test]
    fn builder_rejects_bad_rows() {
        let mut b = CsrBuilder::new(2);
        assert_eq!(
            b.push_row([(1, 1.0), (0, 1.0)]),
            Err(CsrError::UnsortedRow { row: 0 })
        );
        assert_eq!(
            b.push_row([(2, 1.0)]),
            Err(CsrError::ColumnOutOfRange { row: 0, col: 2, n: 2 })
        );
        b.push_row([(0, 1.0)]).unwrap();
        assert_eq!(
            b.build().unwrap_err(),
            CsrError::IncompleteMatrix { rows: 1, n: 2 }
        );
    }

    #[test]
    fn builder_rejects_extra_rows() {
        let mut b = CsrBuilder::new(1);
        b.push_row([(0, 1.0)]).unwrap();
        assert_eq!(b.push_row([(0, 1.0)]), Err(CsrError::TooManyRows { n: 1 }));
        assert_eq!(b.build().unwrap(), CsrMatrix::identity(1));
    }
}
