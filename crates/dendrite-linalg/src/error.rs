//! Errors from sparse matrix assembly.

use std::error::Error;
use std::fmt;

/// Errors from [`CsrBuilder`](crate::CsrBuilder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CsrError {
    /// A column index is outside `0..n`.
    ColumnOutOfRange {
        /// Row being assembled.
        row: usize,
        /// Offending column.
        col: usize,
        /// Matrix order.
        n: usize,
    },
    /// Column indices within a row are not strictly ascending.
    UnsortedRow {
        /// Row being assembled.
        row: usize,
    },
    /// More rows were pushed than the matrix has.
    TooManyRows {
        /// Matrix order.
        n: usize,
    },
    /// `build` was called before every row was pushed.
    IncompleteMatrix {
        /// Rows pushed so far.
        rows: usize,
        /// Matrix order.
        n: usize,
    },
}

impl fmt::Display for CsrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnOutOfRange { row, col, n } => {
                write!(f, "row {row}: column {col} out of range for order {n}")
            }
            Self::UnsortedRow { row } => {
                write!(f, "row {row}: column indices must be strictly ascending")
            }
            Self::TooManyRows { n } => write!(f, "matrix of order {n} is already full"),
            Self::IncompleteMatrix { rows, n } => {
                write!(f, "only {rows} of {n} rows assembled")
            }
        }
    }
}

impl Error for CsrError {}
