//! Matrix operations.
//!
//! This module provides small, stack-allocated linear algebra helpers used by the
//! geometric predicates. Every matrix built here is `D×D` with rows `p_i - p_0`,
//! so the sizes stay within the const-generic dimension of the simplex.

#![forbid(unsafe_code)]

use la_stack::{DEFAULT_PIVOT_TOL, LaError, Matrix as LaMatrix, Vector as LaVector};
use thiserror::Error;

/// Internal linear algebra matrix type used by this crate for fixed-size operations.
pub type Matrix<const D: usize> = LaMatrix<D>;

/// Error type for matrix operations.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::geometry::matrix::MatrixError;
///
/// let err = MatrixError::SingularMatrix;
/// assert_eq!(err.to_string(), "Matrix is singular!");
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatrixError {
    /// Matrix is singular.
    #[error("Matrix is singular!")]
    SingularMatrix,
    /// The matrix or right-hand side contains NaN or infinity.
    #[error("Matrix contains non-finite entries")]
    NonFinite,
}

/// Relative tolerance below which a normalized determinant counts as zero.
///
/// The determinant of the edge-vector matrix is divided by the product of its row
/// norms (Hadamard's bound), so the ratio lies in `[-1, 1]` independent of scale.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

#[inline]
pub(crate) fn matrix_get<const D: usize>(m: &Matrix<D>, r: usize, c: usize) -> f64 {
    m.get(r, c).unwrap_or(f64::NAN)
}

#[inline]
pub(crate) fn matrix_set<const D: usize>(m: &mut Matrix<D>, r: usize, c: usize, value: f64) {
    let ok = m.set(r, c, value);
    debug_assert!(ok, "matrix index out of bounds: ({r}, {c}) for {D}x{D}");
}

/// Builds the `D×D` matrix whose rows are the given vectors.
#[must_use]
pub fn matrix_from_rows<const D: usize>(rows: &[[f64; D]; D]) -> Matrix<D> {
    let mut m = Matrix::<D>::zero();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            matrix_set(&mut m, r, c, *value);
        }
    }
    m
}

/// Compute an LU-based determinant, returning 0.0 for singular matrices.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::geometry::matrix::{determinant, matrix_from_rows, Matrix};
///
/// let m = Matrix::<2>::zero();
/// assert_eq!(determinant(&m), 0.0);
///
/// let m = matrix_from_rows(&[[2.0, 0.0], [0.0, 3.0]]);
/// assert!((determinant(&m) - 6.0).abs() < 1e-12);
/// ```
#[inline]
#[must_use]
pub fn determinant<const D: usize>(m: &Matrix<D>) -> f64 {
    match m.det(0.0) {
        Ok(det) => det,
        Err(LaError::NonFinite { .. }) => f64::NAN,
        Err(_) => 0.0,
    }
}

/// Product of the Euclidean row norms: an upper bound on `|det(m)|`.
#[must_use]
pub fn hadamard_bound<const D: usize>(m: &Matrix<D>) -> f64 {
    (0..D)
        .map(|r| {
            (0..D)
                .map(|c| {
                    let v = matrix_get(m, r, c);
                    v * v
                })
                .sum::<f64>()
                .sqrt()
        })
        .product()
}

/// Solves `m x = b`.
///
/// Uses la-stack's default absolute pivot tolerance first, then falls back to a zero
/// tolerance for badly scaled but invertible systems.
///
/// # Errors
///
/// Returns [`MatrixError::SingularMatrix`] if the system has no unique solution and
/// [`MatrixError::NonFinite`] if NaN or infinity shows up during the factorization.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::geometry::matrix::{matrix_from_rows, solve};
///
/// let m = matrix_from_rows(&[[1.0, 0.0], [0.0, 2.0]]);
/// let x = solve(&m, [3.0, 4.0]).unwrap();
/// assert!((x[0] - 3.0).abs() < 1e-12 && (x[1] - 2.0).abs() < 1e-12);
/// ```
pub fn solve<const D: usize>(m: &Matrix<D>, b: [f64; D]) -> Result<[f64; D], MatrixError> {
    let lu = match m.lu(DEFAULT_PIVOT_TOL) {
        Ok(lu) => lu,
        Err(LaError::Singular { .. }) => m.lu(0.0).map_err(from_la_error)?,
        Err(e) => return Err(from_la_error(e)),
    };
    let x = lu
        .solve_vec(LaVector::<D>::new(b))
        .map_err(from_la_error)?
        .into_array();
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(MatrixError::NonFinite)
    }
}

fn from_la_error(e: LaError) -> MatrixError {
    match e {
        LaError::NonFinite { .. } => MatrixError::NonFinite,
        _ => MatrixError::SingularMatrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn determinant_of_identity_and_singular() {
        let id = matrix_from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_relative_eq!(determinant(&id), 1.0, epsilon = 1e-12);

        let flat = matrix_from_rows(&[[1.0, 2.0], [2.0, 4.0]]);
        assert_relative_eq!(determinant(&flat), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn hadamard_bound_dominates_determinant() {
        let m = matrix_from_rows(&[[3.0, 1.0], [-1.0, 2.0]]);
        assert!(determinant(&m).abs() <= hadamard_bound(&m) + 1e-12);
        assert_relative_eq!(hadamard_bound(&m), 10.0_f64.sqrt() * 5.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn solve_recovers_known_solution() {
        let m = matrix_from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]]);
        assert!(solve(&m, [1.0, 1.0, 1.0]).is_err());

        let m = matrix_from_rows(&[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [-1.0, 0.0, 0.0]]);
        let x = solve(&m, [1.0, 1.0, 1.0]).unwrap();
        assert_relative_eq!(x[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn solve_handles_tiny_scales() {
        let m = matrix_from_rows(&[[1e-9, 0.0], [0.0, 1e-9]]);
        let x = solve(&m, [2e-18, 4e-18]).unwrap();
        assert_relative_eq!(x[0], 2e-9, max_relative = 1e-9);
        assert_relative_eq!(x[1], 4e-9, max_relative = 1e-9);
    }
}
