//! Geometric predicates for 2D and 3D simplices.
//!
//! This module contains the orientation test, the circumsphere computation and the
//! circumsphere containment test used by Bowyer-Watson insertion. All tolerances are
//! relative, so the predicates behave the same for a unit cube and for a domain a few
//! micrometres across.

use thiserror::Error;

use crate::geometry::matrix::{
    MatrixError, SINGULARITY_TOLERANCE, determinant, hadamard_bound, matrix_from_rows, solve,
};
use crate::geometry::point::Point;

/// Relative tolerance on `|p - c|² - r²` used by [`Circumsphere::classify`].
pub const INSPHERE_TOLERANCE: f64 = 1e-12;

/// Represents the position of a point relative to a circumsphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InSphere {
    /// The point is outside the circumsphere
    OUTSIDE,
    /// The point is on the boundary of the circumsphere (within numerical tolerance)
    BOUNDARY,
    /// The point is inside the circumsphere
    INSIDE,
}

impl std::fmt::Display for InSphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The simplex has negative orientation (determinant < 0)
    NEGATIVE,
    /// The simplex is degenerate (determinant ≈ 0)
    DEGENERATE,
    /// The simplex has positive orientation (determinant > 0)
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

impl Orientation {
    /// Returns `true` for strictly opposite, non-degenerate orientations.
    #[must_use]
    pub const fn is_opposite(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::POSITIVE, Self::NEGATIVE) | (Self::NEGATIVE, Self::POSITIVE)
        )
    }
}

/// Errors from simplex predicates.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum PredicateError {
    /// Wrong number of points for a D-simplex.
    #[error("Invalid simplex: expected {expected} points, got {actual} (dimension {dimension})")]
    InvalidSimplex {
        /// Number of points supplied.
        actual: usize,
        /// Number of points required (D + 1).
        expected: usize,
        /// Ambient dimension.
        dimension: usize,
    },
    /// The simplex has (numerically) zero volume, so its circumsphere is undefined.
    #[error("Degenerate simplex: points are affinely dependent")]
    DegenerateSimplex,
    /// The circumcenter linear system could not be solved.
    #[error("Circumcenter solve failed: {source}")]
    MatrixSolveFailed {
        /// Underlying matrix error.
        #[from]
        source: MatrixError,
    },
}

fn edge_rows<const D: usize>(points: &[Point<D>]) -> Result<[[f64; D]; D], PredicateError> {
    if points.len() != D + 1 {
        return Err(PredicateError::InvalidSimplex {
            actual: points.len(),
            expected: D + 1,
            dimension: D,
        });
    }
    let p0 = points[0];
    let mut rows = [[0.0; D]; D];
    for (row, p) in rows.iter_mut().zip(&points[1..]) {
        *row = *p - p0;
    }
    Ok(rows)
}

/// Determine the orientation of a simplex from the determinant of its edge vectors.
///
/// The matrix rows are `p_i - p_0` for `i = 1..=D`. The determinant is compared
/// against [`SINGULARITY_TOLERANCE`] times the product of the row norms, so the
/// result does not depend on the absolute scale of the coordinates.
///
/// # Errors
///
/// Returns [`PredicateError::InvalidSimplex`] unless exactly `D + 1` points are given.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::geometry::{Orientation, Point, simplex_orientation};
///
/// let ccw = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([0.0, 1.0])];
/// assert_eq!(simplex_orientation(&ccw).unwrap(), Orientation::POSITIVE);
///
/// let cw = [ccw[0], ccw[2], ccw[1]];
/// assert_eq!(simplex_orientation(&cw).unwrap(), Orientation::NEGATIVE);
///
/// let flat = [Point::new([0.0, 0.0]), Point::new([1.0, 1.0]), Point::new([2.0, 2.0])];
/// assert_eq!(simplex_orientation(&flat).unwrap(), Orientation::DEGENERATE);
/// ```
pub fn simplex_orientation<const D: usize>(
    points: &[Point<D>],
) -> Result<Orientation, PredicateError> {
    let matrix = matrix_from_rows(&edge_rows(points)?);
    let det = determinant(&matrix);
    let tolerance = SINGULARITY_TOLERANCE * hadamard_bound(&matrix);

    if !det.is_finite() || det.abs() <= tolerance {
        Ok(Orientation::DEGENERATE)
    } else if det > 0.0 {
        Ok(Orientation::POSITIVE)
    } else {
        Ok(Orientation::NEGATIVE)
    }
}

/// Circumscribed sphere of a non-degenerate simplex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circumsphere<const D: usize> {
    center: Point<D>,
    radius_squared: f64,
}

impl<const D: usize> Circumsphere<D> {
    /// Computes the circumsphere of `points` (exactly `D + 1` of them).
    ///
    /// The center solves `A x = b` with rows `A_i = p_i - p_0` and
    /// `b_i = |p_i - p_0|²`; then `c = p_0 + x / 2`.
    ///
    /// # Errors
    ///
    /// - [`PredicateError::InvalidSimplex`] for the wrong number of points
    /// - [`PredicateError::DegenerateSimplex`] if the points are affinely dependent
    /// - [`PredicateError::MatrixSolveFailed`] if the linear solve breaks down
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_voronoi_dual::geometry::{Circumsphere, Point};
    ///
    /// let tri = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([0.0, 1.0])];
    /// let sphere = Circumsphere::new(&tri).unwrap();
    /// assert_eq!(sphere.center().coords(), &[0.5, 0.5]);
    /// assert!((sphere.radius_squared() - 0.5).abs() < 1e-12);
    /// ```
    pub fn new(points: &[Point<D>]) -> Result<Self, PredicateError> {
        let rows = edge_rows(points)?;
        let matrix = matrix_from_rows(&rows);
        let det = determinant(&matrix);
        if !det.is_finite() || det.abs() <= SINGULARITY_TOLERANCE * hadamard_bound(&matrix) {
            return Err(PredicateError::DegenerateSimplex);
        }

        let mut b = [0.0; D];
        for (slot, row) in b.iter_mut().zip(&rows) {
            *slot = row.iter().map(|v| v * v).sum();
        }
        let x = solve(&matrix, b)?;

        let p0 = points[0];
        let center = p0.map(|axis, c| 0.5f64.mul_add(x[axis], c));
        Ok(Self {
            center,
            radius_squared: center.squared_distance(&p0),
        })
    }

    /// The circumcenter.
    #[must_use]
    pub const fn center(&self) -> Point<D> {
        self.center
    }

    /// The squared circumradius.
    #[must_use]
    pub const fn radius_squared(&self) -> f64 {
        self.radius_squared
    }

    /// Classifies `p` against the sphere with a tolerance relative to `r²`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_voronoi_dual::geometry::{Circumsphere, InSphere, Point};
    ///
    /// let tri = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([0.0, 1.0])];
    /// let sphere = Circumsphere::new(&tri).unwrap();
    /// assert_eq!(sphere.classify(&Point::new([0.5, 0.5])), InSphere::INSIDE);
    /// assert_eq!(sphere.classify(&Point::new([1.0, 1.0])), InSphere::BOUNDARY);
    /// assert_eq!(sphere.classify(&Point::new([2.0, 2.0])), InSphere::OUTSIDE);
    /// ```
    #[must_use]
    pub fn classify(&self, p: &Point<D>) -> InSphere {
        let diff = p.squared_distance(&self.center) - self.radius_squared;
        let tolerance = INSPHERE_TOLERANCE * self.radius_squared;
        if diff < -tolerance {
            InSphere::INSIDE
        } else if diff > tolerance {
            InSphere::OUTSIDE
        } else {
            InSphere::BOUNDARY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_display_impls() {
        assert_eq!(format!("{}", InSphere::BOUNDARY), "BOUNDARY");
        assert_eq!(format!("{}", Orientation::NEGATIVE), "NEGATIVE");
        assert!(Orientation::POSITIVE.is_opposite(Orientation::NEGATIVE));
        assert!(!Orientation::POSITIVE.is_opposite(Orientation::DEGENERATE));
        assert!(!Orientation::DEGENERATE.is_opposite(Orientation::DEGENERATE));
    }

    #[test]
    fn test_orientation_3d_and_invalid_simplex() {
        let tet = [
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([0.0, 0.0, 1.0]),
        ];
        assert_eq!(simplex_orientation(&tet).unwrap(), Orientation::POSITIVE);

        let swapped = [tet[0], tet[2], tet[1], tet[3]];
        assert_eq!(simplex_orientation(&swapped).unwrap(), Orientation::NEGATIVE);

        let coplanar = [tet[0], tet[1], tet[2], Point::new([1.0, 1.0, 0.0])];
        assert_eq!(simplex_orientation(&coplanar).unwrap(), Orientation::DEGENERATE);

        assert_eq!(
            simplex_orientation(&tet[..3]),
            Err(PredicateError::InvalidSimplex {
                actual: 3,
                expected: 4,
                dimension: 3
            })
        );
    }

    #[test]
    fn test_orientation_is_scale_invariant() {
        for scale in [1e-6, 1.0, 1e6] {
            let tri = [
                Point::new([0.0, 0.0]),
                Point::new([scale, 0.0]),
                Point::new([0.0, scale]),
            ];
            assert_eq!(simplex_orientation(&tri).unwrap(), Orientation::POSITIVE);
        }
    }

    #[test]
    fn test_circumsphere_3d_unit_tetrahedron() {
        let tet = [
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([0.0, 0.0, 1.0]),
        ];
        let sphere = Circumsphere::new(&tet).unwrap();
        for (c, expected) in sphere.center().coords().iter().zip([0.5, 0.5, 0.5]) {
            assert_relative_eq!(*c, expected, epsilon = 1e-12);
        }
        assert_relative_eq!(sphere.radius_squared(), 0.75, epsilon = 1e-12);

        for vertex in &tet {
            assert_eq!(sphere.classify(vertex), InSphere::BOUNDARY);
        }
    }

    #[test]
    fn test_circumsphere_rejects_degenerate_simplex() {
        let flat = [
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([2.0, 0.0]),
        ];
        assert_eq!(
            Circumsphere::new(&flat),
            Err(PredicateError::DegenerateSimplex)
        );
    }

    #[test]
    fn test_circumsphere_tiny_scale() {
        let s = 1e-7;
        let tri = [
            Point::new([0.0, 0.0]),
            Point::new([s, 0.0]),
            Point::new([0.0, s]),
        ];
        let sphere = Circumsphere::new(&tri).unwrap();
        assert_relative_eq!(sphere.center()[0], s / 2.0, max_relative = 1e-9);
        assert_relative_eq!(sphere.radius_squared(), s * s / 2.0, max_relative = 1e-9);
        assert_eq!(
            sphere.classify(&Point::new([s / 2.0, s / 2.0])),
            InSphere::INSIDE
        );
    }
}
