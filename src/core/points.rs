//! Point preparation: validation, dimensionality reduction and base point
//! generation dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::domain::Domain;
use crate::geometry::util::{RandomPointGenerationError, generate_base_points};

/// Errors raised while preparing the point cloud.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum PointPreparationError {
    /// Neither explicit points nor a point count were supplied.
    #[error("Either points or num_points must be specified")]
    MissingPoints,
    /// The explicit point list is empty.
    #[error("Point set is empty")]
    EmptyPointSet,
    /// A point has a NaN or infinite coordinate.
    #[error("Point {index} has a non-finite coordinate")]
    InvalidPoint {
        /// Row index of the offending point.
        index: usize,
    },
    /// Rows are ragged or not 2-D/3-D.
    #[error("Point rows must all have 2 or 3 coordinates; row {index} has {len}")]
    UnsupportedDimension {
        /// Row index of the offending point.
        index: usize,
        /// Number of coordinates in that row.
        len: usize,
    },
    /// Base point generation failed.
    #[error(transparent)]
    Generation(#[from] RandomPointGenerationError),
}

/// A 2-D or 3-D point cloud.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::points::PointSet;
///
/// let flat = PointSet::from(vec![[0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]]);
/// assert_eq!(flat.dim(), 3);
/// let reduced = flat.reduce_dimension();
/// assert_eq!(reduced.dim(), 2);
/// assert_eq!(reduced.rows_padded()[1], [1.0, 0.0, 0.0]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointSet {
    /// Two-dimensional points.
    Planar(Vec<[f64; 2]>),
    /// Three-dimensional points.
    Spatial(Vec<[f64; 3]>),
}

impl PointSet {
    /// Builds a point set from dynamic rows (all of width 2 or all of width 3).
    ///
    /// # Errors
    ///
    /// Returns [`PointPreparationError::UnsupportedDimension`] for ragged rows or
    /// widths other than 2 and 3, and [`PointPreparationError::EmptyPointSet`] for
    /// an empty input.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, PointPreparationError> {
        let Some(first) = rows.first() else {
            return Err(PointPreparationError::EmptyPointSet);
        };
        let width = first.len();
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width || !(2..=3).contains(&row.len()))
        {
            return Err(PointPreparationError::UnsupportedDimension {
                index,
                len: row.len(),
            });
        }
        Ok(if width == 2 {
            Self::Planar(rows.iter().map(|r| [r[0], r[1]]).collect())
        } else {
            Self::Spatial(rows.iter().map(|r| [r[0], r[1], r[2]]).collect())
        })
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Planar(p) => p.len(),
            Self::Spatial(p) => p.len(),
        }
    }

    /// Returns `true` if the set has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spatial dimension (2 or 3).
    #[must_use]
    pub const fn dim(&self) -> usize {
        match self {
            Self::Planar(_) => 2,
            Self::Spatial(_) => 3,
        }
    }

    /// Coordinates as `[f64; 3]` rows, zero-padded for planar sets.
    #[must_use]
    pub fn rows_padded(&self) -> Vec<[f64; 3]> {
        match self {
            Self::Planar(p) => p.iter().map(|&[x, y]| [x, y, 0.0]).collect(),
            Self::Spatial(p) => p.clone(),
        }
    }

    /// An axis on which every point of a spatial set has the same coordinate.
    ///
    /// The third axis is preferred, then the second, then the first. Planar and
    /// empty sets have none.
    #[must_use]
    pub fn constant_axis(&self) -> Option<usize> {
        let Self::Spatial(p) = self else {
            return None;
        };
        let first = p.first()?;
        (0..3).rev().find(|&axis| p.iter().all(|q| q[axis] == first[axis]))
    }

    /// Collapses a spatial set with a constant axis to a planar one.
    ///
    /// The remaining two coordinates keep their order.
    #[must_use]
    pub fn reduce_dimension(self) -> Self {
        self.reduce_dimension_tracked().0
    }

    /// Like [`Self::reduce_dimension`], also returning the dropped axis.
    pub(crate) fn reduce_dimension_tracked(self) -> (Self, Option<usize>) {
        match (self.constant_axis(), self) {
            (Some(axis), Self::Spatial(p)) => (
                Self::Planar(p.into_iter().map(|q| drop_axis(q, axis)).collect()),
                Some(axis),
            ),
            (_, other) => (other, None),
        }
    }

    /// Index of the first point with a non-finite coordinate.
    fn first_non_finite(&self) -> Option<usize> {
        match self {
            Self::Planar(p) => p.iter().position(|q| q.iter().any(|c| !c.is_finite())),
            Self::Spatial(p) => p.iter().position(|q| q.iter().any(|c| !c.is_finite())),
        }
    }
}

fn drop_axis(q: [f64; 3], axis: usize) -> [f64; 2] {
    match axis {
        0 => [q[1], q[2]],
        1 => [q[0], q[2]],
        _ => [q[0], q[1]],
    }
}

/// Re-expands a zero-padded planar row, putting the zero on `axis`.
pub(crate) const fn restore_axis(c: [f64; 3], axis: usize) -> [f64; 3] {
    match axis {
        0 => [0.0, c[0], c[1]],
        1 => [c[0], 0.0, c[1]],
        _ => c,
    }
}

impl From<Vec<[f64; 2]>> for PointSet {
    fn from(points: Vec<[f64; 2]>) -> Self {
        Self::Planar(points)
    }
}

impl From<Vec<[f64; 3]>> for PointSet {
    fn from(points: Vec<[f64; 3]>) -> Self {
        Self::Spatial(points)
    }
}

/// Produces the point cloud to tessellate.
///
/// Explicit `points` take precedence over `num_points`. With only a count, base
/// points are generated inside `domain` and reflected across its faces. A
/// constant axis is dropped either way (see [`PointSet::reduce_dimension`]).
///
/// # Errors
///
/// - [`PointPreparationError::MissingPoints`] if both inputs are `None`
/// - [`PointPreparationError::EmptyPointSet`] / [`PointPreparationError::InvalidPoint`]
///   for unusable explicit points
/// - [`PointPreparationError::Generation`] if base point generation fails
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::domain::Domain;
/// use delaunay_voronoi_dual::core::points::{PointPreparationError, prepare_points};
///
/// let domain = Domain::new(&[1.0, 1.0, 0.0]).unwrap();
/// assert_eq!(
///     prepare_points(&domain, None, None, None),
///     Err(PointPreparationError::MissingPoints)
/// );
///
/// let generated = prepare_points(&domain, None, Some(10), Some(1)).unwrap();
/// assert_eq!(generated.dim(), 2);
/// assert_eq!(generated.len(), 50);
/// ```
pub fn prepare_points(
    domain: &Domain,
    points: Option<PointSet>,
    num_points: Option<usize>,
    seed: Option<u64>,
) -> Result<PointSet, PointPreparationError> {
    prepare_points_tracked(domain, points, num_points, seed).map(|(points, _)| points)
}

/// [`prepare_points`], also returning the axis dropped by dimension reduction.
pub(crate) fn prepare_points_tracked(
    domain: &Domain,
    points: Option<PointSet>,
    num_points: Option<usize>,
    seed: Option<u64>,
) -> Result<(PointSet, Option<usize>), PointPreparationError> {
    let prepared = match (points, num_points) {
        (Some(points), count) => {
            if count.is_some() {
                tracing::debug!("explicit points supplied; ignoring num_points");
            }
            if points.is_empty() {
                return Err(PointPreparationError::EmptyPointSet);
            }
            if let Some(index) = points.first_non_finite() {
                return Err(PointPreparationError::InvalidPoint { index });
            }
            points
        }
        (None, Some(count)) => generate_base_points(count, domain, true, seed)?,
        (None, None) => return Err(PointPreparationError::MissingPoints),
    };

    let (prepared, dropped) = prepared.reduce_dimension_tracked();
    if let Some(axis) = dropped {
        tracing::debug!(axis, "constant coordinate axis; tessellating in 2-D");
    }
    tracing::debug!(points = prepared.len(), dim = prepared.dim(), "points prepared");
    Ok((prepared, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Domain {
        Domain::new(&[1.0, 1.0, 0.0]).unwrap()
    }

    #[test]
    fn test_from_rows_accepts_2d_and_3d() {
        let planar = PointSet::from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert_eq!(planar, PointSet::Planar(vec![[0.0, 1.0], [2.0, 3.0]]));

        let spatial = PointSet::from_rows(&[vec![0.0, 1.0, 2.0]]).unwrap();
        assert_eq!(spatial.dim(), 3);
        assert_eq!(spatial.len(), 1);
    }

    #[test]
    fn test_from_rows_rejects_ragged_and_unsupported() {
        assert_eq!(
            PointSet::from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0, 4.0]]),
            Err(PointPreparationError::UnsupportedDimension { index: 1, len: 3 })
        );
        assert_eq!(
            PointSet::from_rows(&[vec![0.0, 1.0, 2.0, 3.0]]),
            Err(PointPreparationError::UnsupportedDimension { index: 0, len: 4 })
        );
        assert_eq!(
            PointSet::from_rows(&[]),
            Err(PointPreparationError::EmptyPointSet)
        );
    }

    #[test]
    fn test_reduce_dimension_collapses_any_constant_axis() {
        let varying = PointSet::Spatial(vec![[0.0, 0.0, 0.0], [1.0, 0.5, 0.1], [0.2, 0.7, 0.9]]);
        assert_eq!(varying.constant_axis(), None);
        assert_eq!(varying.clone().reduce_dimension(), varying);

        let flat_y = PointSet::Spatial(vec![[0.1, 0.0, 0.2], [0.9, 0.0, 0.3], [0.5, 0.0, 0.8]]);
        assert_eq!(flat_y.constant_axis(), Some(1));
        assert_eq!(
            flat_y.reduce_dimension_tracked(),
            (
                PointSet::Planar(vec![[0.1, 0.2], [0.9, 0.3], [0.5, 0.8]]),
                Some(1)
            )
        );

        let flat_x = PointSet::Spatial(vec![[3.0, 0.1, 0.2], [3.0, 0.4, 0.6]]);
        assert_eq!(
            flat_x.reduce_dimension(),
            PointSet::Planar(vec![[0.1, 0.2], [0.4, 0.6]])
        );

        let planar = PointSet::Planar(vec![[0.0, 0.0]]);
        assert_eq!(planar.clone().reduce_dimension_tracked(), (planar, None));
    }

    #[test]
    fn test_restore_axis_inverts_drop_axis() {
        let q = [0.25, 0.5, 0.75];
        for axis in 0..3 {
            let [a, b] = drop_axis(q, axis);
            let mut expected = q;
            expected[axis] = 0.0;
            assert_eq!(restore_axis([a, b, 0.0], axis), expected);
        }
    }

    #[test]
    fn test_prepare_points_flattens_generated_cloud_with_inactive_y() {
        let slab = Domain::new(&[1.0, 0.0, 1.0]).unwrap();
        let (prepared, dropped) = prepare_points_tracked(&slab, None, Some(6), Some(2)).unwrap();
        assert_eq!(dropped, Some(1));
        assert_eq!(prepared.dim(), 2);
        assert_eq!(prepared.len(), 6 * 5);
    }

    #[test]
    fn test_prepare_points_prefers_explicit_points() {
        let explicit = PointSet::Planar(vec![[0.1, 0.1], [0.9, 0.1], [0.5, 0.9]]);
        let prepared =
            prepare_points(&unit_square(), Some(explicit.clone()), Some(100), None).unwrap();
        assert_eq!(prepared, explicit);
    }

    #[test]
    fn test_prepare_points_rejects_invalid_points() {
        assert_eq!(
            prepare_points(&unit_square(), Some(PointSet::Planar(vec![])), None, None),
            Err(PointPreparationError::EmptyPointSet)
        );
        assert_eq!(
            prepare_points(
                &unit_square(),
                Some(PointSet::Spatial(vec![[0.0, 0.0, 0.0], [f64::NAN, 0.0, 0.0]])),
                None,
                None
            ),
            Err(PointPreparationError::InvalidPoint { index: 1 })
        );
    }

    #[test]
    fn test_prepare_points_generation_errors_propagate() {
        assert_eq!(
            prepare_points(&unit_square(), None, Some(0), None),
            Err(PointPreparationError::Generation(
                RandomPointGenerationError::NoPoints
            ))
        );
    }

    #[test]
    fn test_prepare_points_generates_reflected_3d_cloud() {
        let cube = Domain::new(&[1.0, 1.0, 1.0]).unwrap();
        let prepared = prepare_points(&cube, None, Some(8), Some(5)).unwrap();
        assert_eq!(prepared.dim(), 3);
        assert_eq!(prepared.len(), 8 * 7);
    }
}
