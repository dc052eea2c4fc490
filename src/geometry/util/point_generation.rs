//! Random base point generation.
//!
//! Base points are drawn uniformly inside a rectilinear [`Domain`] and, optionally,
//! mirrored across every face of the box. Reflection puts a layer of points outside
//! each face, so after tessellation the Voronoi facets of the original points close up
//! along the domain boundary instead of extending to infinity.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::core::domain::Domain;
use crate::core::points::PointSet;

/// Errors from random base point generation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RandomPointGenerationError {
    /// Zero points were requested.
    #[error("Cannot generate base points: requested point count is zero")]
    NoPoints,
    /// The domain has fewer than two non-zero extents, so it spans no area.
    #[error("Cannot generate base points in a domain with {active_axes} non-zero extent(s); at least 2 are required")]
    UnsupportedDomain {
        /// Number of axes with a positive extent.
        active_axes: usize,
    },
}

/// Generates `num_points` uniformly distributed points inside `domain`.
///
/// One coordinate is drawn per domain axis; an axis with zero extent stays at 0.
/// With `reflect`, every point is also mirrored across both faces of each non-zero
/// axis (`-x` and `2L - x`), so the result holds `n * (1 + 2d)` points for `d`
/// non-zero axes. Passing a `seed` makes the output reproducible.
///
/// # Errors
///
/// - [`RandomPointGenerationError::NoPoints`] if `num_points == 0`
/// - [`RandomPointGenerationError::UnsupportedDomain`] if fewer than two axes have a
///   positive extent
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::domain::Domain;
/// use delaunay_voronoi_dual::geometry::util::generate_base_points;
///
/// let domain = Domain::new(&[1.0, 2.0]).unwrap();
/// let points = generate_base_points(10, &domain, false, Some(42)).unwrap();
/// assert_eq!(points.len(), 10);
///
/// let reflected = generate_base_points(10, &domain, true, Some(42)).unwrap();
/// assert_eq!(reflected.len(), 50);
/// ```
pub fn generate_base_points(
    num_points: usize,
    domain: &Domain,
    reflect: bool,
    seed: Option<u64>,
) -> Result<PointSet, RandomPointGenerationError> {
    if num_points == 0 {
        return Err(RandomPointGenerationError::NoPoints);
    }
    let active_axes = domain.active_axes();
    if active_axes < 2 {
        return Err(RandomPointGenerationError::UnsupportedDomain { active_axes });
    }

    let extents = domain.extents();
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let mut points: Vec<[f64; 3]> = (0..num_points)
        .map(|_| {
            extents.map(|extent| {
                if extent > 0.0 {
                    rng.random_range(0.0..extent)
                } else {
                    0.0
                }
            })
        })
        .collect();

    if reflect {
        points = reflect_points(points, &extents);
    }

    tracing::debug!(
        requested = num_points,
        generated = points.len(),
        reflect,
        "generated base points"
    );

    Ok(if domain.dim() == 2 {
        PointSet::Planar(points.into_iter().map(|[x, y, _]| [x, y]).collect())
    } else {
        PointSet::Spatial(points)
    })
}

/// Mirrors `points` across both faces of every axis with a positive extent.
///
/// Only the original points are mirrored; images are not reflected again, so there
/// are no corner images.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::geometry::util::reflect_points;
///
/// let out = reflect_points(vec![[0.25, 0.5, 0.0]], &[1.0, 1.0, 0.0]);
/// assert_eq!(out.len(), 5);
/// assert!(out.contains(&[-0.25, 0.5, 0.0]));
/// assert!(out.contains(&[1.75, 0.5, 0.0]));
/// assert!(out.contains(&[0.25, -0.5, 0.0]));
/// assert!(out.contains(&[0.25, 1.5, 0.0]));
/// ```
#[must_use]
pub fn reflect_points(mut points: Vec<[f64; 3]>, extents: &[f64; 3]) -> Vec<[f64; 3]> {
    let n = points.len();
    let active = extents.iter().filter(|&&e| e > 0.0).count();
    points.reserve(2 * active * n);
    for (axis, &extent) in extents.iter().enumerate() {
        if extent <= 0.0 {
            continue;
        }
        for i in 0..n {
            let mut low = points[i];
            low[axis] = -low[axis];
            let mut high = points[i];
            high[axis] = 2.0f64.mul_add(extent, -high[axis]);
            points.push(low);
            points.push(high);
        }
    }
    points
}
