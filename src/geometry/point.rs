//! Fixed-dimension points used by the tessellation.
//!
//! The tessellation works on `f64` coordinates in two or three dimensions. Network
//! coordinates are always stored as `[f64; 3]` (planar inputs get `z = 0`), so
//! [`Point::to_padded`] is the bridge between the two representations.

use std::ops::{Index, Sub};

/// A point in D-dimensional Euclidean space.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::geometry::Point;
///
/// let a = Point::new([0.0, 0.0]);
/// let b = Point::new([3.0, 4.0]);
/// assert_eq!(a.squared_distance(&b), 25.0);
/// assert_eq!(b.to_padded(), [3.0, 4.0, 0.0]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<const D: usize> {
    coords: [f64; D],
}

impl<const D: usize> Point<D> {
    /// Creates a point from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [f64; D]) -> Self {
        Self { coords }
    }

    /// The origin.
    #[inline]
    #[must_use]
    pub const fn origin() -> Self {
        Self { coords: [0.0; D] }
    }

    /// Borrow the raw coordinate array.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; D] {
        &self.coords
    }

    /// Returns `true` if every coordinate is finite (no NaN, no infinity).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn squared_distance(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Squared Euclidean norm of the coordinate vector.
    #[must_use]
    pub fn squared_norm(&self) -> f64 {
        self.coords.iter().map(|c| c * c).sum()
    }

    /// Applies `f` to every coordinate.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(usize, f64) -> f64) -> Self {
        let mut coords = self.coords;
        for (axis, c) in coords.iter_mut().enumerate() {
            *c = f(axis, *c);
        }
        Self { coords }
    }

    /// Pads the coordinates to three components, filling missing axes with zero.
    ///
    /// Components beyond the third are dropped; this crate only builds 2D and 3D
    /// tessellations.
    #[must_use]
    pub fn to_padded(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (slot, c) in out.iter_mut().zip(&self.coords) {
            *slot = *c;
        }
        out
    }
}

impl<const D: usize> Default for Point<D> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<const D: usize> From<[f64; D]> for Point<D> {
    fn from(coords: [f64; D]) -> Self {
        Self::new(coords)
    }
}

impl<const D: usize> From<Point<D>> for [f64; D] {
    fn from(point: Point<D>) -> Self {
        point.coords
    }
}

impl<const D: usize> Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, axis: usize) -> &Self::Output {
        &self.coords[axis]
    }
}

/// Vector difference `self - rhs` as a raw coordinate array.
impl<const D: usize> Sub for Point<D> {
    type Output = [f64; D];

    fn sub(self, rhs: Self) -> Self::Output {
        let mut out = self.coords;
        for (o, r) in out.iter_mut().zip(&rhs.coords) {
            *o -= r;
        }
        out
    }
}
