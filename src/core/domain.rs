//! Rectilinear bounding domain anchored at the origin.
//!
//! A [`Domain`] is the box `[0, L_x] × [0, L_y] (× [0, L_z])`. Axes with zero
//! extent are inactive: they are ignored by [`Domain::is_outside`] and stay at 0
//! during base point generation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a domain shape.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DomainError {
    /// The shape does not have two or three entries.
    #[error("Domain shape must have 2 or 3 entries, got {len}")]
    InvalidShapeLength {
        /// Number of entries supplied.
        len: usize,
    },
    /// An extent is negative, NaN or infinite.
    #[error("Domain extent on axis {axis} must be finite and non-negative, got {value}")]
    InvalidExtent {
        /// Offending axis.
        axis: usize,
        /// Offending value.
        value: f64,
    },
}

/// Axis-aligned box from the origin to `extents`.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::domain::Domain;
///
/// let domain = Domain::new(&[1.0, 1.0, 0.0]).unwrap();
/// assert_eq!(domain.active_axes(), 2);
/// assert!(!domain.is_outside(&[1.0, 0.0, 5.0])); // z is inactive, boundary is inside
/// assert!(domain.is_outside(&[1.5, 0.5, 0.0]));
/// assert!(domain.is_outside(&[0.5, -1e-9, 0.0]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    extents: [f64; 3],
    dim: usize,
}

impl Domain {
    /// Validates `shape` (2 or 3 finite, non-negative extents).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidShapeLength`] or [`DomainError::InvalidExtent`].
    pub fn new(shape: &[f64]) -> Result<Self, DomainError> {
        if !(2..=3).contains(&shape.len()) {
            return Err(DomainError::InvalidShapeLength { len: shape.len() });
        }
        let mut extents = [0.0; 3];
        for (axis, (&value, slot)) in shape.iter().zip(extents.iter_mut()).enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidExtent { axis, value });
            }
            *slot = value;
        }
        Ok(Self {
            extents,
            dim: shape.len(),
        })
    }

    /// Extents padded to three axes (a 2-entry shape has `z = 0`).
    #[must_use]
    pub const fn extents(&self) -> [f64; 3] {
        self.extents
    }

    /// Number of entries in the original shape (2 or 3).
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Number of axes with a positive extent.
    #[must_use]
    pub fn active_axes(&self) -> usize {
        self.extents.iter().filter(|&&e| e > 0.0).count()
    }

    /// Strict outside test on the active axes: `c > L || c < 0`.
    ///
    /// Points exactly on a face are inside.
    #[must_use]
    pub fn is_outside(&self, coords: &[f64; 3]) -> bool {
        self.extents
            .iter()
            .zip(coords)
            .any(|(&extent, &c)| extent > 0.0 && (c > extent || c < 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_validation() {
        assert_eq!(
            Domain::new(&[1.0]),
            Err(DomainError::InvalidShapeLength { len: 1 })
        );
        assert_eq!(
            Domain::new(&[1.0, 1.0, 1.0, 1.0]),
            Err(DomainError::InvalidShapeLength { len: 4 })
        );
        assert!(matches!(
            Domain::new(&[1.0, -2.0]),
            Err(DomainError::InvalidExtent { axis: 1, .. })
        ));
        assert!(matches!(
            Domain::new(&[1.0, 1.0, f64::NAN]),
            Err(DomainError::InvalidExtent { axis: 2, .. })
        ));
    }

    #[test]
    fn test_domain_two_entry_shape_is_padded() {
        let d = Domain::new(&[2.0, 3.0]).unwrap();
        assert_eq!(d.extents(), [2.0, 3.0, 0.0]);
        assert_eq!(d.dim(), 2);
        assert_eq!(d.active_axes(), 2);
    }

    #[test]
    fn test_domain_outside_is_strict() {
        let d = Domain::new(&[1.0, 1.0, 1.0]).unwrap();
        assert!(!d.is_outside(&[0.0, 0.0, 0.0]));
        assert!(!d.is_outside(&[1.0, 1.0, 1.0]));
        assert!(!d.is_outside(&[-0.0, 0.5, 1.0]));
        assert!(d.is_outside(&[1.0 + 1e-12, 0.5, 0.5]));
        assert!(d.is_outside(&[0.5, 0.5, -0.25]));
    }

    #[test]
    fn test_domain_serde_round_trip() {
        let d = Domain::new(&[1.0, 2.0, 0.0]).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        let back: Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
