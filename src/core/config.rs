//! Construction parameters for [`DelaunayVoronoiDual`].
//!
//! [`DualConfig`] is built with the `derive_builder`-generated
//! [`DualConfigBuilder`]; `build()` validates the parameters and
//! [`DualConfigBuilder::build_network`] goes straight to a network.

use serde::{Deserialize, Serialize};

use crate::core::domain::Domain;
use crate::core::dual::{DelaunayVoronoiDual, DualNetworkError};
use crate::core::points::PointSet;

fn default_shape() -> Vec<f64> {
    vec![1.0, 1.0, 1.0]
}

/// Parameters of a Delaunay-Voronoi dual network.
///
/// Explicit `points` take precedence over `num_points`. `seed` only affects
/// generated points.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::config::DualConfigBuilder;
///
/// let config = DualConfigBuilder::default()
///     .shape([2.0, 1.0, 0.0])
///     .num_points(25)
///     .seed(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.num_points, Some(25));
/// assert!(config.points.is_none());
///
/// // Neither points nor a count.
/// assert!(DualConfigBuilder::default().build().is_err());
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DualConfig {
    /// Box extents; 2 or 3 entries, a zero third extent means a planar domain.
    #[builder(setter(into), default = "default_shape()")]
    #[serde(default = "default_shape")]
    pub shape: Vec<f64>,
    /// Explicit base points.
    #[builder(setter(into, strip_option), default)]
    pub points: Option<PointSet>,
    /// Number of base points to generate inside the domain.
    #[builder(setter(strip_option), default)]
    pub num_points: Option<usize>,
    /// Seed for point generation.
    #[builder(setter(strip_option), default)]
    pub seed: Option<u64>,
}

impl DualConfig {
    /// Checks the shape and that some source of points is present.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        check(&self.shape, self.points.is_some() || self.num_points.is_some())
    }

    /// The domain described by `shape`.
    ///
    /// # Errors
    ///
    /// Returns a [`DualNetworkError::Domain`] for an invalid shape.
    pub fn domain(&self) -> Result<Domain, DualNetworkError> {
        Ok(Domain::new(&self.shape)?)
    }
}

impl DualConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let has_points = matches!(self.points, Some(Some(_))) || matches!(self.num_points, Some(Some(_)));
        match &self.shape {
            Some(shape) => check(shape, has_points),
            None => check(&default_shape(), has_points),
        }
    }

    /// Builds the configuration and then the network.
    ///
    /// # Errors
    ///
    /// Returns [`DualNetworkError::Config`] for invalid parameters, or any error
    /// raised by [`DelaunayVoronoiDual::new`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_voronoi_dual::core::dual::DelaunayVoronoiDual;
    ///
    /// let dual = DelaunayVoronoiDual::builder()
    ///     .shape([1.0, 1.0, 0.0])
    ///     .num_points(20)
    ///     .seed(11)
    ///     .build_network()
    ///     .unwrap();
    /// assert!(dual.network().num_pores() > 20);
    /// ```
    pub fn build_network(&self) -> Result<DelaunayVoronoiDual, DualNetworkError> {
        let config = self.build()?;
        DelaunayVoronoiDual::new(&config)
    }
}

fn check(shape: &[f64], has_points: bool) -> Result<(), String> {
    Domain::new(shape).map_err(|e| e.to_string())?;
    if !has_points {
        return Err("Either points or num_points must be specified".to_owned());
    }
    Ok(())
}
