//! Canonical throat identifiers and throat categories.
//!
//! A throat is an undirected pair of pore indices. [`EdgeKey`]:
//!
//! - canonicalizes endpoint ordering so `(a, b)` and `(b, a)` map to the same throat
//! - is `Copy`/`Hash`/`Ord`, so sorting a list of keys groups duplicates together
//!
//! Ordering is lexicographic on `(v0, v1)` and therefore deterministic.
//!
//! [`EdgeCategory`] is never stored on its own: it is a function of the two endpoint
//! indices and the size of the Delaunay block.

use serde::{Deserialize, Serialize};

/// Canonical identifier for an (undirected) throat between two pores.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::edge::EdgeKey;
///
/// let edge = EdgeKey::new(7, 3);
/// assert_eq!(edge.endpoints(), (3, 7));
/// assert_eq!(edge, EdgeKey::from((3, 7)));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    v0: usize,
    v1: usize,
}

impl EdgeKey {
    /// Creates a new canonical edge key with `v0 <= v1`.
    #[inline]
    #[must_use]
    pub const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// Returns the smaller endpoint.
    #[inline]
    #[must_use]
    pub const fn v0(self) -> usize {
        self.v0
    }

    /// Returns the larger endpoint.
    #[inline]
    #[must_use]
    pub const fn v1(self) -> usize {
        self.v1
    }

    /// Returns the two endpoints as a tuple.
    #[inline]
    #[must_use]
    pub const fn endpoints(self) -> (usize, usize) {
        (self.v0, self.v1)
    }

    /// Both endpoints are the same pore.
    #[inline]
    #[must_use]
    pub const fn is_self_loop(self) -> bool {
        self.v0 == self.v1
    }

    /// The endpoint opposite `pore`, or `None` if `pore` is not an endpoint.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_voronoi_dual::core::edge::EdgeKey;
    ///
    /// let edge = EdgeKey::new(1, 4);
    /// assert_eq!(edge.other(4), Some(1));
    /// assert_eq!(edge.other(2), None);
    /// ```
    #[must_use]
    pub const fn other(self, pore: usize) -> Option<usize> {
        if pore == self.v0 {
            Some(self.v1)
        } else if pore == self.v1 {
            Some(self.v0)
        } else {
            None
        }
    }

    /// Returns `true` if `pore` is one of the endpoints.
    #[inline]
    #[must_use]
    pub const fn contains(self, pore: usize) -> bool {
        self.v0 == pore || self.v1 == pore
    }
}

impl From<(usize, usize)> for EdgeKey {
    #[inline]
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

/// Which sub-network a throat belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeCategory {
    /// Both endpoints are Delaunay pores.
    Delaunay,
    /// Both endpoints are Voronoi pores.
    Voronoi,
    /// One Delaunay and one Voronoi endpoint.
    Interconnect,
}

impl EdgeCategory {
    /// Category from the "is Delaunay" flags of the two endpoints.
    #[must_use]
    pub const fn from_endpoint_classes(a_is_delaunay: bool, b_is_delaunay: bool) -> Self {
        match (a_is_delaunay, b_is_delaunay) {
            (true, true) => Self::Delaunay,
            (false, false) => Self::Voronoi,
            _ => Self::Interconnect,
        }
    }

    /// Category of `edge` in a freshly fused graph where pores `0..n_delaunay`
    /// are Delaunay and the rest are Voronoi.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_voronoi_dual::core::edge::{EdgeCategory, EdgeKey};
    ///
    /// assert_eq!(EdgeCategory::classify(EdgeKey::new(0, 4), 5), EdgeCategory::Delaunay);
    /// assert_eq!(EdgeCategory::classify(EdgeKey::new(4, 5), 5), EdgeCategory::Interconnect);
    /// assert_eq!(EdgeCategory::classify(EdgeKey::new(5, 8), 5), EdgeCategory::Voronoi);
    /// ```
    #[must_use]
    pub const fn classify(edge: EdgeKey, n_delaunay: usize) -> Self {
        Self::from_endpoint_classes(edge.v0 < n_delaunay, edge.v1 < n_delaunay)
    }
}

impl std::fmt::Display for EdgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delaunay => write!(f, "delaunay"),
            Self::Voronoi => write!(f, "voronoi"),
            Self::Interconnect => write!(f, "interconnect"),
        }
    }
}
