//! Fusion of a tessellation into one combined Delaunay + Voronoi graph.
//!
//! Pores `0..n_delaunay` are the Delaunay points, pores `n_delaunay..` the
//! Voronoi vertices. Every ridge contributes its Delaunay edge, the interconnect
//! edges from both generators to each finite ridge vertex, and the closed cycle
//! over the finite ridge vertices.

use crate::core::adjacency::{AdjacencyBuilder, AdjacencyError};
use crate::core::edge::{EdgeCategory, EdgeKey};
use crate::core::tessellation::Tessellation;
use crate::geometry::util::round_coords;

/// The combined graph produced by [`fuse`].
#[derive(Clone, Debug, PartialEq)]
pub struct FusedGraph {
    /// Delaunay points followed by Voronoi vertices, rounded.
    pub coords: Vec<[f64; 3]>,
    /// Sorted, deduplicated throats.
    pub conns: Vec<EdgeKey>,
    /// Number of Delaunay pores at the front of `coords`.
    pub n_delaunay: usize,
}

impl FusedGraph {
    /// Number of pores.
    #[must_use]
    pub fn num_pores(&self) -> usize {
        self.coords.len()
    }

    /// Category of throat `t`.
    #[must_use]
    pub fn category(&self, t: usize) -> Option<EdgeCategory> {
        self.conns
            .get(t)
            .map(|&edge| EdgeCategory::classify(edge, self.n_delaunay))
    }

    /// Throat counts per category: `(delaunay, voronoi, interconnect)`.
    #[must_use]
    pub fn category_counts(&self) -> (usize, usize, usize) {
        self.conns.iter().fold((0, 0, 0), |(d, v, i), &edge| {
            match EdgeCategory::classify(edge, self.n_delaunay) {
                EdgeCategory::Delaunay => (d + 1, v, i),
                EdgeCategory::Voronoi => (d, v + 1, i),
                EdgeCategory::Interconnect => (d, v, i + 1),
            }
        })
    }
}

/// Builds the fused graph of `tess`.
///
/// # Errors
///
/// Returns an [`AdjacencyError`] if a ridge references a vertex outside the
/// tessellation.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::fusion::fuse;
/// use delaunay_voronoi_dual::core::points::PointSet;
/// use delaunay_voronoi_dual::core::tessellation::tessellate;
///
/// let tess = tessellate(&PointSet::from(vec![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]])).unwrap();
/// let graph = fuse(&tess).unwrap();
/// assert_eq!(graph.n_delaunay, 3);
/// assert_eq!(graph.num_pores(), 4);
/// // Three triangle edges and three spokes to the circumcenter.
/// assert_eq!(graph.category_counts(), (3, 0, 3));
/// ```
pub fn fuse(tess: &Tessellation) -> Result<FusedGraph, AdjacencyError> {
    let n_delaunay = tess.npoints();
    let coords: Vec<[f64; 3]> = tess
        .points()
        .iter()
        .chain(tess.vertices())
        .map(|&c| round_coords(c))
        .collect();

    let mut builder = AdjacencyBuilder::with_capacity(coords.len(), tess.ridges().len() * 8);
    for (&(a, b), ridge) in tess.ridges() {
        builder.push(a, b)?;

        let mut cycle: Vec<usize> = Vec::with_capacity(ridge.len());
        for v in ridge.iter().filter_map(|v| v.finite()) {
            let pore = n_delaunay + v;
            builder.push(a, pore)?;
            builder.push(b, pore)?;
            if cycle.last() != Some(&pore) {
                cycle.push(pore);
            }
        }
        // Removing the infinite sentinel can bring the ends together.
        while cycle.len() > 1 && cycle.first() == cycle.last() {
            cycle.pop();
        }
        if cycle.len() >= 2 {
            for (i, &u) in cycle.iter().enumerate() {
                let w = cycle[(i + 1) % cycle.len()];
                if u != w {
                    builder.push(u, w)?;
                }
            }
        }
    }

    let pushed = builder.len();
    let conns = builder.finish();
    tracing::debug!(
        pores = coords.len(),
        n_delaunay,
        pushed,
        throats = conns.len(),
        "fused Delaunay and Voronoi graphs"
    );
    Ok(FusedGraph {
        coords,
        conns,
        n_delaunay,
    })
}
