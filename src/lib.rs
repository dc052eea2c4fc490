//! # delaunay-voronoi-dual
//!
//! This library builds a *dual* pore network: a Delaunay triangulation of a point
//! cloud interleaved with its dual Voronoi diagram, fused into a single graph. The
//! Delaunay nodes and the Voronoi nodes model two coupled media (e.g. the void and the
//! solid phase of a porous material), and the interconnect throats between them carry
//! the exchange between the two.
//!
//! # Features
//!
//! - 2D and 3D tessellation via incremental Bowyer-Watson insertion with ghost cells
//! - Voronoi ridge extraction with welding of coincident (cospherical) circumcenters
//! - Deduplicated fusion of Delaunay, Voronoi and interconnect throats
//! - Domain trimming with boundary relabeling and surface pore relocation
//! - Facet and hull queries over the finished network
//! - A strongly typed label registry that is remapped together with every trim/append
//!
//! # Basic Usage
//!
//! ```rust
//! use delaunay_voronoi_dual::prelude::*;
//!
//! let config = DualConfigBuilder::default()
//!     .shape(vec![1.0, 1.0, 0.0])
//!     .num_points(40)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let dual = DelaunayVoronoiDual::new(&config).unwrap();
//! let network = dual.network();
//!
//! assert!(network.num_pores() > 0);
//! assert!(network.check_integrity().is_ok());
//!
//! // Every throat belongs to exactly one of the three sub-networks.
//! for t in 0..network.num_throats() {
//!     let count = [ThroatLabel::Delaunay, ThroatLabel::Voronoi, ThroatLabel::Interconnect]
//!         .into_iter()
//!         .filter(|&label| network.labels().throat_has(label, t))
//!         .count();
//!     assert_eq!(count, 1);
//! }
//! ```
//!
//! # Construction pipeline
//!
//! 1. **Point preparation** ([`core::points`]) validates explicit points or generates
//!    reflected base points, and collapses a constant axis to 2D.
//! 2. **Tessellation** ([`core::tessellation`]) computes the Delaunay cells, the Voronoi
//!    vertices and, per Delaunay edge, the ordered ring of Voronoi vertices bounding the
//!    dual facet ("ridge").
//! 3. **Fusion** ([`core::fusion`]) emits Delaunay, interconnect and Voronoi throats into
//!    an append-only buffer and deduplicates it in one sort pass.
//! 4. **Trimming** ([`core::dual::DelaunayVoronoiDual::trim_external_pores`]) removes
//!    everything not reachable in one hop from an interior Delaunay pore, labels the
//!    surface, drops surface-to-surface Delaunay throats and relocates surface Delaunay
//!    pores onto their Voronoi facets.
//!
//! # Error handling
//!
//! Construction is a one-shot pipeline: any failure aborts the whole build and no
//! partially built network is returned.
//!
//! ```rust
//! use delaunay_voronoi_dual::prelude::*;
//!
//! // Neither `points` nor `num_points`: rejected before any geometry work.
//! let result = DualConfigBuilder::default().shape(vec![1.0, 1.0, 1.0]).build();
//! assert!(result.is_err());
//! ```

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the tessellation, the host network container and the
/// dual network construction built on top of them.
pub mod core {
    /// Tessellation algorithms
    pub mod algorithms {
        /// Incremental Bowyer-Watson insertion with ghost cells
        pub mod bowyer_watson;
    }
    pub mod adjacency;
    /// Small, fast collection types and the spatial hash grid used for welding
    pub mod collections;
    pub mod config;
    pub mod domain;
    pub mod dual;
    pub mod edge;
    pub mod fusion;
    pub mod labels;
    pub mod network;
    pub mod points;
    pub mod tessellation;

    pub use adjacency::*;
    pub use config::*;
    pub use domain::*;
    pub use dual::*;
    pub use edge::*;
    pub use fusion::*;
    pub use labels::*;
    pub use network::*;
    pub use points::*;
    pub use tessellation::*;
}

/// Geometric primitives: points, small stack matrices and the predicates used by the
/// tessellation.
pub mod geometry {
    pub mod matrix;
    pub mod point;
    pub mod predicates;
    /// Geometric utility functions (rounding, base point generation)
    pub mod util;

    pub use point::*;
    pub use predicates::*;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::{
        adjacency::*, config::*, domain::*, dual::*, edge::*, fusion::*, labels::*,
        network::*, points::*, tessellation::*,
    };

    pub use crate::core::collections::{FastHashMap, FastHashSet, SmallBuffer};

    pub use crate::geometry::{point::*, predicates::*, util::*};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{
        core::{
            adjacency::AdjacencyIndex, dual::DelaunayVoronoiDual, labels::LabelRegistry,
            network::Network, tessellation::Tessellation,
        },
        geometry::Point,
        is_normal,
    };

    // =============================================================================
    // TYPE SAFETY TESTS
    // =============================================================================

    #[test]
    fn normal_types() {
        assert!(is_normal::<Point<2>>());
        assert!(is_normal::<Point<3>>());
        assert!(is_normal::<Tessellation>());
        assert!(is_normal::<Network>());
        assert!(is_normal::<LabelRegistry>());
        assert!(is_normal::<AdjacencyIndex>());
        assert!(is_normal::<DelaunayVoronoiDual>());
    }

    #[test]
    fn test_prelude_collections_exports() {
        use crate::prelude::*;

        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));

        let mut set: FastHashSet<u64> = FastHashSet::default();
        set.insert(789);
        assert!(set.contains(&789));

        let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
        buffer.push(42);
        assert_eq!(buffer.len(), 1);
    }
}
