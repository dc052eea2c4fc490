use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for tessellation cells.
///
/// Cells are created and destroyed constantly during incremental insertion, so a
/// generational slot map gives stable keys without invalidating the rest of the
/// storage on removal.
///
/// # Internal Use Only
///
/// This type should not be exposed in public API signatures.
pub(crate) type StorageMap<K, V> = SlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Optimized `HashMap` type for performance-critical operations.
/// Uses `rustc_hash::FxHasher` for faster hashing in non-cryptographic contexts.
///
/// # Security Warning
///
/// ⚠️ **Not DoS-resistant**: Do not use with attacker-controlled keys.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<(usize, usize), usize> = FastHashMap::default();
/// map.insert((0, 4), 2);
/// assert_eq!(map.get(&(0, 4)), Some(&2));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Re-export the Entry enum for `FastHashMap`.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::collections::{Entry, FastHashMap};
///
/// let mut map: FastHashMap<usize, Vec<usize>> = FastHashMap::default();
/// match map.entry(3) {
///     Entry::Occupied(mut e) => e.get_mut().push(1),
///     Entry::Vacant(e) => {
///         e.insert(vec![1]);
///     }
/// }
/// assert_eq!(map[&3], vec![1]);
/// ```
pub use std::collections::hash_map::Entry;

/// Optimized `HashSet` type for performance-critical operations.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<usize> = FastHashSet::default();
/// set.insert(7);
/// assert!(set.contains(&7));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses stack allocation for small collections.
///
/// # Size Guidelines
///
/// - **N=2**: Cells sharing a facet (always at most two)
/// - **N=4**: Simplex vertex lists (D+1 ≤ 4)
/// - **N=8**: Cells around a Delaunay edge, typical pore degrees
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 4> = SmallBuffer::new();
/// buffer.extend([0, 1, 2]);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC SIZE CONSTANTS AND TYPE ALIASES
// =============================================================================

/// Inline capacity for simplex vertex lists (a tetrahedron has four vertices).
pub const SIMPLEX_CAPACITY: usize = 4;

/// Inline capacity for the ring of cells around a Delaunay edge.
pub const RING_CAPACITY: usize = 8;

/// Sorted vertex list of a simplex.
pub type SimplexVertices = SmallBuffer<usize, SIMPLEX_CAPACITY>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_collections_basic_operations() {
        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        assert!(map.is_empty());

        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));
        map.insert(789, 101_112);
        assert_eq!(map.len(), 2);

        let mut set: FastHashSet<u64> = FastHashSet::default();
        set.insert(789);
        set.insert(456);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&999));
    }

    #[test]
    fn test_simplex_vertices_stay_inline_up_to_tetrahedra() {
        let mut simplex: SimplexVertices = SimplexVertices::new();
        simplex.extend([0, 1, 2, 3]);
        assert_eq!(simplex.len(), SIMPLEX_CAPACITY);
        assert!(!simplex.spilled());

        simplex.push(4);
        assert!(simplex.spilled());
    }
}
