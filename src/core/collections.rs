//! Collection aliases and small spatial indices shared by the tessellation and the
//! network container.

mod aliases;
pub(crate) mod spatial_hash_grid;

pub use aliases::*;
