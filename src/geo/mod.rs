//! Grid geometry: landmass rasterization and coordinate projection.

pub mod grid;
pub mod outline;

pub use grid::{GridBounds, GridCell, GridIndexer};
pub use outline::{Lobe, Pixel, build_outline, fill_interior};
