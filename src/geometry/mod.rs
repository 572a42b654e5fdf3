//! Convex polygon kernel.

mod polygon;

pub use polygon::{Polygon, SurfaceProps};
pub(crate) use polygon::edge_side;
