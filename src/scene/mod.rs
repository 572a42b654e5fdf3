//! Scene container and surface materials.

mod material;
mod space;

pub use material::{AcousticMaterial, Material, MaterialTable, SurfaceKind};
pub use space::{SceneGeometry, Space, box_faces};
