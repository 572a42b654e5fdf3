//! Scene container consumed by the visibility search.
//!
//! The search only needs read access to the scene polygons and their
//! materials, plus an append-only sink for illustration geometry. Both are
//! expressed by [`SceneGeometry`], so callers can plug in their own scene
//! representation; [`Space`] is the in-crate implementation.

use crate::error::{EchoViewError, Result};
use crate::geometry::{Polygon, SurfaceProps};
use crate::math::DVec3;
use crate::scene::material::{AcousticMaterial, MaterialTable};
use std::sync::{Mutex, PoisonError};

/// Scene access required by views and receivers.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: several receivers may search the
/// same scene at once. `add_poly` can be called concurrently and must
/// serialize its appends.
pub trait SceneGeometry: Send + Sync {
    /// All real scene polygons (illustration geometry excluded).
    fn polygons(&self) -> &[Polygon];

    /// Material behind a polygon's `props.material` index.
    fn material(&self, index: u8) -> Option<&AcousticMaterial>;

    /// Appends illustration-only geometry.
    fn add_poly(&self, polygon: Polygon);

    /// The six outward-facing faces of an axis-aligned cube of edge `size`
    /// centered on `origin`.
    fn cube(&self, origin: DVec3, size: f64, material: u8, ill_only: bool) -> Vec<Polygon> {
        let half = DVec3::splat(0.5 * size);
        box_faces(
            origin - half,
            origin + half,
            SurfaceProps {
                material,
                ill_only,
            },
        )
    }
}

/// The six outward-facing faces of the box `[min, max]`. Degenerate boxes
/// yield no faces.
pub fn box_faces(min: DVec3, max: DVec3, props: SurfaceProps) -> Vec<Polygon> {
    let (l, h) = (min, max);
    let faces = [
        // +X
        [
            DVec3::new(h.x, l.y, l.z),
            DVec3::new(h.x, h.y, l.z),
            DVec3::new(h.x, h.y, h.z),
            DVec3::new(h.x, l.y, h.z),
        ],
        // -X
        [
            DVec3::new(l.x, l.y, l.z),
            DVec3::new(l.x, l.y, h.z),
            DVec3::new(l.x, h.y, h.z),
            DVec3::new(l.x, h.y, l.z),
        ],
        // +Y
        [
            DVec3::new(l.x, h.y, l.z),
            DVec3::new(l.x, h.y, h.z),
            DVec3::new(h.x, h.y, h.z),
            DVec3::new(h.x, h.y, l.z),
        ],
        // -Y
        [
            DVec3::new(l.x, l.y, l.z),
            DVec3::new(h.x, l.y, l.z),
            DVec3::new(h.x, l.y, h.z),
            DVec3::new(l.x, l.y, h.z),
        ],
        // +Z
        [
            DVec3::new(l.x, l.y, h.z),
            DVec3::new(h.x, l.y, h.z),
            DVec3::new(h.x, h.y, h.z),
            DVec3::new(l.x, h.y, h.z),
        ],
        // -Z
        [
            DVec3::new(l.x, l.y, l.z),
            DVec3::new(l.x, h.y, l.z),
            DVec3::new(h.x, h.y, l.z),
            DVec3::new(h.x, l.y, l.z),
        ],
    ];

    faces
        .iter()
        .filter_map(|corners| Polygon::from_points(corners, props).ok())
        .collect()
}

/// In-memory scene: polygons, their materials and an illustration sink.
#[derive(Debug)]
pub struct Space {
    polygons: Vec<Polygon>,
    materials: MaterialTable,
    illustrations: Mutex<Vec<Polygon>>,
}

impl Space {
    pub fn new(materials: MaterialTable) -> Self {
        Self {
            polygons: Vec::new(),
            materials,
            illustrations: Mutex::new(Vec::new()),
        }
    }

    /// Empty scene using `MaterialTable::with_presets()`.
    pub fn with_presets() -> Self {
        Self::new(MaterialTable::with_presets())
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn add_material(&mut self, material: AcousticMaterial) -> Result<u8> {
        self.materials.add(material)
    }

    /// Adds a scene polygon and returns its index.
    pub fn add_polygon(&mut self, polygon: Polygon) -> Result<usize> {
        if self.materials.get(polygon.props.material).is_none() {
            return Err(EchoViewError::InvalidMaterial(format!(
                "material index {} is not in the table",
                polygon.props.material
            )));
        }
        self.polygons.push(polygon);
        Ok(self.polygons.len() - 1)
    }

    /// Adds a convex planar surface given by world-space corners. The
    /// surface faces the side from which the corners appear counter-clockwise.
    pub fn add_surface(&mut self, corners: &[DVec3], material: u8) -> Result<usize> {
        let polygon = Polygon::from_points(corners, SurfaceProps::new(material))?;
        self.add_polygon(polygon)
    }

    /// Adds the six walls of the room `[min, max]`, facing inwards.
    pub fn add_box_room(&mut self, min: DVec3, max: DVec3, material: u8) -> Result<()> {
        let walls = box_faces(min, max, SurfaceProps::new(material));
        if walls.len() != 6 {
            return Err(EchoViewError::InvalidPolygon(format!(
                "room {:?}..{:?} has no volume",
                min, max
            )));
        }
        for wall in walls {
            self.add_polygon(wall.reverse())?;
        }
        Ok(())
    }

    /// Snapshot of the illustration geometry added so far.
    pub fn illustrations(&self) -> Vec<Polygon> {
        self.illustrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the illustration geometry.
    pub fn take_illustrations(&self) -> Vec<Polygon> {
        std::mem::take(
            &mut *self
                .illustrations
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::with_presets()
    }
}

impl SceneGeometry for Space {
    fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    fn material(&self, index: u8) -> Option<&AcousticMaterial> {
        self.materials.get(index)
    }

    fn add_poly(&self, polygon: Polygon) {
        self.illustrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(polygon);
    }
}
