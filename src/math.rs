//! Math types for echoview

pub use glam::{DVec2, DVec3};

/// Linear tolerance used by every geometric predicate in the crate.
pub const EPSILON: f64 = 1e-9;

/// Areas at or below this are treated as empty.
pub const AREA_EPSILON: f64 = 1e-12;

/// An oriented plane with an orthonormal, right-handed frame.
///
/// `i` and `j` span the plane and define its 2D coordinates, `k` is the unit
/// normal. Polygons living in the plane store their vertices in `(i, j)`
/// coordinates, counter-clockwise when seen from the `k` side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    origin: DVec3,
    i: DVec3,
    j: DVec3,
    k: DVec3,
}

impl Plane {
    /// Plane through `origin` with the given normal. Returns `None` for a
    /// zero-length normal.
    pub fn with_normal(origin: DVec3, normal: DVec3) -> Option<Self> {
        let k = normal.try_normalize()?;
        let helper = if k.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let i = helper.cross(k).normalize();
        let j = k.cross(i);
        Some(Self { origin, i, j, k })
    }

    /// Plane through three points, normal following `a -> b -> c`
    /// counter-clockwise. Returns `None` when the points are collinear.
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        let k = (b - a).cross(c - a).try_normalize()?;
        let i = (b - a).try_normalize()?;
        let j = k.cross(i);
        Some(Self { origin: a, i, j, k })
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn normal(&self) -> DVec3 {
        self.k
    }

    /// Local coordinates of `point`: position in the plane and signed depth
    /// along the normal.
    pub fn project(&self, point: DVec3) -> (DVec2, f64) {
        let d = point - self.origin;
        (DVec2::new(d.dot(self.i), d.dot(self.j)), d.dot(self.k))
    }

    pub fn depth(&self, point: DVec3) -> f64 {
        (point - self.origin).dot(self.k)
    }

    /// World position of plane coordinates `xy`.
    pub fn unproject(&self, xy: DVec2) -> DVec3 {
        self.origin + self.i * xy.x + self.j * xy.y
    }

    /// Mirror image of `point` across the plane.
    pub fn reflect(&self, point: DVec3) -> DVec3 {
        point - 2.0 * self.depth(point) * self.k
    }

    /// Same plane, opposite orientation. Plane coordinates map `(x, y)` to
    /// `(x, -y)`.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.origin,
            i: self.i,
            j: -self.j,
            k: -self.k,
        }
    }

    /// Parallel plane moved `distance` along the normal.
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.k * distance,
            ..*self
        }
    }

    /// Parameter `t` at which the ray `from + t * (through - from)` meets
    /// the plane, or `None` if the ray runs parallel to it.
    pub fn ray_parameter(&self, from: DVec3, through: DVec3) -> Option<f64> {
        let d0 = self.depth(from);
        let denom = d0 - self.depth(through);
        if denom.abs() <= f64::EPSILON * (d0.abs() + 1.0) {
            return None;
        }
        Some(d0 / denom)
    }

    /// Point where the line from `from` through `through` meets the plane.
    pub fn intersect_ray(&self, from: DVec3, through: DVec3) -> Option<DVec3> {
        self.ray_parameter(from, through)
            .map(|t| from + t * (through - from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_frame_is_right_handed() {
        let plane = Plane::with_normal(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.3, -0.4, 0.8))
            .unwrap();
        assert!((plane.i.cross(plane.j) - plane.k).length() < 1e-12);

        let reversed = plane.reversed();
        assert!((reversed.i.cross(reversed.j) - reversed.k).length() < 1e-12);
        assert_close(reversed.normal(), -plane.normal());
    }

    #[test]
    fn test_project_unproject() {
        let plane = Plane::with_normal(DVec3::new(0.0, 0.0, 2.0), DVec3::Z).unwrap();
        let p = DVec3::new(0.5, -1.5, 3.0);
        let (xy, z) = plane.project(p);
        assert!((z - 1.0).abs() < 1e-12);
        assert_close(plane.unproject(xy) + plane.normal() * z, p);
    }

    #[test]
    fn test_reflect_twice_restores_point() {
        let plane =
            Plane::from_points(DVec3::ZERO, DVec3::new(1.0, 0.2, 0.0), DVec3::new(0.0, 1.0, 0.7))
                .unwrap();
        let p = DVec3::new(3.0, -2.0, 5.0);
        let mirrored = plane.reflect(p);
        assert!((plane.depth(mirrored) + plane.depth(p)).abs() < 1e-9);
        assert_close(plane.reflect(mirrored), p);
    }

    #[test]
    fn test_degenerate_planes() {
        assert!(Plane::with_normal(DVec3::ZERO, DVec3::ZERO).is_none());
        assert!(Plane::from_points(DVec3::ZERO, DVec3::X, DVec3::X * 2.0).is_none());
    }

    #[test]
    fn test_intersect_ray() {
        let plane = Plane::with_normal(DVec3::new(0.0, 0.0, 2.0), DVec3::Z).unwrap();
        let hit = plane
            .intersect_ray(DVec3::ZERO, DVec3::new(1.0, 1.0, 1.0))
            .unwrap();
        assert_close(hit, DVec3::new(2.0, 2.0, 2.0));
        assert!(plane.intersect_ray(DVec3::ZERO, DVec3::X).is_none());
    }
}
