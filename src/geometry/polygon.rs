//! Convex planar polygons and the exact clipping / projection operations the
//! visibility search is built on.

use crate::error::{EchoViewError, Result};
use crate::math::{AREA_EPSILON, DVec2, DVec3, EPSILON, Plane};

/// Per-surface properties carried through every crop, split and projection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceProps {
    /// Index into the scene's `MaterialTable`
    pub material: u8,
    /// Illustration-only geometry never takes part in a visibility search
    pub ill_only: bool,
}

impl SurfaceProps {
    pub fn new(material: u8) -> Self {
        Self {
            material,
            ill_only: false,
        }
    }

    pub fn illustration(material: u8) -> Self {
        Self {
            material,
            ill_only: true,
        }
    }
}

/// A convex polygon stored in the 2D frame of its plane.
///
/// Vertices are counter-clockwise seen from the plane normal, so the normal
/// is also the polygon's facing direction. Every constructor rejects
/// polygons whose area vanishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    plane: Plane,
    verts: Vec<DVec2>,
    pub props: SurfaceProps,
}

impl Polygon {
    /// Builds a polygon from plane coordinates. Clockwise input is flipped to
    /// counter-clockwise; `None` if fewer than three distinct vertices remain
    /// or the area is empty.
    pub fn new(plane: Plane, verts: Vec<DVec2>, props: SurfaceProps) -> Option<Self> {
        let mut verts = dedup_ring(verts);
        if verts.len() < 3 {
            return None;
        }
        let area = signed_area(&verts);
        if area.abs() <= AREA_EPSILON {
            return None;
        }
        if area < 0.0 {
            verts.reverse();
        }
        Some(Self {
            plane,
            verts,
            props,
        })
    }

    /// Builds a polygon from world-space points, normal given by their
    /// winding. The points must be planar and form a convex polygon.
    pub fn from_points(points: &[DVec3], props: SurfaceProps) -> Result<Self> {
        if points.len() < 3 {
            return Err(EchoViewError::InvalidPolygon(format!(
                "need at least 3 vertices, got {}",
                points.len()
            )));
        }

        let mut normal = DVec3::ZERO;
        let mut center = DVec3::ZERO;
        for (idx, &a) in points.iter().enumerate() {
            let b = points[(idx + 1) % points.len()];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
            center += a;
        }
        center /= points.len() as f64;

        let plane = Plane::with_normal(center, normal).ok_or_else(|| {
            EchoViewError::InvalidPolygon("vertices are collinear or coincident".into())
        })?;

        let scale = points
            .iter()
            .map(|p| (*p - center).length())
            .fold(0.0, f64::max);
        let mut verts = Vec::with_capacity(points.len());
        for &p in points {
            let (xy, z) = plane.project(p);
            if z.abs() > 1e-6 * scale.max(1.0) {
                return Err(EchoViewError::InvalidPolygon(format!(
                    "vertex {:?} lies {} off the polygon plane",
                    p, z
                )));
            }
            verts.push(xy);
        }

        let polygon = Self::new(plane, verts, props)
            .ok_or_else(|| EchoViewError::InvalidPolygon("polygon has no area".into()))?;
        if !polygon.is_convex() {
            return Err(EchoViewError::InvalidPolygon("polygon is not convex".into()));
        }
        Ok(polygon)
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Vertices in plane coordinates.
    pub fn verts(&self) -> &[DVec2] {
        &self.verts
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    pub fn normal(&self) -> DVec3 {
        self.plane.normal()
    }

    /// Vertices in world space.
    pub fn vertices(&self) -> Vec<DVec3> {
        self.verts.iter().map(|&v| self.plane.unproject(v)).collect()
    }

    /// Vertex average in world space.
    pub fn center(&self) -> DVec3 {
        let sum = self.verts.iter().fold(DVec2::ZERO, |acc, &v| acc + v);
        self.plane.unproject(sum / self.verts.len() as f64)
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.verts)
    }

    /// Same surface facing the other way.
    pub fn reverse(&self) -> Self {
        let verts = self
            .verts
            .iter()
            .rev()
            .map(|v| DVec2::new(v.x, -v.y))
            .collect();
        Self {
            plane: self.plane.reversed(),
            verts,
            props: self.props,
        }
    }

    /// Copy moved `distance` along the normal.
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            plane: self.plane.offset(distance),
            verts: self.verts.clone(),
            props: self.props,
        }
    }

    pub fn is_convex(&self) -> bool {
        let n = self.verts.len();
        (0..n).all(|idx| {
            let a = self.verts[idx];
            let b = self.verts[(idx + 1) % n];
            let c = self.verts[(idx + 2) % n];
            (b - a).perp_dot(c - b) >= -EPSILON * (b - a).length().max(1.0)
        })
    }

    /// Whether `point` (plane coordinates) is inside or within `tolerance` of
    /// the boundary.
    pub fn contains_point(&self, point: DVec2, tolerance: f64) -> bool {
        self.edges()
            .all(|(a, b)| edge_side(a, b, point) >= -tolerance)
    }

    /// Directed edges `(from, to)` in plane coordinates.
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.verts.len();
        (0..n).map(move |idx| (self.verts[idx], self.verts[(idx + 1) % n]))
    }

    /// Part of the polygon left of the directed line `a -> b`. Splitting with
    /// `(a, b)` and `(b, a)` yields two polygons with disjoint interiors whose
    /// union is `self`.
    pub fn split(&self, a: DVec2, b: DVec2) -> Option<Self> {
        let len = (b - a).length();
        if len <= EPSILON {
            return None;
        }
        let clipped = clip_ring(&self.verts, |p| (b - a).perp_dot(p - a) / len);
        Self::new(self.plane, clipped, self.props)
    }

    /// Intersection with `window`, which must live in the same plane frame.
    pub fn clip_convex(&self, window: &Polygon) -> Option<Self> {
        let mut clipped = self.verts.clone();
        for (a, b) in window.edges() {
            clipped = clip_ring(&clipped, |p| edge_side(a, b, p));
            if clipped.len() < 3 {
                return None;
            }
        }
        Self::new(self.plane, clipped, self.props)
    }

    /// Projects `polygon` from `origin` onto this window and crops it.
    ///
    /// Only the part of `polygon` beyond the window plane (on the side away
    /// from `origin`) takes part. Returns the cropped footprint in this
    /// window's frame together with the matching piece of `polygon` in its
    /// own plane, or `None` when nothing of `polygon` shows through.
    pub fn project_and_crop(&self, origin: DVec3, polygon: &Polygon) -> Option<(Polygon, Polygon)> {
        let origin_depth = self.plane.depth(origin);
        if origin_depth.abs() <= EPSILON {
            return None;
        }
        let away = -origin_depth.signum();

        let beyond = clip_ring(&polygon.verts, |v| {
            away * self.plane.depth(polygon.plane.unproject(v))
        });
        let reach = beyond
            .iter()
            .map(|&v| away * self.plane.depth(polygon.plane.unproject(v)))
            .fold(f64::NEG_INFINITY, f64::max);
        if beyond.len() < 3 || reach <= EPSILON {
            return None;
        }

        let projected = beyond
            .iter()
            .map(|&v| {
                self.plane
                    .intersect_ray(origin, polygon.plane.unproject(v))
                    .map(|hit| self.plane.project(hit).0)
            })
            .collect::<Option<Vec<_>>>()?;
        let footprint = Polygon::new(self.plane, projected, polygon.props)?.clip_convex(self)?;
        let target = footprint.back_project(origin, &polygon.plane)?;
        Some((footprint, target))
    }

    /// Maps this polygon through `origin` onto `plane`.
    pub fn back_project(&self, origin: DVec3, plane: &Plane) -> Option<Polygon> {
        let verts = self
            .verts
            .iter()
            .map(|&v| {
                plane
                    .intersect_ray(origin, self.plane.unproject(v))
                    .map(|hit| plane.project(hit).0)
            })
            .collect::<Option<Vec<_>>>()?;
        Polygon::new(*plane, verts, self.props)
    }

    /// Points where the rays from `origin` through `points` cross this
    /// polygon's plane.
    pub fn intersections_3d(&self, origin: DVec3, points: &[DVec3]) -> Option<Vec<DVec3>> {
        points
            .iter()
            .map(|&p| self.plane.intersect_ray(origin, p))
            .collect()
    }
}

/// Signed distance of `p` from the directed line `a -> b`, positive on the
/// left.
pub(crate) fn edge_side(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    let d = b - a;
    let len = d.length();
    if len <= EPSILON {
        return 0.0;
    }
    d.perp_dot(p - a) / len
}

fn signed_area(verts: &[DVec2]) -> f64 {
    let n = verts.len();
    let twice: f64 = (0..n)
        .map(|idx| verts[idx].perp_dot(verts[(idx + 1) % n]))
        .sum();
    0.5 * twice
}

/// One Sutherland-Hodgman pass keeping the part where `side >= 0`.
fn clip_ring(verts: &[DVec2], side: impl Fn(DVec2) -> f64) -> Vec<DVec2> {
    let n = verts.len();
    let sides: Vec<f64> = verts.iter().map(|&v| side(v)).collect();
    let mut out = Vec::with_capacity(n + 1);
    for idx in 0..n {
        let next = (idx + 1) % n;
        let (sc, sn) = (sides[idx], sides[next]);
        if sc >= -EPSILON {
            out.push(verts[idx]);
        }
        if (sc > EPSILON && sn < -EPSILON) || (sc < -EPSILON && sn > EPSILON) {
            let t = sc / (sc - sn);
            out.push(verts[idx] + (verts[next] - verts[idx]) * t);
        }
    }
    out
}

fn dedup_ring(mut verts: Vec<DVec2>) -> Vec<DVec2> {
    verts.dedup_by(|a, b| (*a - *b).length() <= EPSILON);
    while verts.len() > 1 {
        let first = verts[0];
        let last = verts[verts.len() - 1];
        if (first - last).length() <= EPSILON {
            verts.pop();
        } else {
            break;
        }
    }
    verts
}
