//! A visibility region: an origin looking through a planar window, and,
//! once known, the piece of scene surface seen through it.

use crate::geometry::{Polygon, edge_side};
use crate::math::{DVec2, DVec3, EPSILON};

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub origin: DVec3,
    /// Window polygon, in the window plane's frame
    pub window: Polygon,
    /// Surface piece seen through `window`, in its own plane
    pub target: Option<Polygon>,
}

/// How one candidate relates to another inside a shared window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Comparison {
    /// No overlap between the two footprints
    pub exterior: bool,
    /// Footprint lies entirely inside the other footprint
    pub interior: bool,
    /// Strictly farther from the origin over the shared footprint
    pub farther: bool,
    /// Same depth over the shared footprint
    pub coplanar: bool,
}

/// A candidate edge whose supporting line divides a window. `v1`/`v2` are
/// window-plane points, `d1 <= d2` the distances from the origin to the
/// matching surface points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitEdge {
    pub v1: DVec2,
    pub d1: f64,
    pub v2: DVec2,
    pub d2: f64,
}

impl SplitEdge {
    /// Nearest-edge-first ordering: smaller `d1`, then smaller `d2`.
    pub fn is_nearer_than(&self, other: &SplitEdge) -> bool {
        self.d1 < other.d1 || (self.d1 == other.d1 && self.d2 < other.d2)
    }
}

impl Region {
    pub fn new(origin: DVec3, window: Polygon) -> Self {
        Self {
            origin,
            window,
            target: None,
        }
    }

    pub fn with_target(origin: DVec3, window: Polygon, target: Polygon) -> Self {
        Self {
            origin,
            window,
            target: Some(target),
        }
    }

    /// Candidate region for a scene polygon seen through this window.
    pub fn project_and_crop(&self, polygon: &Polygon) -> Option<Region> {
        let (footprint, target) = self.window.project_and_crop(self.origin, polygon)?;
        Some(Region::with_target(self.origin, footprint, target))
    }

    /// `other` restricted to this region's window, or `None` if nothing of it
    /// remains.
    pub fn crop_visible(&self, other: &Region) -> Option<Region> {
        let target = other.target.as_ref()?;
        let window = other.window.clip_convex(&self.window)?;
        let target = window.back_project(self.origin, target.plane())?;
        Some(Region::with_target(self.origin, window, target))
    }

    /// Describes `other` relative to `self`. Both must be candidates of the
    /// same window.
    pub fn compare_visible(&self, other: &Region) -> Comparison {
        let (Some(mine), Some(theirs)) = (self.target.as_ref(), other.target.as_ref()) else {
            return Comparison::default();
        };

        let interior = other
            .window
            .verts()
            .iter()
            .all(|&v| self.window.contains_point(v, EPSILON));

        let Some(overlap) = other.window.clip_convex(&self.window) else {
            return Comparison {
                exterior: true,
                interior,
                ..Default::default()
            };
        };

        let centroid = overlap
            .verts()
            .iter()
            .fold(DVec2::ZERO, |acc, &v| acc + v)
            / overlap.len() as f64;

        let mut behind = false;
        let mut in_front = false;
        for point in overlap.verts().iter().copied().chain(std::iter::once(centroid)) {
            let (Some(t_mine), Some(t_theirs)) =
                (self.ray_depth(mine, point), self.ray_depth(theirs, point))
            else {
                continue;
            };
            let tolerance = EPSILON * t_mine.abs().max(t_theirs.abs()).max(1.0);
            if t_theirs > t_mine + tolerance {
                behind = true;
            } else if t_theirs < t_mine - tolerance {
                in_front = true;
            }
        }

        Comparison {
            exterior: false,
            interior,
            farther: behind && !in_front,
            coplanar: !behind && !in_front,
        }
    }

    /// Nearest edge of `other` whose line divides this window.
    pub fn nearest_intersection(&self, other: &Region) -> Option<SplitEdge> {
        let target = other.target.as_ref()?;
        let mut best: Option<SplitEdge> = None;

        for (a, b) in other.window.edges() {
            if !self.divides_window(a, b) {
                continue;
            }
            let (Some(da), Some(db)) = (
                self.surface_distance(target, a),
                self.surface_distance(target, b),
            ) else {
                continue;
            };
            let edge = if da <= db {
                SplitEdge { v1: a, d1: da, v2: b, d2: db }
            } else {
                SplitEdge { v1: b, d1: db, v2: a, d2: da }
            };
            if best.as_ref().is_none_or(|current| edge.is_nearer_than(current)) {
                best = Some(edge);
            }
        }

        best
    }

    /// Whether the line through `a` and `b` leaves window vertices strictly
    /// on both sides.
    fn divides_window(&self, a: DVec2, b: DVec2) -> bool {
        let (low, high) = self
            .window
            .verts()
            .iter()
            .map(|&w| edge_side(a, b, w))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s), hi.max(s))
            });
        low < -EPSILON && high > EPSILON
    }

    /// Ray parameter from the origin, through window point `point`, to the
    /// plane of `surface`.
    fn ray_depth(&self, surface: &Polygon, point: DVec2) -> Option<f64> {
        let through = self.window.plane().unproject(point);
        surface.plane().ray_parameter(self.origin, through)
    }

    fn surface_distance(&self, surface: &Polygon, point: DVec2) -> Option<f64> {
        let through = self.window.plane().unproject(point);
        surface
            .plane()
            .intersect_ray(self.origin, through)
            .map(|hit| hit.distance(self.origin))
    }
}
