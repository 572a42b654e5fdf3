//! Views: exact visibility through one window.
//!
//! A view starts with every scene polygon that projects into its window as a
//! candidate. Refinement alternates occlusion removal with splitting the
//! window along the nearest candidate edge until each sub-window sees at most
//! one surface. Resolved views then spawn mirrored or refracted children.

use crate::error::{EchoViewError, Result};
use crate::geometry::{Polygon, SurfaceProps};
use crate::math::DVec3;
use crate::scene::{Material, SceneGeometry};
use crate::visibility::arena::{ViewArena, ViewId};
use crate::visibility::region::{Comparison, Region, SplitEdge};
use std::collections::VecDeque;

/// Distance projected candidates are moved off their surface when drawn.
const PROJECTION_OFFSET: f64 = 1e-3;

/// How a view was derived from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    /// Seeded by a receiver
    #[default]
    Direct,
    /// Mirrored across a reflective target
    Reflected,
    /// Straight through a refractive target
    Transmitted,
    /// Re-aimed behind a refractive target
    Refracted,
}

/// Recoverable inconsistencies found while removing occluded candidates.
/// They point at degenerate or self-intersecting scene geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// One candidate lies inside another at the same depth.
    InteriorCoplanar {
        inner: Vec<DVec3>,
        outer: Vec<DVec3>,
    },
    /// Each candidate lies inside the other without either being behind:
    /// the surfaces cross. `dropped` was removed to keep going.
    IntersectingCandidates {
        kept: Vec<DVec3>,
        dropped: Vec<DVec3>,
    },
}

/// Comparison of `first` relative to `second` (indices into the
/// candidate list).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairComparison {
    pub first: usize,
    pub second: usize,
    pub comparison: Comparison,
}

/// State of a view that kept several candidates but found no edge to split
/// its window along.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDiagnostic {
    pub origin: DVec3,
    pub window: Vec<DVec3>,
    pub candidates: Vec<Vec<DVec3>>,
    pub comparisons: Vec<PairComparison>,
}

impl std::fmt::Display for SplitDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} candidates left in a {}-gon window seen from {:?}",
            self.candidates.len(),
            self.window.len(),
            self.origin
        )
    }
}

/// Result of a single `View::refine` step.
#[derive(Debug)]
pub enum Refinement {
    /// No candidates left; the view is dropped
    Exhausted,
    /// Exactly one candidate left; the view now targets it
    Resolved(View),
    /// The window was split in two
    Split(View, View),
}

/// Everything a view search produced.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub resolved: Vec<View>,
    pub failures: Vec<SplitDiagnostic>,
    pub anomalies: Vec<Anomaly>,
    /// Number of `refine` calls made
    pub refinements: usize,
    /// The refinement cap stopped the search with views still pending
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct View {
    region: Region,
    parent: Option<ViewId>,
    visibles: Option<Vec<Region>>,
    propagation: Propagation,
}

impl View {
    pub fn new(origin: DVec3, window: Polygon) -> Self {
        Self {
            region: Region::new(origin, window),
            parent: None,
            visibles: None,
            propagation: Propagation::Direct,
        }
    }

    pub(crate) fn with_parent(mut self, parent: ViewId) -> Self {
        self.parent = Some(parent);
        self
    }

    fn derived(origin: DVec3, window: Polygon, parent: ViewId, propagation: Propagation) -> Self {
        Self {
            propagation,
            ..Self::new(origin, window).with_parent(parent)
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn origin(&self) -> DVec3 {
        self.region.origin
    }

    pub fn window(&self) -> &Polygon {
        &self.region.window
    }

    pub fn target(&self) -> Option<&Polygon> {
        self.region.target.as_ref()
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// Candidates still under consideration; `None` once resolved.
    pub fn visibles(&self) -> Option<&[Region]> {
        self.visibles.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.visibles.is_none() && self.region.target.is_some()
    }

    /// Collects one candidate per scene polygon that shows through the window.
    /// Candidates may still be occluded; nothing visible is missed.
    pub fn search_polygons(
        &mut self,
        scene: &dyn SceneGeometry,
        sink: Option<&dyn SceneGeometry>,
    ) {
        let mut visibles = Vec::new();

        for polygon in scene.polygons() {
            if polygon.props.ill_only {
                continue;
            }

            let depth = polygon.plane().depth(self.region.origin);
            if depth.abs() <= crate::math::EPSILON {
                continue;
            }
            let reflective = scene
                .material(polygon.props.material)
                .is_some_and(|m| m.is_reflective());
            if depth < 0.0 && reflective {
                continue;
            }

            let Some(candidate) = self.region.project_and_crop(polygon) else {
                continue;
            };

            if let (Some(sink), Some(target)) = (sink, candidate.target.as_ref()) {
                let mut shown = target.offset(PROJECTION_OFFSET);
                shown.props.ill_only = true;
                sink.add_poly(shown);
            }

            visibles.push(candidate);
        }

        log::debug!(
            "View from {:?}: {} candidates out of {} polygons",
            self.region.origin,
            visibles.len(),
            scene.polygons().len()
        );
        self.visibles = Some(visibles);
    }

    /// Re-crops every candidate against the current window, dropping those
    /// that no longer show.
    pub fn refine_visibles(&mut self) {
        if let Some(visibles) = self.visibles.take() {
            self.visibles = Some(
                visibles
                    .iter()
                    .filter_map(|v| self.region.crop_visible(v))
                    .collect(),
            );
        }
    }

    /// Drops candidates hidden behind another candidate that fully covers
    /// them. Returns the inconsistencies met on the way.
    pub fn remove_occluded(&mut self) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        let Some(visibles) = self.visibles.as_mut() else {
            return anomalies;
        };

        let mut iv1 = 0;
        while iv1 + 1 < visibles.len() {
            let mut first_occluded = false;
            let mut iv2 = iv1 + 1;

            while iv2 < visibles.len() {
                let (v1, v2) = (&visibles[iv1], &visibles[iv2]);

                let first = v2.compare_visible(v1);
                if first.interior && first.farther {
                    first_occluded = true;
                    break;
                }

                let second = v1.compare_visible(v2);
                if second.interior && second.farther {
                    visibles.remove(iv2);
                    continue;
                }

                if (first.interior && first.coplanar) || (second.interior && second.coplanar) {
                    let (inner, outer) = if first.interior { (v1, v2) } else { (v2, v1) };
                    log::warn!("Interior-coplanar candidates; scene has overlapping surfaces");
                    anomalies.push(Anomaly::InteriorCoplanar {
                        inner: target_vertices(inner),
                        outer: target_vertices(outer),
                    });
                }

                if first.interior && second.interior {
                    log::warn!("Intersecting candidates; dropping one of them");
                    anomalies.push(Anomaly::IntersectingCandidates {
                        kept: target_vertices(v1),
                        dropped: target_vertices(v2),
                    });
                    visibles.remove(iv2);
                    continue;
                }

                iv2 += 1;
            }

            if first_occluded {
                visibles.remove(iv1);
            } else {
                iv1 += 1;
            }
        }

        anomalies
    }

    /// Every ordered candidate comparison, without removing anything.
    pub fn occlusion_trace(&self) -> Vec<PairComparison> {
        let Some(visibles) = self.visibles.as_ref() else {
            return Vec::new();
        };
        let mut trace = Vec::new();
        for (first, v1) in visibles.iter().enumerate() {
            for (second, v2) in visibles.iter().enumerate() {
                if first != second {
                    trace.push(PairComparison {
                        first,
                        second,
                        comparison: v2.compare_visible(v1),
                    });
                }
            }
        }
        trace
    }

    /// One partition step.
    ///
    /// # Errors
    ///
    /// `EchoViewError::NoSplittingEdge` when two or more candidates survive
    /// occlusion removal but none has an edge dividing the window.
    pub fn refine(mut self, anomalies: &mut Vec<Anomaly>) -> Result<Refinement> {
        match self.visibles.as_ref().map(Vec::len) {
            None if self.region.target.is_some() => return Ok(Refinement::Resolved(self)),
            None | Some(0) => return Ok(Refinement::Exhausted),
            Some(_) => {}
        }

        anomalies.extend(self.remove_occluded());

        let visibles = self.visibles.as_deref().unwrap_or_default();
        if visibles.len() == 1 {
            if let Some(region) = self.visibles.take().and_then(|mut v| v.pop()) {
                self.region = region;
            }
            return Ok(Refinement::Resolved(self));
        }

        let mut edges: Vec<SplitEdge> = visibles
            .iter()
            .filter_map(|v| self.region.nearest_intersection(v))
            .collect();
        edges.sort_by(|a, b| a.d1.total_cmp(&b.d1).then(a.d2.total_cmp(&b.d2)));

        for edge in edges {
            let window = &self.region.window;
            let (Some(first), Some(second)) =
                (window.split(edge.v1, edge.v2), window.split(edge.v2, edge.v1))
            else {
                continue;
            };

            let mut sibling = self.clone();

            self.region.window = first;
            self.refine_visibles();

            sibling.region.window = second;
            sibling.refine_visibles();

            return Ok(Refinement::Split(self, sibling));
        }

        Err(EchoViewError::NoSplittingEdge(Box::new(self.diagnostic())))
    }

    fn diagnostic(&self) -> SplitDiagnostic {
        SplitDiagnostic {
            origin: self.region.origin,
            window: self.region.window.vertices(),
            candidates: self
                .visibles
                .iter()
                .flatten()
                .map(|v| v.window.vertices())
                .collect(),
            comparisons: self.occlusion_trace(),
        }
    }

    /// Discovers candidates in `scene` and partitions until every sub-window
    /// is resolved or exhausted.
    pub fn search(
        mut self,
        scene: &dyn SceneGeometry,
        sink: Option<&dyn SceneGeometry>,
        max_refinements: Option<usize>,
    ) -> SearchOutcome {
        self.search_polygons(scene, sink);
        self.resolve(max_refinements)
    }

    /// Drives refinement from the current candidate list to a fixed point.
    pub fn resolve(self, max_refinements: Option<usize>) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut pending = VecDeque::from([self]);

        while let Some(view) = pending.pop_front() {
            if max_refinements.is_some_and(|max| outcome.refinements >= max) {
                log::warn!(
                    "View search stopped after {} refinements with {} views pending",
                    outcome.refinements,
                    pending.len() + 1
                );
                outcome.truncated = true;
                break;
            }
            outcome.refinements += 1;

            match view.refine(&mut outcome.anomalies) {
                Ok(Refinement::Exhausted) => {}
                Ok(Refinement::Resolved(view)) => outcome.resolved.push(view),
                Ok(Refinement::Split(a, b)) => {
                    pending.push_back(a);
                    pending.push_back(b);
                }
                Err(EchoViewError::NoSplittingEdge(diagnostic)) => {
                    log::error!("Dropping view: {}", diagnostic);
                    outcome.failures.push(*diagnostic);
                }
                Err(err) => log::error!("Dropping view: {}", err),
            }
        }

        outcome
    }

    /// Child view seen in the mirror of a reflective target.
    pub fn reflect_view(&self, id: ViewId) -> Option<View> {
        let target = self.region.target.as_ref()?;
        let origin = target.plane().reflect(self.region.origin);
        Some(View::derived(
            origin,
            target.clone(),
            id,
            Propagation::Reflected,
        ))
    }

    /// Children of a refractive target: `(through, refracted)`.
    ///
    /// `through` keeps the origin and treats the target as transparent.
    /// `refracted` looks through the target's center along its normal from
    /// the same distance as the current origin.
    pub fn refract_view(&self, id: ViewId) -> Option<(View, View)> {
        let target = self.region.target.as_ref()?;
        let origin = self.region.origin;

        let window = if target.plane().depth(origin) > 0.0 {
            target.reverse()
        } else {
            target.clone()
        };
        let center = window.center();
        let refracted_origin = center - origin.distance(center) * window.normal();

        let refracted = View::derived(
            refracted_origin,
            window.clone(),
            id,
            Propagation::Refracted,
        );
        let through = View::derived(origin, window, id, Propagation::Transmitted);
        Some((through, refracted))
    }

    /// Side strips tracing this view's target back through every window of
    /// its chain to the seed view. Illustration only.
    pub fn history_strips(&self, arena: &ViewArena) -> Vec<Polygon> {
        let Some(target) = self.region.target.as_ref() else {
            return Vec::new();
        };
        let props = SurfaceProps::illustration(target.props.material);

        let mut strips = Vec::new();
        let mut points = target.vertices();
        let mut view = Some(self);

        while let Some(current) = view {
            let Some(crossings) = current
                .region
                .window
                .intersections_3d(current.region.origin, &points)
            else {
                break;
            };

            let count = points.len();
            for i1 in 0..count {
                let i2 = (i1 + 1) % count;
                let quad = [points[i1], points[i2], crossings[i2], crossings[i1]];
                if let Ok(strip) = Polygon::from_points(&quad, props) {
                    strips.push(strip);
                }
            }

            points = crossings;
            view = current.parent.and_then(|id| arena.get(id));
        }

        strips
    }

    /// Adds `history_strips` to `sink`; returns how many were added.
    pub fn show_history(&self, arena: &ViewArena, sink: &dyn SceneGeometry) -> usize {
        let strips = self.history_strips(arena);
        let count = strips.len();
        for strip in strips {
            sink.add_poly(strip);
        }
        count
    }
}

fn target_vertices(region: &Region) -> Vec<DVec3> {
    region
        .target
        .as_ref()
        .map(Polygon::vertices)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AcousticMaterial, Space};

    const PASSIVE: u8 = 0;
    const METAL: u8 = 4;
    const SPEAKER: u8 = 6;

    fn square(z: f64, half: f64, material: u8) -> Polygon {
        Polygon::from_points(
            &[
                DVec3::new(-half, -half, z),
                DVec3::new(half, -half, z),
                DVec3::new(half, half, z),
                DVec3::new(-half, half, z),
            ],
            SurfaceProps::new(material),
        )
        .unwrap()
    }

    fn seed() -> View {
        View::new(DVec3::ZERO, square(1.0, 1.0, PASSIVE))
    }

    fn scene(polygons: Vec<Polygon>) -> Space {
        let mut space = Space::with_presets();
        for polygon in polygons {
            space.add_polygon(polygon).unwrap();
        }
        space
    }

    fn target_area_of(views: &[View], material: u8) -> f64 {
        views
            .iter()
            .filter_map(View::target)
            .filter(|t| t.props.material == material)
            .map(Polygon::area)
            .sum()
    }

    #[test]
    fn test_search_polygons_skips() {
        let mut hidden = square(3.0, 1.0, PASSIVE);
        hidden.props.ill_only = true;
        // a reflector facing away from the origin
        let mirror_back = square(2.0, 1.0, METAL);
        let behind = square(-2.0, 1.0, PASSIVE);
        let space = scene(vec![hidden, mirror_back, behind, square(4.0, 1.0, SPEAKER)]);

        let mut view = seed();
        view.search_polygons(&space, Some(&space));
        let visibles = view.visibles().unwrap();
        assert_eq!(visibles.len(), 1);
        assert_eq!(visibles[0].window.props.material, SPEAKER);

        let shown = space.illustrations();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].props.ill_only);
    }

    #[test]
    fn test_reflector_visible_from_front() {
        // normal +Z faces away from the origin
        let space = scene(vec![square(2.0, 1.0, METAL)]);
        let mut view = seed();
        view.search_polygons(&space, None);
        assert_eq!(view.visibles().unwrap().len(), 0);

        let space = scene(vec![square(2.0, 1.0, METAL).reverse()]);
        let mut view = seed();
        view.search_polygons(&space, None);
        assert_eq!(view.visibles().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_occluded_drops_hidden_subset() {
        // the small panel sits inside the large one's footprint, behind it
        let space = scene(vec![square(3.0, 0.6, SPEAKER), square(2.0, 2.0, PASSIVE)]);
        let mut view = seed();
        view.search_polygons(&space, None);
        assert_eq!(view.visibles().unwrap().len(), 2);

        let anomalies = view.remove_occluded();
        assert!(anomalies.is_empty());
        let visibles = view.visibles().unwrap();
        assert_eq!(visibles.len(), 1);
        assert_eq!(visibles[0].window.props.material, PASSIVE);
    }

    #[test]
    fn test_refine_resolves_single_candidate() {
        let space = scene(vec![square(2.0, 0.5, SPEAKER)]);
        let mut view = seed();
        view.search_polygons(&space, None);

        let mut anomalies = Vec::new();
        let Ok(Refinement::Resolved(view)) = view.refine(&mut anomalies) else {
            panic!("expected a resolved view");
        };
        assert!(view.is_resolved());
        assert!(view.visibles().is_none());
        assert!((view.target().unwrap().area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_refine_exhausted_without_candidates() {
        let space = scene(vec![]);
        let mut view = seed();
        view.search_polygons(&space, None);
        let mut anomalies = Vec::new();
        assert!(matches!(
            view.refine(&mut anomalies),
            Ok(Refinement::Exhausted)
        ));
    }

    #[test]
    fn test_split_keeps_every_candidate() {
        let space = scene(vec![
            square(2.0, 0.5, SPEAKER),
            square(4.0, 4.0, PASSIVE),
        ]);
        let mut view = seed();
        view.search_polygons(&space, None);
        let window_area = view.window().area();

        let mut anomalies = Vec::new();
        let Ok(Refinement::Split(a, b)) = view.refine(&mut anomalies) else {
            panic!("expected a split");
        };

        assert!((a.window().area() + b.window().area() - window_area).abs() < 1e-9);
        let overlap = a.window().clip_convex(b.window());
        assert!(overlap.is_none_or(|o| o.area() < 1e-9));

        let materials = |v: &View| -> Vec<u8> {
            v.visibles()
                .unwrap()
                .iter()
                .map(|r| r.window.props.material)
                .collect()
        };
        let mut union: Vec<u8> = materials(&a).into_iter().chain(materials(&b)).collect();
        union.sort();
        union.dedup();
        assert_eq!(union, vec![PASSIVE, SPEAKER]);
    }

    #[test]
    fn test_search_resolves_near_panel_in_front_of_wall() {
        let space = scene(vec![
            square(4.0, 4.0, PASSIVE),
            square(2.0, 0.5, SPEAKER),
        ]);
        let outcome = seed().search(&space, None, None);

        assert!(outcome.failures.is_empty());
        assert!(outcome.anomalies.is_empty());
        assert!(!outcome.truncated);
        for view in &outcome.resolved {
            assert!(view.is_resolved());
        }

        let speakers: Vec<&View> = outcome
            .resolved
            .iter()
            .filter(|v| v.target().unwrap().props.material == SPEAKER)
            .collect();
        assert_eq!(speakers.len(), 1);
        assert!((speakers[0].target().unwrap().area() - 1.0).abs() < 1e-9);

        // the wall is seen everywhere except behind the panel
        let footprints: f64 = outcome.resolved.iter().map(|v| v.window().area()).sum();
        assert!((footprints - 4.0).abs() < 1e-9);
        let wall_area = target_area_of(&outcome.resolved, PASSIVE);
        assert!((wall_area - (64.0 - 4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_search_partial_overlap() {
        let offset = Polygon::from_points(
            &[
                DVec3::new(0.0, -0.5, 2.0),
                DVec3::new(1.5, -0.5, 2.0),
                DVec3::new(1.5, 0.5, 2.0),
                DVec3::new(0.0, 0.5, 2.0),
            ],
            SurfaceProps::new(SPEAKER),
        )
        .unwrap();
        let space = scene(vec![offset, square(3.0, 0.75, PASSIVE)]);
        let outcome = seed().search(&space, None, None);

        assert!(outcome.failures.is_empty());
        // front panel stays whole, back panel loses its x > 0 half
        let front = target_area_of(&outcome.resolved, SPEAKER);
        assert!((front - 1.5).abs() < 1e-9);
        let back = target_area_of(&outcome.resolved, PASSIVE);
        assert!((back - 1.125).abs() < 1e-6);
    }

    #[test]
    fn test_search_respects_refinement_cap() {
        let space = scene(vec![
            square(4.0, 4.0, PASSIVE),
            square(2.0, 0.5, SPEAKER),
        ]);
        let outcome = seed().search(&space, None, Some(1));
        assert_eq!(outcome.refinements, 1);
        assert!(outcome.truncated);
        assert!(outcome.resolved.is_empty());
    }

    #[test]
    fn test_intersecting_candidates_drop_second() {
        // two large panels crossing along x = 0 inside the window. The
        // tie-break keeps the first one over the whole window even though the
        // second is in front for x < 0; flagged as suspect geometry.
        let rising = Polygon::from_points(
            &[
                DVec3::new(-10.0, -10.0, -2.0),
                DVec3::new(10.0, -10.0, 8.0),
                DVec3::new(10.0, 10.0, 8.0),
                DVec3::new(-10.0, 10.0, -2.0),
            ],
            SurfaceProps::new(SPEAKER),
        )
        .unwrap();
        let falling = Polygon::from_points(
            &[
                DVec3::new(-10.0, -10.0, 8.0),
                DVec3::new(10.0, -10.0, -2.0),
                DVec3::new(10.0, 10.0, -2.0),
                DVec3::new(-10.0, 10.0, 8.0),
            ],
            SurfaceProps::new(PASSIVE),
        )
        .unwrap();
        let space = scene(vec![rising, falling]);
        let outcome = seed().search(&space, None, None);

        assert_eq!(outcome.resolved.len(), 1);
        assert_eq!(
            outcome.resolved[0].target().unwrap().props.material,
            SPEAKER
        );
        assert!(
            outcome
                .anomalies
                .iter()
                .any(|a| matches!(a, Anomaly::IntersectingCandidates { .. }))
        );
    }

    #[test]
    fn test_interior_coplanar_reported() {
        let space = scene(vec![square(2.0, 2.0, PASSIVE), square(2.0, 0.5, SPEAKER)]);
        let mut view = seed();
        view.search_polygons(&space, None);
        let anomalies = view.remove_occluded();
        assert!(
            anomalies
                .iter()
                .any(|a| matches!(a, Anomaly::InteriorCoplanar { .. }))
        );
        assert_eq!(view.visibles().unwrap().len(), 2);
    }

    #[test]
    fn test_no_splitting_edge_is_reported_not_fatal() {
        // candidates larger than the window and offset from each other:
        // neither contains the other and none of their edges cross the window
        let window = square(1.0, 1.0, PASSIVE);
        let big = |shift: f64, z: f64, material: u8| {
            let plane = *window.plane();
            let verts = [(-3.0, -3.0), (3.0, -3.0), (3.0, 3.0), (-3.0, 3.0)]
                .iter()
                .map(|&(x, y)| crate::math::DVec2::new(x + shift, y))
                .collect();
            let footprint = Polygon::new(plane, verts, SurfaceProps::new(material)).unwrap();
            let target = footprint
                .back_project(DVec3::ZERO, square(z, 1.0, material).plane())
                .unwrap();
            Region::with_target(DVec3::ZERO, footprint, target)
        };

        let mut view = View::new(DVec3::ZERO, window.clone());
        view.visibles = Some(vec![big(0.5, 2.0, SPEAKER), big(-0.5, 3.0, PASSIVE)]);

        let outcome = view.resolve(None);
        assert!(outcome.resolved.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        let diagnostic = &outcome.failures[0];
        assert_eq!(diagnostic.candidates.len(), 2);
        assert_eq!(diagnostic.window.len(), 4);
        assert_eq!(diagnostic.comparisons.len(), 2);
    }

    #[test]
    fn test_reflect_view() {
        let space = scene(vec![square(2.0, 1.0, METAL).reverse()]);
        let outcome = seed().search(&space, None, None);
        assert_eq!(outcome.resolved.len(), 1);

        let mut arena = ViewArena::new();
        let id = arena.insert(outcome.resolved.into_iter().next().unwrap());
        let child = arena.get(id).unwrap().reflect_view(id).unwrap();

        assert_eq!(child.parent(), Some(id));
        assert_eq!(child.propagation(), Propagation::Reflected);
        assert!((child.origin() - DVec3::new(0.0, 0.0, 4.0)).length() < 1e-9);
        assert!(!child.is_resolved());

        let unresolved = seed();
        assert!(unresolved.reflect_view(id).is_none());
    }

    #[test]
    fn test_refract_view() {
        let glass = AcousticMaterial::GLASS;
        assert!(glass.is_refractive());
        let space = scene(vec![square(2.0, 1.0, 5)]);
        let outcome = seed().search(&space, None, None);

        let mut arena = ViewArena::new();
        let id = arena.insert(outcome.resolved.into_iter().next().unwrap());
        let (through, refracted) = arena.get(id).unwrap().refract_view(id).unwrap();

        assert_eq!(through.origin(), DVec3::ZERO);
        assert_eq!(through.propagation(), Propagation::Transmitted);
        assert_eq!(refracted.propagation(), Propagation::Refracted);
        // origin on the near side, directly facing the target center
        let center = DVec3::new(0.0, 0.0, 2.0);
        assert!((refracted.origin() - DVec3::new(0.0, 0.0, 0.0)).length() < 1e-9);
        assert!(refracted.window().plane().depth(refracted.origin()) < 0.0);
        assert!((refracted.window().center() - center).length() < 1e-9);
    }

    #[test]
    fn test_history_strips() {
        let mirror = Polygon::from_points(
            &[
                DVec3::new(-1.0, -1.0, 2.0),
                DVec3::new(-1.0, 1.0, 2.0),
                DVec3::new(1.0, 1.0, 2.0),
                DVec3::new(1.0, -1.0, 2.0),
            ],
            SurfaceProps::new(METAL),
        )
        .unwrap();
        let speaker = Polygon::from_points(
            &[
                DVec3::new(-0.5, -0.5, -1.0),
                DVec3::new(0.5, -0.5, -1.0),
                DVec3::new(0.5, 0.5, -1.0),
                DVec3::new(-0.5, 0.5, -1.0),
            ],
            SurfaceProps::new(SPEAKER),
        )
        .unwrap();
        let space = scene(vec![mirror, speaker]);

        let mut arena = ViewArena::new();
        let outcome = seed().search(&space, None, None);
        let mirror_view = outcome
            .resolved
            .into_iter()
            .find(|v| v.target().unwrap().props.material == METAL)
            .unwrap();
        let mirror_id = arena.insert(mirror_view);
        let child = arena.get(mirror_id).unwrap().reflect_view(mirror_id).unwrap();

        let outcome = child.search(&space, None, None);
        assert_eq!(outcome.resolved.len(), 1);
        let source_id = arena.insert(outcome.resolved.into_iter().next().unwrap());
        assert_eq!(arena.chain_len(source_id), 2);

        let source = arena.get(source_id).unwrap();
        let strips = source.history_strips(&arena);
        assert_eq!(strips.len(), 8);
        assert!(strips.iter().all(|s| s.props.ill_only));

        let added = source.show_history(&arena, &space);
        assert_eq!(added, 8);
        assert_eq!(space.illustrations().len(), 8);
    }
}
