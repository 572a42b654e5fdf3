//! Receiver-driven image-source search.
//!
//! A receiver seeds one view per face of a small cube around its position,
//! then runs rounds: every pending view is searched, resolved views are kept
//! in the receiver's arena, views resolving to a source are recorded, and
//! reflective or refractive targets queue child views for the next round.

use crate::config::WorldDesc;
use crate::error::{EchoViewError, Result};
use crate::events::SearchEvent;
use crate::geometry::Polygon;
use crate::math::DVec3;
use crate::scene::{Material, SceneGeometry};
use crate::visibility::{SplitDiagnostic, View, ViewArena, ViewId};
use crossbeam_channel::{Sender, unbounded};
use std::collections::VecDeque;
use std::sync::Arc;

/// Result of one `Receiver::search` call.
#[derive(Debug, Default)]
pub struct SearchReport {
    /// Source views found by this call
    pub sources: Vec<ViewId>,
    /// Views resolved by this call, sources included
    pub resolved_count: usize,
    pub failures: Vec<SplitDiagnostic>,
    /// Views were still pending when the round budget ran out, or a view
    /// search hit its refinement cap
    pub truncated: bool,
}

/// A source seen by the receiver, directly or through a chain of
/// reflections and refractions.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePath {
    pub view: ViewId,
    /// Origin of the source view: the receiver for direct paths, its mirror
    /// image after reflections
    pub image_origin: DVec3,
    /// Visible part of the source surface
    pub target: Polygon,
    /// Reflections and refractions along the chain
    pub hops: usize,
    /// From `image_origin` to the target center
    pub distance: f64,
    /// Energy kept per band (400 Hz, 2.5 KHz, 15 KHz)
    pub attenuation: [f32; 3],
}

pub struct Receiver {
    origin: DVec3,
    scene: Arc<dyn SceneGeometry>,
    desc: WorldDesc,
    pending: VecDeque<View>,
    arena: ViewArena,
    sources: Vec<ViewId>,
    rounds: usize,
    event_sender: Sender<SearchEvent>,
    event_receiver: crossbeam_channel::Receiver<SearchEvent>,
}

impl Receiver {
    /// Creates a receiver at `origin`. `material` is the material index of the
    /// seed cube faces.
    ///
    /// # Errors
    ///
    /// Fails if `desc` does not validate or `material` is not in the scene's
    /// material table.
    pub fn new(
        scene: Arc<dyn SceneGeometry>,
        origin: DVec3,
        material: u8,
        desc: WorldDesc,
    ) -> Result<Self> {
        desc.validate()?;
        if scene.material(material).is_none() {
            return Err(EchoViewError::InvalidMaterial(format!(
                "receiver material index {} is not in the table",
                material
            )));
        }

        let pending: VecDeque<View> = scene
            .cube(origin, desc.cube_size, material, true)
            .into_iter()
            .map(|face| View::new(origin, face))
            .collect();
        log::debug!("Receiver at {:?}: {} seed views", origin, pending.len());

        let (event_sender, event_receiver) = unbounded();
        Ok(Self {
            origin,
            scene,
            desc,
            pending,
            arena: ViewArena::new(),
            sources: Vec::new(),
            rounds: 0,
            event_sender,
            event_receiver,
        })
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn desc(&self) -> &WorldDesc {
        &self.desc
    }

    /// Every resolved view found so far.
    pub fn arena(&self) -> &ViewArena {
        &self.arena
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.arena.get(id)
    }

    /// Source views found so far, in discovery order.
    pub fn sources(&self) -> &[ViewId] {
        &self.sources
    }

    /// Views waiting for the next round.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Rounds run so far, over all `search` calls.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Runs up to `max_rounds` rounds. Views still pending afterwards are
    /// kept; calling `search` again continues with them.
    pub fn search(&mut self) -> SearchReport {
        let mut report = SearchReport::default();

        for _ in 0..self.desc.max_rounds {
            if self.pending.is_empty() {
                break;
            }
            self.rounds += 1;
            let round = self.rounds;

            let mut resolved = Vec::new();
            while let Some(view) = self.pending.pop_front() {
                let outcome =
                    view.search(self.scene.as_ref(), None, self.desc.max_refinements);
                report.truncated |= outcome.truncated;

                for anomaly in outcome.anomalies {
                    self.emit(SearchEvent::from_anomaly(round, anomaly));
                }
                for failure in outcome.failures {
                    self.emit(SearchEvent::SplitFailed {
                        round,
                        origin: failure.origin,
                        candidates: failure.candidates.len(),
                    });
                    report.failures.push(failure);
                }
                resolved.extend(outcome.resolved);
            }

            report.resolved_count += resolved.len();
            let round_sources = report.sources.len();
            for view in resolved {
                self.accept(view, round, &mut report);
            }

            let found = report.sources.len() - round_sources;
            log::info!(
                "Round {}: {} views resolved, {} sources, {} views queued",
                round,
                report.resolved_count,
                found,
                self.pending.len()
            );
            self.emit(SearchEvent::RoundCompleted {
                round,
                resolved: report.resolved_count,
                sources: found,
            });
        }

        if !self.pending.is_empty() {
            log::debug!(
                "Round budget exhausted with {} views pending",
                self.pending.len()
            );
            report.truncated = true;
            self.emit(SearchEvent::BudgetExhausted {
                pending: self.pending.len(),
            });
        }

        report
    }

    fn accept(&mut self, view: View, round: usize, report: &mut SearchReport) {
        if self.desc.show_projections {
            let mut shown = view.window().offset(round as f64);
            shown.props.ill_only = true;
            self.scene.add_poly(shown);
        }

        let Some(material) = view
            .target()
            .and_then(|target| self.scene.material(target.props.material))
            .copied()
        else {
            return;
        };

        let id = self.arena.insert(view);
        let Some(view) = self.arena.get(id) else {
            return;
        };

        if material.is_source() {
            log::debug!("Source view {} found in round {}", id, round);
            self.sources.push(id);
            report.sources.push(id);
            self.emit(SearchEvent::SourceFound { view: id, round });
        }

        if material.is_reflective() {
            self.pending.extend(view.reflect_view(id));
        } else if material.is_refractive() {
            if let Some((through, refracted)) = view.refract_view(id) {
                self.pending.push_back(through);
                self.pending.push_back(refracted);
            }
        }
    }

    fn emit(&self, event: SearchEvent) {
        // receiving end is owned by `self`
        let _ = self.event_sender.send(event);
    }

    /// Drains the events reported since the last call.
    pub fn poll_events(&self) -> Vec<SearchEvent> {
        self.event_receiver.try_iter().collect()
    }

    /// Summaries of every source view found so far.
    pub fn source_paths(&self) -> Vec<SourcePath> {
        self.sources
            .iter()
            .filter_map(|&id| self.source_path(id))
            .collect()
    }

    fn source_path(&self, id: ViewId) -> Option<SourcePath> {
        let view = self.arena.get(id)?;
        let target = view.target()?.clone();

        let mut attenuation = [1.0f32; 3];
        let mut hops = 0;
        for ancestor in self.arena.ancestry(id).skip(1) {
            hops += 1;
            let Some(material) = self
                .arena
                .get(ancestor)
                .and_then(View::target)
                .and_then(|t| self.scene.material(t.props.material))
            else {
                continue;
            };
            let factor = if material.is_reflective() {
                material.reflectance()
            } else if material.is_refractive() {
                material.transmission
            } else {
                continue;
            };
            for (band, f) in attenuation.iter_mut().zip(factor) {
                *band *= f;
            }
        }

        Some(SourcePath {
            view: id,
            image_origin: view.origin(),
            distance: view.origin().distance(target.center()),
            target,
            hops,
            attenuation,
        })
    }

    /// Side strips of a source view's propagation chain.
    pub fn history(&self, id: ViewId) -> Result<Vec<Polygon>> {
        let view = self.arena.get(id).ok_or(EchoViewError::UnknownView(id))?;
        Ok(view.history_strips(&self.arena))
    }

    /// Adds `history(id)` to the scene as illustration geometry.
    pub fn show_history(&self, id: ViewId) -> Result<usize> {
        let view = self.arena.get(id).ok_or(EchoViewError::UnknownView(id))?;
        Ok(view.show_history(&self.arena, self.scene.as_ref()))
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("origin", &self.origin)
            .field("pending", &self.pending.len())
            .field("resolved", &self.arena.len())
            .field("sources", &self.sources.len())
            .field("rounds", &self.rounds)
            .finish()
    }
}
