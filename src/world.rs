//! World API for echoview

use crate::config::WorldDesc;
use crate::error::{EchoViewError, Result};
use crate::math::DVec3;
use crate::receiver::{Receiver, SearchReport};
use crate::scene::SceneGeometry;
use crossbeam_channel::unbounded;
use std::sync::Arc;

/// A finished receiver together with the report of its search.
#[derive(Debug)]
pub struct ReceiverSearch {
    pub receiver: Receiver,
    pub report: SearchReport,
}

/// Shared scene plus the settings every receiver is created with.
///
/// # Architecture
///
/// - **Caller thread**: owns the world, builds receivers, collects results
/// - **Worker threads**: scoped threads pulling receivers from a job queue
///   and running their search
///
/// The scene is only read during a search, apart from illustration geometry
/// whose appends the scene serializes.
pub struct AcousticWorld {
    desc: WorldDesc,
    scene: Arc<dyn SceneGeometry>,
}

impl AcousticWorld {
    pub fn new(scene: Arc<dyn SceneGeometry>, desc: WorldDesc) -> Result<Self> {
        desc.validate()?;
        Ok(Self { desc, scene })
    }

    pub fn desc(&self) -> &WorldDesc {
        &self.desc
    }

    pub fn scene(&self) -> &Arc<dyn SceneGeometry> {
        &self.scene
    }

    /// Receiver at `origin` whose seed cube uses material `material`.
    pub fn receiver(&self, origin: DVec3, material: u8) -> Result<Receiver> {
        Receiver::new(self.scene.clone(), origin, material, self.desc.clone())
    }

    /// Creates one receiver per origin and searches them on the worker pool.
    /// Results come back in the order of `origins`.
    ///
    /// # Errors
    ///
    /// Fails before any search runs if a receiver cannot be created, and
    /// with `EchoViewError::Worker` if a worker stopped without reporting.
    pub fn search_receivers(&self, origins: &[DVec3], material: u8) -> Result<Vec<ReceiverSearch>> {
        let receivers = origins
            .iter()
            .map(|&origin| self.receiver(origin, material))
            .collect::<Result<Vec<_>>>()?;
        let count = receivers.len();

        let (job_sender, job_receiver) = unbounded();
        let (result_sender, result_receiver) = unbounded();
        for job in receivers.into_iter().enumerate() {
            job_sender
                .send(job)
                .map_err(|e| EchoViewError::Worker(format!("Failed to queue receiver: {}", e)))?;
        }
        drop(job_sender);

        let workers = self.desc.worker_threads.min(count);
        log::debug!("Searching {} receivers on {} workers", count, workers);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let jobs = job_receiver.clone();
                let results = result_sender.clone();
                scope.spawn(move || {
                    for (index, mut receiver) in jobs.iter() {
                        let report = receiver.search();
                        if results.send((index, ReceiverSearch { receiver, report })).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_sender);

        let mut finished: Vec<(usize, ReceiverSearch)> = result_receiver.iter().collect();
        if finished.len() != count {
            return Err(EchoViewError::Worker(format!(
                "{} of {} receiver searches did not finish",
                count - finished.len(),
                count
            )));
        }
        finished.sort_by_key(|(index, _)| *index);

        Ok(finished.into_iter().map(|(_, search)| search).collect())
    }
}

impl std::fmt::Debug for AcousticWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcousticWorld")
            .field("desc", &self.desc)
            .field("polygons", &self.scene.polygons().len())
            .finish()
    }
}
