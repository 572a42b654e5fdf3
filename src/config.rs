//! Configuration for echoview

use crate::error::{EchoViewError, Result};

/// Search budget and receiver settings shared by every receiver of a world.
#[derive(Debug, Clone)]
pub struct WorldDesc {
    /// Number of propagation rounds. Round 1 covers direct visibility, every
    /// further round follows one more reflection or refraction.
    pub max_rounds: usize,
    /// Edge length of the cube whose six faces seed a receiver's views.
    pub cube_size: f64,
    /// Cap on `refine` calls within a single view search (`None` = unbounded).
    pub max_refinements: Option<usize>,
    /// Worker threads used by `AcousticWorld::search_receivers`.
    pub worker_threads: usize,
    /// Add every resolved window to the scene as illustration geometry.
    pub show_projections: bool,
}

impl Default for WorldDesc {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            cube_size: 0.1,
            max_refinements: Some(100_000),
            worker_threads: 4,
            show_projections: false,
        }
    }
}

impl WorldDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn cube_size(mut self, size: f64) -> Self {
        self.cube_size = size;
        self
    }

    pub fn max_refinements(mut self, max: Option<usize>) -> Self {
        self.max_refinements = max;
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn show_projections(mut self, show: bool) -> Self {
        self.show_projections = show;
        self
    }

    /// Checks that the settings describe a runnable search.
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(EchoViewError::Configuration(
                "max_rounds must be at least 1".into(),
            ));
        }
        if !(self.cube_size.is_finite() && self.cube_size > 0.0) {
            return Err(EchoViewError::Configuration(format!(
                "cube_size must be positive and finite, got {}",
                self.cube_size
            )));
        }
        if self.max_refinements == Some(0) {
            return Err(EchoViewError::Configuration(
                "max_refinements must be at least 1 when set".into(),
            ));
        }
        if self.worker_threads == 0 {
            return Err(EchoViewError::Configuration(
                "worker_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
