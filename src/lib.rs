//! Exact image-source visibility for geometric acoustics.
//!
//! A [`Receiver`] placed in a polygonal scene finds every source surface it
//! can see, directly or through a bounded chain of specular reflections and
//! refractions, together with the exact unoccluded piece of that surface.
//! Visibility is computed in object space by recursively splitting convex
//! view windows along candidate edges; nothing is sampled.
//!
//! # Example
//!
//! ```
//! use echoview::math::DVec3;
//! use echoview::scene::Space;
//! use echoview::{AcousticWorld, WorldDesc};
//! use std::sync::Arc;
//!
//! let mut space = Space::with_presets();
//! space.add_box_room(DVec3::splat(-2.0), DVec3::splat(2.0), 0)?;
//! // a loudspeaker panel below the ceiling
//! space.add_surface(
//!     &[
//!         DVec3::new(-0.5, -0.5, 1.9),
//!         DVec3::new(-0.5, 0.5, 1.9),
//!         DVec3::new(0.5, 0.5, 1.9),
//!         DVec3::new(0.5, -0.5, 1.9),
//!     ],
//!     6,
//! )?;
//!
//! let world = AcousticWorld::new(Arc::new(space), WorldDesc::default())?;
//! let mut receiver = world.receiver(DVec3::ZERO, 0)?;
//! let report = receiver.search();
//! assert_eq!(report.sources.len(), 1);
//! # Ok::<(), echoview::EchoViewError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod math;
pub mod receiver;
pub mod scene;
pub mod visibility;
pub mod world;

pub use config::WorldDesc;
pub use error::{EchoViewError, Result};
pub use events::SearchEvent;
pub use receiver::{Receiver, SearchReport, SourcePath};
pub use world::{AcousticWorld, ReceiverSearch};
