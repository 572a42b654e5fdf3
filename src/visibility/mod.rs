//! Exact visibility through convex windows.
//!
//! [`Region`] holds the geometric predicates, [`View`] the partition
//! algorithm built on them, and [`ViewArena`] the resolved views of one
//! receiver linked into reflection/refraction chains.

mod arena;
mod region;
mod view;

pub use arena::{ViewArena, ViewId};
pub use region::{Comparison, Region, SplitEdge};
pub use view::{
    Anomaly, PairComparison, Propagation, Refinement, SearchOutcome, SplitDiagnostic, View,
};
