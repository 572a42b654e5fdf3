//! Event types for echoview

use crate::math::DVec3;
use crate::visibility::{Anomaly, ViewId};

/// Progress and problems reported by a receiver search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    SourceFound {
        view: ViewId,
        round: usize,
    },
    InteriorCoplanar {
        round: usize,
        inner: Vec<DVec3>,
        outer: Vec<DVec3>,
    },
    IntersectingCandidates {
        round: usize,
        kept: Vec<DVec3>,
        dropped: Vec<DVec3>,
    },
    SplitFailed {
        round: usize,
        origin: DVec3,
        candidates: usize,
    },
    RoundCompleted {
        round: usize,
        resolved: usize,
        sources: usize,
    },
    BudgetExhausted {
        pending: usize,
    },
}

impl SearchEvent {
    pub(crate) fn from_anomaly(round: usize, anomaly: Anomaly) -> Self {
        match anomaly {
            Anomaly::InteriorCoplanar { inner, outer } => Self::InteriorCoplanar {
                round,
                inner,
                outer,
            },
            Anomaly::IntersectingCandidates { kept, dropped } => Self::IntersectingCandidates {
                round,
                kept,
                dropped,
            },
        }
    }

    pub fn round(&self) -> Option<usize> {
        match self {
            Self::SourceFound { round, .. }
            | Self::InteriorCoplanar { round, .. }
            | Self::IntersectingCandidates { round, .. }
            | Self::SplitFailed { round, .. }
            | Self::RoundCompleted { round, .. } => Some(*round),
            Self::BudgetExhausted { .. } => None,
        }
    }

    /// Scene defects and lost views.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::InteriorCoplanar { .. }
                | Self::IntersectingCandidates { .. }
                | Self::SplitFailed { .. }
        )
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            Self::InteriorCoplanar { .. } | Self::IntersectingCandidates { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_classification() {
        let found = SearchEvent::SourceFound {
            view: ViewId::new(3),
            round: 2,
        };
        assert_eq!(found.round(), Some(2));
        assert!(!found.is_error());

        let anomaly = SearchEvent::from_anomaly(
            1,
            Anomaly::IntersectingCandidates {
                kept: vec![DVec3::ZERO],
                dropped: vec![DVec3::X],
            },
        );
        assert!(anomaly.is_error());
        assert!(anomaly.is_anomaly());
        assert_eq!(anomaly.round(), Some(1));

        let failed = SearchEvent::SplitFailed {
            round: 1,
            origin: DVec3::ZERO,
            candidates: 2,
        };
        assert!(failed.is_error() && !failed.is_anomaly());
        assert_eq!(SearchEvent::BudgetExhausted { pending: 4 }.round(), None);
    }
}
