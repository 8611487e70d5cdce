use serde::{Deserialize, Serialize};

use crate::semantics::moves::MoveKind;
use crate::semantics::DialogueMove;

/// Grounding posture band for one move type. Confidence below `cautious`
/// is pessimistic, at or above `optimistic` is optimistic, in between is
/// cautious (commit with a backup snapshot).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub cautious: f32,
    pub optimistic: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingPolicy {
    pub ask: Band,
    pub answer: Band,
    pub request: Band,
    pub other: Band,
}

impl Default for GroundingPolicy {
    fn default() -> Self {
        Self {
            ask: Band {
                cautious: 0.4,
                optimistic: 0.8,
            },
            answer: Band {
                cautious: 0.5,
                optimistic: 0.85,
            },
            // Requests have side effects, so the bar is higher.
            request: Band {
                cautious: 0.6,
                optimistic: 0.9,
            },
            other: Band {
                cautious: 0.3,
                optimistic: 0.7,
            },
        }
    }
}

impl GroundingPolicy {
    pub fn band_for(&self, mov: &DialogueMove) -> Band {
        match mov.kind() {
            MoveKind::Ask => self.ask,
            MoveKind::Answer => self.answer,
            MoveKind::Request => self.request,
            MoveKind::Other => self.other,
        }
    }
}

/// Where accommodation looks for a home for an orphaned answer. The order
/// is provisional in the underlying theory, so it stays configurable
/// rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccommodationSource {
    Issues,
    Plan,
    Commitments,
    DomainCatalogue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub grounding: GroundingPolicy,
    pub accommodation_order: Vec<AccommodationSource>,
    /// Cap on rule applications per fixpoint; exceeding it is an engine
    /// error, not a silent stop.
    pub max_rule_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grounding: GroundingPolicy::default(),
            accommodation_order: vec![
                AccommodationSource::Issues,
                AccommodationSource::Plan,
                AccommodationSource::Commitments,
                AccommodationSource::DomainCatalogue,
            ],
            max_rule_iterations: 256,
        }
    }
}
