//! External collaborator contracts. These are the only effectful seams of
//! the engine; each call is awaited to completion before rule evaluation
//! resumes, so a turn never interleaves.

use crate::semantics::{Action, ActionOutcome, DialogueMove, Proposition, Speaker};
use crate::state::InformationState;

/// A dialogue move as delivered by the interpreter, scored with its
/// evidential confidence (0.0 to 1.0). The score drives the grounding
/// posture.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMove {
    pub mov: DialogueMove,
    pub confidence: f32,
}

impl ScoredMove {
    pub fn new(mov: DialogueMove, confidence: f32) -> Self {
        Self { mov, confidence }
    }
}

/// Natural-language understanding. Returning an empty list means "nothing
/// usable" and routes to the failed-followup branch; returning `Err`
/// means the collaborator itself broke and is surfaced as an engine
/// error, never defaulted into some move category.
#[allow(async_fn_in_trait)]
pub trait Nlu {
    async fn interpret(
        &mut self,
        utterance: &str,
        speaker: Speaker,
        state: &InformationState,
    ) -> anyhow::Result<Vec<ScoredMove>>;
}

/// Natural-language generation for the turn's outgoing moves.
#[allow(async_fn_in_trait)]
pub trait Nlg {
    async fn generate(
        &mut self,
        moves: &[DialogueMove],
        state: &InformationState,
    ) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub outcome: ActionOutcome,
    /// Facts learned from execution (e.g. a looked-up price). These go to
    /// private beliefs; the domain-declared postconditions are what enter
    /// the commitment set.
    pub postconditions: Vec<Proposition>,
    pub error: Option<String>,
}

impl ActionResult {
    pub fn success(postconditions: Vec<Proposition>) -> Self {
        Self {
            outcome: ActionOutcome::Success,
            postconditions,
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            outcome: ActionOutcome::Failure,
            postconditions: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Real-world side effects live behind this trait.
#[allow(async_fn_in_trait)]
pub trait Device {
    async fn execute(
        &mut self,
        action: &Action,
        state: &InformationState,
    ) -> anyhow::Result<ActionResult>;
}
