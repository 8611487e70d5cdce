//! The turn engine: interpret, integrate-and-accommodate to fixpoint,
//! select, execute, generate. All dialogue reasoning is synchronous rule
//! application over one immutable information state; the collaborators
//! are the only await points.

mod actions;
mod collaborators;
mod driver;

pub use collaborators::{ActionResult, Device, Nlg, Nlu, ScoredMove};
pub use driver::TurnDriver;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::domain::Domain;
use crate::error::EngineError;
use crate::rules::{self, RuleClass, RuleContext};
use crate::semantics::{DialogueMove, IcmContent, IcmLevel, IcmPolarity, Speaker};
use crate::state::{
    AgendaItem, GroundingStatus, InformationState, LatestUtterance, Queue, SessionPhase,
    TaggedMove,
};

/// One user turn, as the driver hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Utterance(String),
    /// No input arrived within the configured window.
    Silence,
}

/// What the engine produced for the turn.
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// Realized text, absent when the system chose to say nothing.
    pub utterance: Option<String>,
    pub moves: Vec<DialogueMove>,
    /// The session reached its closing phase; the driver should stop.
    pub closing: bool,
}

pub struct DialogueMoveEngine<N, G, D> {
    domain: Arc<dyn Domain>,
    config: EngineConfig,
    nlu: N,
    nlg: G,
    device: D,
    state: InformationState,
}

impl<N, G, D> DialogueMoveEngine<N, G, D> {
    pub fn new(domain: Arc<dyn Domain>, config: EngineConfig, nlu: N, nlg: G, device: D) -> Self {
        Self {
            domain,
            config,
            nlu,
            nlg,
            device,
            state: InformationState::new(),
        }
    }

    pub fn state(&self) -> &InformationState {
        &self.state
    }

    /// Restore a persisted session. The state is a plain value, so this is
    /// all it takes.
    pub fn replace_state(&mut self, state: InformationState) {
        self.state = state;
    }

    fn ctx(&self) -> RuleContext<'_> {
        RuleContext {
            domain: self.domain.as_ref(),
            config: &self.config,
        }
    }

    fn fixpoint(
        &self,
        class: RuleClass,
        state: InformationState,
    ) -> Result<InformationState, EngineError> {
        rules::apply_fixpoint(class, state, &self.ctx())
    }

    /// Work the non-integrated move queue until nothing actionable is left.
    /// Parked entries (deferred or awaiting verification) stay queued; the
    /// queue rotates so one stuck move never starves the rest. A cleared
    /// move that a full rotation can neither integrate nor accommodate is
    /// dropped with explicit negative understanding feedback.
    fn integrate_loop(
        &self,
        mut state: InformationState,
    ) -> Result<InformationState, EngineError> {
        let ctx = self.ctx();
        let limit = self.config.max_rule_iterations;
        let mut stuck = 0usize;
        for _ in 0..limit {
            let actionable = state
                .private
                .nim
                .iter()
                .filter(|m| {
                    matches!(
                        m.grounding,
                        GroundingStatus::Ungrounded | GroundingStatus::Cleared
                    )
                })
                .count();
            if actionable == 0 {
                return Ok(state);
            }
            let mut rotations = 0;
            while !matches!(
                state.nim_front().map(|m| m.grounding),
                Some(GroundingStatus::Ungrounded | GroundingStatus::Cleared)
            ) {
                state.private.nim = state.private.nim.rotate();
                rotations += 1;
                if rotations > state.private.nim.len() {
                    return Err(EngineError::InvalidState(
                        "actionable move unreachable in the move queue".into(),
                    ));
                }
            }

            if state.nim_front().map(|m| m.grounding) == Some(GroundingStatus::Ungrounded) {
                match rules::apply_first(RuleClass::Grounding, &state, &ctx)? {
                    Some((_, next)) => {
                        state = next;
                        stuck = 0;
                        continue;
                    }
                    None => {
                        return Err(EngineError::InvalidState(
                            "no grounding rule classified the front move".into(),
                        ))
                    }
                }
            }

            if let Some((_, next)) = rules::apply_first(RuleClass::Integrate, &state, &ctx)? {
                state = rules::apply_fixpoint(RuleClass::Downdate, next, &ctx)?;
                state = rules::apply_fixpoint(RuleClass::ExecPlan, state, &ctx)?;
                state = rules::apply_fixpoint(RuleClass::Downdate, state, &ctx)?;
                stuck = 0;
                continue;
            }
            if let Some((_, next)) = rules::apply_first(RuleClass::Accommodate, &state, &ctx)? {
                state = next;
                stuck = 0;
                continue;
            }

            stuck += 1;
            if stuck >= actionable {
                // Every actionable entry refused both integration and
                // accommodation; keeping them would loop forever.
                let dropped = state.nim_front().cloned();
                state = state.consume_front();
                if let Some(m) = dropped {
                    warn!(mov = ?m.mov, "move neither integrated nor accommodated, dropping");
                    state = state.push_agenda(AgendaItem::Icm {
                        level: IcmLevel::Understanding,
                        polarity: IcmPolarity::Negative,
                        content: Some(IcmContent::Move(Box::new(m.mov))),
                    });
                }
                stuck = 0;
            } else {
                state.private.nim = state.private.nim.rotate();
            }
        }
        Err(EngineError::FixpointDiverged {
            class: RuleClass::Integrate,
            limit,
        })
    }
}

impl<N: Nlu, G: Nlg, D: Device> DialogueMoveEngine<N, G, D> {
    /// Run one full turn. The engine state is only replaced when the whole
    /// turn succeeds; a collaborator error leaves it exactly as it was.
    pub async fn process_turn(&mut self, input: Input) -> Result<TurnOutput, EngineError> {
        let mut state = self.state.clone();
        state.private.outgoing = Queue::new();
        let mut followup_only = false;

        match input {
            Input::Utterance(text) => {
                debug!(%text, "interpreting utterance");
                let scored = self
                    .nlu
                    .interpret(&text, Speaker::User, &state)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "nlu failed");
                        EngineError::Nlu(e)
                    })?;
                if scored.is_empty() {
                    warn!(%text, "interpretation produced no moves");
                    state = state.push_agenda(AgendaItem::Icm {
                        level: IcmLevel::Perception,
                        polarity: IcmPolarity::Negative,
                        content: None,
                    });
                    if let Some(q) = state.shared.qud.top().cloned() {
                        state = state.push_agenda(AgendaItem::Raise(q));
                    }
                    followup_only = true;
                } else {
                    state.shared.lu = LatestUtterance {
                        speaker: Speaker::User,
                        moves: scored.iter().map(|s| s.mov.clone()).collect(),
                    };
                    for s in scored {
                        state = state.enqueue_move(TaggedMove::user(s.mov, s.confidence));
                    }
                }
            }
            Input::Silence => {
                debug!("input window elapsed");
                state = state.enqueue_user_icm(IcmLevel::Contact, IcmPolarity::Negative);
            }
        }

        if !followup_only {
            state = self.integrate_loop(state)?;
            state = self.fixpoint(RuleClass::SelectAction, state)?;
            state = actions::execute_ready(&mut self.device, self.domain.as_ref(), state).await?;
            state = self.fixpoint(RuleClass::Downdate, state)?;
            state = self.fixpoint(RuleClass::ExecPlan, state)?;
        }
        state = self.fixpoint(RuleClass::SelectMove, state)?;

        let mut moves = Vec::new();
        loop {
            let (front, rest) = state.private.outgoing.pop_front();
            state.private.outgoing = rest;
            match front {
                Some(m) => moves.push(m),
                None => break,
            }
        }

        let utterance = if moves.is_empty() {
            None
        } else {
            let text = self.nlg.generate(&moves, &state).await.map_err(|e| {
                error!(error = %e, "nlg failed");
                EngineError::Nlg(e)
            })?;
            Some(text)
        };

        if !moves.is_empty() {
            // The system grounds its own moves through the same queue, so
            // asking a question really does put it on the shared QUD.
            for m in &moves {
                state = state.enqueue_move(TaggedMove::system(m.clone()));
            }
            state = self.integrate_loop(state)?;
            state.shared.lu = LatestUtterance {
                speaker: Speaker::System,
                moves: moves.clone(),
            };
        }

        let closing = state.phase == SessionPhase::Closing;
        info!(moves = moves.len(), closing, "turn complete");
        self.state = state;
        Ok(TurnOutput {
            utterance,
            moves,
            closing,
        })
    }
}
