use serde::{Deserialize, Serialize};

use super::containers::{OpenStack, Queue, Set, Stack};
use crate::semantics::{
    Action, ActionInstance, DialogueMove, IcmContent, IcmLevel, IcmPolarity, Plan, PlanStep,
    Proposition, Question, Speaker,
};

/// Where a not-yet-integrated move stands with respect to grounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundingStatus {
    /// Fresh from the interpreter; posture not yet classified.
    Ungrounded,
    /// Safe to integrate.
    Cleared,
    /// Pessimistic posture: held back until the user confirms the
    /// understanding check.
    AwaitingVerification,
    /// Parked behind a clarification question (ambiguous answer).
    Deferred,
}

/// A dialogue move queued for integration, tagged with its originating
/// speaker and the interpreter's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedMove {
    pub speaker: Speaker,
    pub mov: DialogueMove,
    pub confidence: f32, // 0.0 to 1.0
    pub grounding: GroundingStatus,
}

impl TaggedMove {
    pub fn user(mov: DialogueMove, confidence: f32) -> Self {
        Self {
            speaker: Speaker::User,
            mov,
            confidence,
            grounding: GroundingStatus::Ungrounded,
        }
    }

    pub fn system(mov: DialogueMove) -> Self {
        Self {
            speaker: Speaker::System,
            mov,
            confidence: 1.0,
            grounding: GroundingStatus::Ungrounded,
        }
    }
}

/// A communicative goal placed on the agenda by the selection rules, later
/// drained into outgoing dialogue moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgendaItem {
    Greet,
    Quit,
    Findout(Question),
    Raise(Question),
    Respond(Question),
    Propose(Proposition),
    RejectProp(Proposition),
    ConfirmAction(Action),
    Icm {
        level: IcmLevel,
        polarity: IcmPolarity,
        content: Option<IcmContent>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestUtterance {
    pub speaker: Speaker,
    pub moves: Vec<DialogueMove>,
}

impl Default for LatestUtterance {
    fn default() -> Self {
        Self {
            speaker: Speaker::System,
            moves: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Active,
    Closing,
}

/// Local state, never transmitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Private {
    pub plan: Option<Plan>,
    pub agenda: Queue<AgendaItem>,
    pub beliefs: Set<Proposition>,
    /// Non-integrated moves.
    pub nim: Queue<TaggedMove>,
    pub actions: Queue<ActionInstance>,
    /// Finished instances with their terminal status, oldest first.
    pub completed: Queue<ActionInstance>,
    /// Issues under negotiation: competing proposals for one issue.
    pub iun: Set<Proposition>,
    /// Proposals the other party has turned down (for counter-offer search).
    pub rejected: Set<Proposition>,
    /// Proposals already put forward, so nothing is offered twice.
    pub proposed: Set<Proposition>,
    /// Snapshot of shared state taken just before the latest cautious
    /// commit; restoring it is a value swap. Discarded as soon as any
    /// user move other than perception feedback grounds.
    pub backup: Option<Shared>,
    /// Moves selected this turn, drained by the generation phase.
    pub outgoing: Queue<DialogueMove>,
}

/// Mutually believed state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shared {
    pub com: Set<Proposition>,
    pub qud: OpenStack<Question>,
    pub issues: OpenStack<Question>,
    pub lu: LatestUtterance,
}

/// The aggregate root. Created once per session; every rule produces a
/// replacement value, the engine owns the single live reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationState {
    pub phase: SessionPhase,
    pub private: Private,
    pub shared: Shared,
}

impl Default for InformationState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Active,
            private: Private::default(),
            shared: Shared::default(),
        }
    }
}

impl InformationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nim_front(&self) -> Option<&TaggedMove> {
        self.private.nim.front()
    }

    /// Replacement state with the front NIM entry consumed.
    pub fn consume_front(&self) -> Self {
        let mut next = self.clone();
        let (_, rest) = next.private.nim.pop_front();
        next.private.nim = rest;
        next
    }

    /// Replacement state with the front NIM entry's grounding status
    /// changed in place (same queue position).
    pub fn mark_front(&self, grounding: GroundingStatus) -> Self {
        let mut next = self.clone();
        let (front, rest) = next.private.nim.pop_front();
        if let Some(mut m) = front {
            m.grounding = grounding;
            next.private.nim = rest.push_front(m);
        }
        next
    }

    pub fn push_agenda(&self, item: AgendaItem) -> Self {
        let mut next = self.clone();
        next.private.agenda = next.private.agenda.push_back(item);
        next
    }

    pub fn commit(&self, prop: Proposition) -> Self {
        let mut next = self.clone();
        next.shared.com = next.shared.com.add(prop);
        next
    }

    pub fn push_qud(&self, q: Question) -> Self {
        let mut next = self.clone();
        next.shared.qud = next.shared.qud.push_promote(q, Question::unifiable);
        next
    }

    pub fn push_issue(&self, q: Question) -> Self {
        let mut next = self.clone();
        next.shared.issues = next.shared.issues.push_promote(q, Question::unifiable);
        next
    }

    pub fn load_plan(&self, plan: Plan) -> Self {
        let mut next = self.clone();
        next.private.plan = Some(plan);
        next
    }

    pub fn plan_steps(&self) -> impl Iterator<Item = &PlanStep> {
        self.private.plan.iter().flat_map(|p| p.steps.iter())
    }

    pub fn plan_top(&self) -> Option<&PlanStep> {
        self.private.plan.as_ref().and_then(|p| p.steps.top())
    }

    /// Replacement state with the top plan step removed.
    pub fn pop_plan_step(&self) -> Self {
        let mut next = self.clone();
        if let Some(plan) = &next.private.plan {
            let (_, rest) = plan.steps.pop();
            next.private.plan = Some(Plan {
                goal: plan.goal.clone(),
                steps: rest,
            });
        }
        next
    }

    /// All open questions, QUD first (top-down), then global issues not
    /// unifiable with anything already seen.
    pub fn open_questions(&self) -> Vec<&Question> {
        let mut out: Vec<&Question> = Vec::new();
        for q in self.shared.qud.iter().chain(self.shared.issues.iter()) {
            if !out.iter().any(|seen| seen.unifiable(q)) {
                out.push(q);
            }
        }
        out
    }

    /// True if some NIM entry is held back awaiting an understanding check.
    pub fn awaiting_verification(&self) -> Option<&TaggedMove> {
        self.private
            .nim
            .iter()
            .find(|m| m.grounding == GroundingStatus::AwaitingVerification)
    }

    pub fn enqueue_move(&self, tagged: TaggedMove) -> Self {
        let mut next = self.clone();
        next.private.nim = next.private.nim.push_back(tagged);
        next
    }

    /// Convenience used by the timeout sentinel and tests.
    pub fn enqueue_user_icm(&self, level: IcmLevel, polarity: IcmPolarity) -> Self {
        self.enqueue_move(TaggedMove::user(
            DialogueMove::icm(level, polarity, None),
            1.0,
        ))
    }

    /// Snapshot for session persistence. The transparent containers make
    /// the round-trip exact.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
