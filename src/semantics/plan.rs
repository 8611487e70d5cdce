use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::proposition::{Proposition, Value};
use super::question::Question;
use crate::state::containers::Stack;

/// A domain-level operation. Identity is structural; lifecycle state lives
/// on the `ActionInstance` queued for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub params: Vec<Value>,
}

impl Action {
    pub fn new(name: &str, params: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }

    /// The polar proposition the engine asks about before executing a
    /// critical action. Handled structurally, so domains never need to
    /// know the reserved predicate.
    pub fn confirmation_prop(&self) -> Proposition {
        let mut args = vec![Value::ind(&self.name)];
        args.extend(self.params.iter().cloned());
        Proposition::new("confirmed_action", args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    Pending,
    Confirmed,
    Executed(ActionOutcome),
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInstance {
    pub id: Uuid,
    pub action: Action,
    pub status: ActionStatus,
}

impl ActionInstance {
    pub fn pending(action: Action) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            status: ActionStatus::Pending,
        }
    }

    pub fn with_status(&self, status: ActionStatus) -> Self {
        Self {
            id: self.id,
            action: self.action.clone(),
            status,
        }
    }
}

/// One step of a dialogue plan, consumed top-down. A step is removed once
/// its question is resolved (or its action has been dispatched).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStep {
    /// Ask and insist until resolved.
    Findout(Question),
    /// Ask once, do not insist.
    Raise(Question),
    /// Answer from private beliefs once an answer is available.
    Respond(Question),
    Perform(Action),
}

impl PlanStep {
    pub fn question(&self) -> Option<&Question> {
        match self {
            PlanStep::Findout(q) | PlanStep::Raise(q) | PlanStep::Respond(q) => Some(q),
            PlanStep::Perform(_) => None,
        }
    }
}

/// The active plan: the goal issue it was loaded for plus the remaining
/// step stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub goal: Question,
    pub steps: Stack<PlanStep>,
}

impl Plan {
    pub fn new(goal: Question, steps: Vec<PlanStep>) -> Self {
        // First declared step must end up on top.
        let stack = steps.into_iter().rev().fold(Stack::new(), |s, step| s.push(step));
        Self { goal, steps: stack }
    }
}
