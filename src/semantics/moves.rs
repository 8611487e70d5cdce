use serde::{Deserialize, Serialize};

use super::plan::Action;
use super::proposition::Proposition;
use super::question::{Answer, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    System,
}

/// ICM (interactive communication management) feedback operates at one of
/// four action levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcmLevel {
    Contact,
    Perception,
    Understanding,
    Acceptance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcmPolarity {
    Positive,
    Negative,
    /// Checking feedback ("did you mean ...?"), expects a polar answer.
    Interrogative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcmContent {
    Prop(Proposition),
    Question(Question),
    Move(Box<DialogueMove>),
    Text(String),
}

/// The atomic communicative unit. Closed union: adding a variant forces
/// every dispatch site to be revisited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueMove {
    Greet,
    Quit,
    Ask(Question),
    Answer(Answer),
    Request(Action),
    /// Reports successful completion of an action.
    Confirm(Action),
    Propose(Proposition),
    Accept(Proposition),
    Reject(Proposition),
    Icm {
        level: IcmLevel,
        polarity: IcmPolarity,
        content: Option<IcmContent>,
    },
}

impl DialogueMove {
    pub fn icm(level: IcmLevel, polarity: IcmPolarity, content: Option<IcmContent>) -> Self {
        DialogueMove::Icm {
            level,
            polarity,
            content,
        }
    }

    /// Coarse move kind, used to pick the grounding threshold band.
    pub fn kind(&self) -> MoveKind {
        match self {
            DialogueMove::Ask(_) => MoveKind::Ask,
            DialogueMove::Answer(_) => MoveKind::Answer,
            DialogueMove::Request(_) => MoveKind::Request,
            _ => MoveKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    Ask,
    Answer,
    Request,
    Other,
}
