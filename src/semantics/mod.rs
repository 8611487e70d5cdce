pub mod moves;
pub mod plan;
pub mod proposition;
pub mod question;

pub use moves::{DialogueMove, IcmContent, IcmLevel, IcmPolarity, Speaker};
pub use plan::{Action, ActionInstance, ActionOutcome, ActionStatus, Plan, PlanStep};
pub use proposition::{Proposition, Value};
pub use question::{Answer, Question};
