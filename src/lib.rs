//! Issue-based dialogue management as a library: an information-state
//! update engine with a questions-under-discussion stack, grounding
//! postures, accommodation, negotiation and rollback-safe action
//! execution. Hosts supply the domain knowledge and the NLU/NLG/device
//! collaborators; the engine owns the dialogue reasoning.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod rules;
pub mod semantics;
pub mod state;

pub use config::EngineConfig;
pub use engine::{DialogueMoveEngine, Input, TurnDriver, TurnOutput};
pub use error::EngineError;
