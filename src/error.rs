use crate::rules::RuleClass;
use thiserror::Error;

/// Engine-level failures. Conversational friction (irrelevant answers,
/// rejected questions, failed actions) is never an error: it is modeled as
/// moves and rollback data inside the rule system. Everything here must be
/// surfaced loudly, never defaulted away.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The NLU collaborator itself failed (distinct from "parsed nothing",
    /// which routes to the failed-followup branch).
    #[error("nlu collaborator failed: {0}")]
    Nlu(#[source] anyhow::Error),

    #[error("nlg collaborator failed: {0}")]
    Nlg(#[source] anyhow::Error),

    #[error("device collaborator failed: {0}")]
    Device(#[source] anyhow::Error),

    /// The domain returned something ill-typed (e.g. `combine` failed on a
    /// pair it declared relevant). Programmer error; never guessed around.
    #[error("domain contract violation: {0}")]
    DomainContract(String),

    /// Malformed information state detected during rule dispatch.
    #[error("invalid information state: {0}")]
    InvalidState(String),

    /// A rule class kept firing past the iteration cap. Indicates a
    /// non-terminating rule interaction, which is a bug in the rule set.
    #[error("rule class {class:?} exceeded {limit} iterations without reaching a fixpoint")]
    FixpointDiverged { class: RuleClass, limit: usize },
}
