//! The domain contract: everything the engine knows about predicates,
//! sorts, plans and actions comes through this read-only trait. Supplied
//! by the host, consumed pure.

use crate::semantics::{Action, Answer, Plan, Proposition, Question};
use crate::state::Set;

pub trait Domain: Send + Sync {
    /// Does this answer fully settle the question?
    fn resolves(&self, answer: &Answer, question: &Question) -> bool;

    /// Build the proposition expressed by giving `answer` to `question`.
    /// `None` means the pair is ill-typed; the engine treats `None` for a
    /// pair it was told is relevant as a contract violation.
    fn combine(&self, question: &Question, answer: &Answer) -> Option<Proposition>;

    /// Is the answer about this question at all (even partially)?
    fn relevant(&self, answer: &Answer, question: &Question) -> bool;

    /// The dialogue plan for handling an issue, if the domain has one.
    fn plan_for(&self, question: &Question) -> Option<Plan>;

    /// The plan catalogue: every top-level issue the domain has a plan
    /// for. Accommodation searches this when an answer matches no open
    /// question.
    fn tasks(&self) -> Vec<Question>;

    /// Gate on the action queue. `Err` carries the reason reported back
    /// to the user.
    fn precond(&self, action: &Action, commitments: &Set<Proposition>) -> Result<(), String>;

    /// Postconditions committed on success and subtracted exactly on
    /// rollback.
    fn postcond(&self, action: &Action) -> Vec<Proposition>;

    /// Critical actions require explicit confirmation before execution.
    fn critical(&self, _action: &Action) -> bool {
        false
    }

    /// Per-predicate dominance ("better than"). No registration means no
    /// known dominance.
    fn dominates(&self, _a: &Proposition, _b: &Proposition) -> bool {
        false
    }
}

/// Relevance with the structural cases the engine owns: polar answers
/// address polar questions, full propositions address the matching polar
/// question, and an answer addresses an alternative question through its
/// members. Everything else is the domain's call.
pub fn relevant(domain: &dyn Domain, answer: &Answer, question: &Question) -> bool {
    match (answer, question) {
        (Answer::Polar(_), Question::YesNo(_)) => true,
        (Answer::Full(p), Question::YesNo(target)) if p.same_atom(target) => true,
        (_, Question::Alt(members)) => members.iter().any(|m| relevant(domain, answer, m)),
        _ => domain.relevant(answer, question),
    }
}

/// Combination with the structural cases handled before delegating.
pub fn combine(domain: &dyn Domain, question: &Question, answer: &Answer) -> Option<Proposition> {
    match (question, answer) {
        (Question::YesNo(p), Answer::Polar(true)) => Some(p.clone()),
        (Question::YesNo(p), Answer::Polar(false)) => Some(p.negated()),
        (Question::YesNo(target), Answer::Full(p)) if p.same_atom(target) => Some(p.clone()),
        _ => domain.combine(question, answer),
    }
}

/// Is the question settled by the commitment set?
pub fn resolved(domain: &dyn Domain, question: &Question, com: &Set<Proposition>) -> bool {
    match question {
        Question::YesNo(p) => com.contains(p) || com.contains(&p.negated()),
        Question::Alt(members) => members.iter().any(|m| resolved(domain, m, com)),
        Question::Wh { .. } => com
            .iter()
            .any(|p| p.positive && domain.resolves(&Answer::Full(p.clone()), question)),
    }
}
