//! Typed update rules. A rule is a named pure function: the body first
//! checks the precondition (pattern matching plus first-satisfying-binding
//! search), then builds the replacement state. `Ok(None)` means the
//! precondition failed and silently disqualifies the rule; `Err` is an
//! engine-level fault and is never swallowed.
//!
//! Within a class, declared table order IS priority order and at most one
//! rule fires per application. Tests assert on the order itself.

pub mod accommodate;
pub mod downdate;
pub mod exec_plan;
pub mod grounding;
pub mod integrate;
pub mod select;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AccommodationSource, EngineConfig};
use crate::domain::Domain;
use crate::error::EngineError;
use crate::state::InformationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleClass {
    Grounding,
    Integrate,
    Accommodate,
    Downdate,
    ExecPlan,
    SelectAction,
    SelectMove,
}

pub type RuleFn =
    fn(&InformationState, &RuleContext) -> Result<Option<InformationState>, EngineError>;

pub struct Rule {
    pub name: &'static str,
    pub class: RuleClass,
    pub apply: RuleFn,
}

pub struct RuleContext<'a> {
    pub domain: &'a dyn Domain,
    pub config: &'a EngineConfig,
}

/// The ordered rule table for a class. Accommodation is the one class
/// whose order is configuration-driven; see `apply_first`.
pub fn rules_for(class: RuleClass) -> &'static [Rule] {
    match class {
        RuleClass::Grounding => grounding::RULES,
        RuleClass::Integrate => integrate::RULES,
        RuleClass::Accommodate => accommodate::RULES,
        RuleClass::Downdate => downdate::RULES,
        RuleClass::ExecPlan => exec_plan::RULES,
        RuleClass::SelectAction => select::ACTION_RULES,
        RuleClass::SelectMove => select::MOVE_RULES,
    }
}

/// Try each rule of the class in priority order; the first whose
/// precondition holds fires, and nothing else does.
pub fn apply_first(
    class: RuleClass,
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<(&'static str, InformationState)>, EngineError> {
    if class == RuleClass::Accommodate {
        return apply_first_accommodate(state, ctx);
    }
    for rule in rules_for(class) {
        if let Some(next) = (rule.apply)(state, ctx)? {
            debug!(class = ?class, rule = rule.name, "rule fired");
            return Ok(Some((rule.name, next)));
        }
    }
    Ok(None)
}

/// Accommodation search order comes from configuration (it is an open
/// question in the theory); each source maps onto its rules in declared
/// order.
fn apply_first_accommodate(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<(&'static str, InformationState)>, EngineError> {
    for source in &ctx.config.accommodation_order {
        for rule in accommodate::rules_for_source(*source) {
            if let Some(next) = (rule.apply)(state, ctx)? {
                debug!(class = ?RuleClass::Accommodate, rule = rule.name, "rule fired");
                return Ok(Some((rule.name, next)));
            }
        }
    }
    Ok(None)
}

/// Distinct open questions (QUD first, then global issues) the answer is
/// relevant to. Polar answers are elliptical on the QUD top only: "yes"
/// never addresses anything but the most salient polar question.
pub(crate) fn relevant_open(
    state: &InformationState,
    domain: &dyn Domain,
    answer: &crate::semantics::Answer,
) -> Vec<crate::semantics::Question> {
    use crate::semantics::{Answer, Question};
    if let Answer::Polar(_) = answer {
        return match state.shared.qud.top() {
            Some(q @ Question::YesNo(_)) => vec![q.clone()],
            _ => vec![],
        };
    }
    state
        .open_questions()
        .into_iter()
        .filter(|q| crate::domain::relevant(domain, answer, q))
        .cloned()
        .collect()
}

/// Apply the class until no rule fires. Exceeding the configured cap is a
/// bug in the rule set and raises, it never silently stops.
pub fn apply_fixpoint(
    class: RuleClass,
    state: InformationState,
    ctx: &RuleContext,
) -> Result<InformationState, EngineError> {
    let limit = ctx.config.max_rule_iterations;
    let mut current = state;
    for _ in 0..limit {
        match apply_first(class, &current, ctx)? {
            Some((_, next)) => current = next,
            None => return Ok(current),
        }
    }
    Err(EngineError::FixpointDiverged { class, limit })
}
