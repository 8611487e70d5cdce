//! Downdate: popping questions that the commitment set now settles.
//! Idempotent by construction; running it on an already-downdated state
//! finds nothing to pop.

use crate::domain::resolved;
use crate::error::EngineError;
use crate::state::InformationState;

use super::{Rule, RuleClass, RuleContext};

pub static RULES: &[Rule] = &[
    Rule {
        name: "downdate_qud",
        class: RuleClass::Downdate,
        apply: downdate_qud,
    },
    Rule {
        name: "downdate_issues",
        class: RuleClass::Downdate,
        apply: downdate_issues,
    },
];

fn downdate_qud(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.shared.qud.top() {
        Some(q) if resolved(ctx.domain, q, &state.shared.com) => {
            let mut next = state.clone();
            let (_, rest) = next.shared.qud.pop();
            next.shared.qud = rest;
            Ok(Some(next))
        }
        _ => Ok(None),
    }
}

fn downdate_issues(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.shared.issues.top() {
        Some(q) if resolved(ctx.domain, q, &state.shared.com) => {
            let mut next = state.clone();
            let (_, rest) = next.shared.issues.pop();
            next.shared.issues = rest;
            Ok(Some(next))
        }
        _ => Ok(None),
    }
}
