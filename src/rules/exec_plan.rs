//! Plan execution: advancing the active plan stack and loading a plan for
//! a freshly raised issue.

use crate::domain::resolved;
use crate::error::EngineError;
use crate::semantics::{ActionInstance, Answer, IcmContent, IcmLevel, IcmPolarity, PlanStep};
use crate::state::{AgendaItem, InformationState};

use super::{Rule, RuleClass, RuleContext};

pub static RULES: &[Rule] = &[
    Rule {
        name: "exec_step_resolved",
        class: RuleClass::ExecPlan,
        apply: exec_step_resolved,
    },
    Rule {
        name: "exec_perform",
        class: RuleClass::ExecPlan,
        apply: exec_perform,
    },
    Rule {
        name: "exec_respond",
        class: RuleClass::ExecPlan,
        apply: exec_respond,
    },
    Rule {
        name: "exec_findout",
        class: RuleClass::ExecPlan,
        apply: exec_findout,
    },
    Rule {
        name: "exec_raise",
        class: RuleClass::ExecPlan,
        apply: exec_raise,
    },
    Rule {
        name: "load_plan",
        class: RuleClass::ExecPlan,
        apply: load_plan,
    },
];

fn on_qud(state: &InformationState, q: &crate::semantics::Question) -> bool {
    state.shared.qud.member(|x| x.unifiable(q)).is_some()
}

/// A step whose question the commitments already settle is spent.
fn exec_step_resolved(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.plan_top().and_then(|s| s.question()) {
        Some(q) if resolved(ctx.domain, q, &state.shared.com) => {
            Ok(Some(state.pop_plan_step()))
        }
        _ => Ok(None),
    }
}

/// A `perform` step moves its action onto the queue if the precondition
/// holds; a failed gate is reported, not thrown.
fn exec_perform(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let action = match state.plan_top() {
        Some(PlanStep::Perform(a)) => a.clone(),
        _ => return Ok(None),
    };
    let next = state.pop_plan_step();
    match ctx.domain.precond(&action, &next.shared.com) {
        Ok(()) => {
            let mut next = next;
            next.private.actions = next.private.actions.push_back(ActionInstance::pending(action));
            Ok(Some(next))
        }
        Err(reason) => Ok(Some(next.push_agenda(AgendaItem::Icm {
            level: IcmLevel::Acceptance,
            polarity: IcmPolarity::Negative,
            content: Some(IcmContent::Text(reason)),
        }))),
    }
}

/// A `respond` step fires once a private belief actually answers it.
fn exec_respond(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let q = match state.plan_top() {
        Some(PlanStep::Respond(q)) => q.clone(),
        _ => return Ok(None),
    };
    let answerable = state
        .private
        .beliefs
        .iter()
        .any(|b| b.positive && ctx.domain.resolves(&Answer::Full(b.clone()), &q));
    if !answerable {
        return Ok(None);
    }
    Ok(Some(state.pop_plan_step().push_agenda(AgendaItem::Respond(q))))
}

/// A `findout` step keeps insisting: the step stays on the plan until the
/// question is resolved, but the goal is only agendaed while the question
/// is neither open nor already queued.
fn exec_findout(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let q = match state.plan_top() {
        Some(PlanStep::Findout(q)) => q.clone(),
        _ => return Ok(None),
    };
    if on_qud(state, &q) || state.private.agenda.contains(&AgendaItem::Findout(q.clone())) {
        return Ok(None);
    }
    Ok(Some(state.push_agenda(AgendaItem::Findout(q))))
}

/// A `raise` step asks once and does not insist.
fn exec_raise(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let q = match state.plan_top() {
        Some(PlanStep::Raise(q)) => q.clone(),
        _ => return Ok(None),
    };
    if on_qud(state, &q) {
        return Ok(None);
    }
    Ok(Some(state.pop_plan_step().push_agenda(AgendaItem::Raise(q))))
}

/// An unresolved open issue with a domain plan and no active plan for it:
/// load the plan.
fn load_plan(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let busy = state
        .private
        .plan
        .as_ref()
        .is_some_and(|p| !p.steps.is_empty());
    if busy {
        return Ok(None);
    }
    for q in state.open_questions() {
        if resolved(ctx.domain, q, &state.shared.com) {
            continue;
        }
        if state
            .private
            .plan
            .as_ref()
            .is_some_and(|p| p.goal.unifiable(q))
        {
            continue; // already worked this issue; an empty plan stays spent
        }
        if let Some(plan) = ctx.domain.plan_for(q) {
            let q = q.clone();
            return Ok(Some(state.load_plan(plan).push_issue(q)));
        }
    }
    Ok(None)
}
