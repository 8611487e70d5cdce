//! Accommodation: finding a home for an answer that matches nothing on
//! the local QUD. The search order across sources is configurable; within
//! a source the declared rule order holds.

use crate::config::AccommodationSource;
use crate::error::EngineError;
use crate::semantics::{Answer, DialogueMove, PlanStep, Question, Speaker};
use crate::state::{AgendaItem, GroundingStatus, InformationState, TaggedMove};

use super::integrate::front_cleared;
use super::{Rule, RuleClass, RuleContext};

pub static RULES: &[Rule] = &[
    Rule {
        name: "accommodate_issues",
        class: RuleClass::Accommodate,
        apply: accommodate_issues,
    },
    Rule {
        name: "accommodate_plan",
        class: RuleClass::Accommodate,
        apply: accommodate_plan,
    },
    Rule {
        name: "accommodate_commitments",
        class: RuleClass::Accommodate,
        apply: accommodate_commitments,
    },
    Rule {
        name: "accommodate_domain_plan",
        class: RuleClass::Accommodate,
        apply: accommodate_domain_plan,
    },
    Rule {
        name: "accommodate_domain_clarify",
        class: RuleClass::Accommodate,
        apply: accommodate_domain_clarify,
    },
];

pub fn rules_for_source(source: AccommodationSource) -> &'static [Rule] {
    match source {
        AccommodationSource::Issues => &RULES[0..1],
        AccommodationSource::Plan => &RULES[1..2],
        AccommodationSource::Commitments => &RULES[2..3],
        AccommodationSource::DomainCatalogue => &RULES[3..5],
    }
}

fn orphan_answer(state: &InformationState) -> Option<(&TaggedMove, &Answer)> {
    let front = front_cleared(state)?;
    match (&front.speaker, &front.mov) {
        (Speaker::User, DialogueMove::Answer(a)) => Some((front, a)),
        _ => None,
    }
}

fn on_qud(state: &InformationState, q: &Question) -> bool {
    state.shared.qud.member(|x| x.unifiable(q)).is_some()
}

/// A matching issue already raised globally: re-promote it to the local
/// QUD so integration can fire.
fn accommodate_issues(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let (_, answer) = match orphan_answer(state) {
        Some(x) => x,
        None => return Ok(None),
    };
    let question = state
        .shared
        .issues
        .iter()
        .find(|q| !on_qud(state, q) && crate::domain::relevant(ctx.domain, answer, q))
        .cloned();
    match question {
        Some(q) => Ok(Some(state.push_qud(q))),
        None => Ok(None),
    }
}

/// A question the active plan was going to ask anyway: the user got there
/// first.
fn accommodate_plan(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let (_, answer) = match orphan_answer(state) {
        Some(x) => x,
        None => return Ok(None),
    };
    let question = state
        .plan_steps()
        .filter_map(|s| match s {
            PlanStep::Findout(q) | PlanStep::Raise(q) => Some(q),
            _ => None,
        })
        .find(|q| !on_qud(state, q) && crate::domain::relevant(ctx.domain, answer, q))
        .cloned();
    match question {
        Some(q) => Ok(Some(state.push_qud(q.clone()).push_issue(q))),
        None => Ok(None),
    }
}

/// Reaccommodation: the answer revises an already-resolved issue. The
/// contradicted commitment is retracted and its question reopened, so the
/// new answer integrates on the next pass.
fn accommodate_commitments(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let (_, answer) = match orphan_answer(state) {
        Some(x) => x,
        None => return Ok(None),
    };
    for committed in state.shared.com.iter().filter(|p| p.positive) {
        let question = match question_for_predicate(ctx, &committed.predicate) {
            Some(q) => q,
            None => continue,
        };
        if on_qud(state, &question)
            || !ctx.domain.resolves(&Answer::Full(committed.clone()), &question)
            || !crate::domain::relevant(ctx.domain, answer, &question)
        {
            continue;
        }
        let revised = match crate::domain::combine(ctx.domain, &question, answer) {
            Some(p) => p,
            None => continue,
        };
        if revised == *committed {
            continue;
        }
        let mut next = state.clone();
        next.shared.com = next.shared.com.remove(committed);
        let next = next.push_qud(question.clone()).push_issue(question);
        return Ok(Some(next));
    }
    Ok(None)
}

/// Look the predicate's question up in the plan catalogue rather than
/// inventing sorts the domain never declared.
fn question_for_predicate(ctx: &RuleContext, predicate: &str) -> Option<Question> {
    for task in ctx.domain.tasks() {
        let plan = match ctx.domain.plan_for(&task) {
            Some(p) => p,
            None => continue,
        };
        for step in plan.steps.iter() {
            if let Some(q @ Question::Wh { predicate: p, .. }) = step.question() {
                if p == predicate {
                    return Some(q.clone());
                }
            }
        }
    }
    None
}

/// All domain tasks whose plan contains a question the orphan answer
/// resolves, paired with that question.
fn matching_tasks(
    state: &InformationState,
    ctx: &RuleContext,
    answer: &Answer,
) -> Vec<(Question, Question)> {
    let mut out = Vec::new();
    for task in ctx.domain.tasks() {
        if crate::domain::resolved(ctx.domain, &task, &state.shared.com) {
            continue;
        }
        let plan = match ctx.domain.plan_for(&task) {
            Some(p) => p,
            None => continue,
        };
        let hit = plan.steps.iter().find_map(|s| match s.question() {
            Some(q) if crate::domain::relevant(ctx.domain, answer, q) => Some(q.clone()),
            _ => None,
        });
        if let Some(q) = hit {
            out.push((task, q));
        }
    }
    out
}

/// Exactly one domain task explains the orphan answer: the user is
/// pursuing that goal. Load the plan and open the sub-question they just
/// answered.
fn accommodate_domain_plan(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let (_, answer) = match orphan_answer(state) {
        Some(x) => x,
        None => return Ok(None),
    };
    let mut matches = matching_tasks(state, ctx, answer);
    if matches.len() != 1 {
        return Ok(None);
    }
    let (task, sub) = matches.remove(0);
    let plan = ctx
        .domain
        .plan_for(&task)
        .ok_or_else(|| EngineError::DomainContract(format!("task {:?} lost its plan", task)))?;
    let next = state
        .load_plan(plan)
        .push_issue(task)
        .push_qud(sub.clone())
        .push_issue(sub);
    Ok(Some(next))
}

/// Two or more tasks match equally well: never guess. Raise an
/// alternative clarification question over the candidate goals and park
/// the answer.
fn accommodate_domain_clarify(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let (_, answer) = match orphan_answer(state) {
        Some(x) => x,
        None => return Ok(None),
    };
    let matches = matching_tasks(state, ctx, answer);
    if matches.len() < 2 {
        return Ok(None);
    }
    let candidates: Vec<Question> = matches.into_iter().map(|(task, _)| task).collect();
    let next = state
        .mark_front(GroundingStatus::Deferred)
        .push_agenda(AgendaItem::Findout(Question::Alt(candidates)));
    Ok(Some(next))
}
