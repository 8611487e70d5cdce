//! Integration: folding the front non-integrated move into shared state.
//! The same table serves both speakers, so the system's own moves are
//! integrated through exactly the machinery used for the user's.

use crate::error::EngineError;
use crate::semantics::{
    ActionInstance, DialogueMove, IcmContent, IcmLevel, IcmPolarity, Question, Speaker,
};
use crate::state::{AgendaItem, GroundingStatus, InformationState, SessionPhase, TaggedMove};

use super::{relevant_open, Rule, RuleClass, RuleContext};

pub static RULES: &[Rule] = &[
    Rule {
        name: "integrate_quit",
        class: RuleClass::Integrate,
        apply: integrate_quit,
    },
    Rule {
        name: "integrate_greet",
        class: RuleClass::Integrate,
        apply: integrate_greet,
    },
    Rule {
        name: "integrate_no_contact",
        class: RuleClass::Integrate,
        apply: integrate_no_contact,
    },
    Rule {
        name: "integrate_neg_perception",
        class: RuleClass::Integrate,
        apply: integrate_neg_perception,
    },
    Rule {
        name: "integrate_pos_perception",
        class: RuleClass::Integrate,
        apply: integrate_pos_perception,
    },
    Rule {
        name: "integrate_reject_issue",
        class: RuleClass::Integrate,
        apply: integrate_reject_issue,
    },
    Rule {
        name: "integrate_clarification_answer",
        class: RuleClass::Integrate,
        apply: integrate_clarification_answer,
    },
    Rule {
        name: "integrate_answer",
        class: RuleClass::Integrate,
        apply: integrate_answer,
    },
    Rule {
        name: "integrate_ask",
        class: RuleClass::Integrate,
        apply: integrate_ask,
    },
    Rule {
        name: "integrate_sys_answer",
        class: RuleClass::Integrate,
        apply: integrate_sys_answer,
    },
    Rule {
        name: "integrate_accept",
        class: RuleClass::Integrate,
        apply: integrate_accept,
    },
    Rule {
        name: "integrate_reject",
        class: RuleClass::Integrate,
        apply: integrate_reject,
    },
    Rule {
        name: "integrate_propose",
        class: RuleClass::Integrate,
        apply: integrate_propose,
    },
    Rule {
        name: "integrate_request",
        class: RuleClass::Integrate,
        apply: integrate_request,
    },
    Rule {
        name: "integrate_confirm",
        class: RuleClass::Integrate,
        apply: integrate_confirm,
    },
    Rule {
        name: "integrate_icm",
        class: RuleClass::Integrate,
        apply: integrate_icm,
    },
];

pub(super) fn front_cleared(state: &InformationState) -> Option<&TaggedMove> {
    state
        .nim_front()
        .filter(|m| m.grounding == GroundingStatus::Cleared)
}

fn integrate_quit(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    if front.mov != DialogueMove::Quit {
        return Ok(None);
    }
    let speaker = front.speaker;
    let mut next = state.consume_front();
    next.phase = SessionPhase::Closing;
    if speaker == Speaker::User {
        next = next.push_agenda(AgendaItem::Quit);
    }
    Ok(Some(next))
}

fn integrate_greet(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    if front.mov != DialogueMove::Greet {
        return Ok(None);
    }
    let speaker = front.speaker;
    let next = state.consume_front();
    Ok(Some(if speaker == Speaker::User {
        next.push_agenda(AgendaItem::Greet)
    } else {
        next
    }))
}

/// The no-input-within-timeout sentinel arrives as user-side negative
/// contact feedback; answer it in kind.
fn integrate_no_contact(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    match (&front.speaker, &front.mov) {
        (
            Speaker::User,
            DialogueMove::Icm {
                level: IcmLevel::Contact,
                polarity: IcmPolarity::Negative,
                ..
            },
        ) => {
            let next = state.consume_front().push_agenda(AgendaItem::Icm {
                level: IcmLevel::Contact,
                polarity: IcmPolarity::Negative,
                content: None,
            });
            Ok(Some(next))
        }
        _ => Ok(None),
    }
}

/// Negative perception feedback after a cautious commit: shared state is
/// swapped back to the stored snapshot. A value replacement, not an undo
/// log.
fn integrate_neg_perception(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let is_neg_perception = matches!(
        (&front.speaker, &front.mov),
        (
            Speaker::User,
            DialogueMove::Icm {
                level: IcmLevel::Perception,
                polarity: IcmPolarity::Negative,
                ..
            },
        )
    );
    if !is_neg_perception || state.private.backup.is_none() {
        return Ok(None);
    }
    let mut next = state.consume_front();
    if let Some(snapshot) = next.private.backup.take() {
        next.shared = snapshot;
    }
    Ok(Some(next))
}

/// Positive perception feedback firms up a cautious commit: the snapshot
/// is no longer needed.
fn integrate_pos_perception(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let is_pos_perception = matches!(
        (&front.speaker, &front.mov),
        (
            Speaker::User,
            DialogueMove::Icm {
                level: IcmLevel::Perception,
                polarity: IcmPolarity::Positive,
                ..
            },
        )
    );
    if !is_pos_perception || state.private.backup.is_none() {
        return Ok(None);
    }
    let mut next = state.consume_front();
    next.private.backup = None;
    Ok(Some(next))
}

/// The user refuses an issue outright: pop it everywhere and abandon any
/// negotiation attached to it.
fn integrate_reject_issue(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let rejected = match (&front.speaker, &front.mov) {
        (
            Speaker::User,
            DialogueMove::Icm {
                level: IcmLevel::Acceptance,
                polarity: IcmPolarity::Negative,
                content: Some(IcmContent::Question(q)),
            },
        ) => q.clone(),
        _ => return Ok(None),
    };
    let mut next = state.consume_front();
    next.shared.qud = next.shared.qud.remove(|q| q.unifiable(&rejected));
    next.shared.issues = next.shared.issues.remove(|q| q.unifiable(&rejected));
    if let Some(plan) = &next.private.plan {
        let steps = plan
            .steps
            .remove_where(|s| s.question().is_some_and(|q| q.unifiable(&rejected)));
        next.private.plan = Some(crate::semantics::Plan {
            goal: plan.goal.clone(),
            steps,
        });
    }
    next.private.iun = next.private.iun.clear();
    next.private.rejected = next.private.rejected.clear();
    next.private.proposed = next.private.proposed.clear();
    Ok(Some(next))
}

/// An answer while an alternative clarification question tops the QUD
/// picks one candidate reading.
fn integrate_clarification_answer(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let answer = match (&front.speaker, &front.mov) {
        (Speaker::User, DialogueMove::Answer(a)) => a.clone(),
        _ => return Ok(None),
    };
    let alt = match state.shared.qud.top() {
        Some(q @ Question::Alt(_)) => q.clone(),
        _ => return Ok(None),
    };
    let members = match &alt {
        Question::Alt(ms) => ms,
        _ => unreachable!(),
    };
    let chosen: Vec<&Question> = members
        .iter()
        .filter(|m| crate::domain::relevant(ctx.domain, &answer, m))
        .collect();
    if chosen.len() != 1 {
        return Ok(None);
    }
    let chosen = chosen[0].clone();
    let picked = crate::domain::combine(ctx.domain, &chosen, &answer).ok_or_else(|| {
        EngineError::DomainContract(format!(
            "combine returned nothing for relevant pair ({:?}, {:?})",
            chosen, answer
        ))
    })?;

    let mut next = state.consume_front().commit(picked);
    next.shared.qud = next.shared.qud.remove(|q| q.unifiable(&alt));
    next.shared.issues = next.shared.issues.remove(|q| q.unifiable(&alt));
    if let Some(plan) = ctx.domain.plan_for(&chosen) {
        // The clarification identified a task: load its plan and give the
        // deferred answer another chance against it.
        next = next.load_plan(plan).push_issue(chosen);
        next.private.nim = next.private.nim.map(|m| {
            if m.grounding == GroundingStatus::Deferred {
                TaggedMove {
                    grounding: GroundingStatus::Cleared,
                    ..m.clone()
                }
            } else {
                m.clone()
            }
        });
    } else {
        // The clarification settled the original content directly; the
        // deferred move is superseded.
        next.private.nim = next
            .private
            .nim
            .retain(|m| m.grounding != GroundingStatus::Deferred);
    }
    Ok(Some(next))
}

/// The central integration rule: an answer relevant to exactly one open
/// question on the QUD becomes a commitment.
fn integrate_answer(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let answer = match (&front.speaker, &front.mov) {
        (Speaker::User, DialogueMove::Answer(a)) => a.clone(),
        _ => return Ok(None),
    };
    let open = relevant_open(state, ctx.domain, &answer);
    if open.len() != 1 {
        return Ok(None);
    }
    let question = state
        .shared
        .qud
        .member(|q| q.unifiable(&open[0]))
        .cloned();
    let question = match question {
        Some(q) => q,
        None => return Ok(None), // only on the issues stack; accommodation promotes first
    };
    let prop = crate::domain::combine(ctx.domain, &question, &answer).ok_or_else(|| {
        EngineError::DomainContract(format!(
            "combine returned nothing for relevant pair ({:?}, {:?})",
            question, answer
        ))
    })?;
    Ok(Some(state.consume_front().commit(prop)))
}

/// Raising a question puts it on the local QUD and the global issues
/// stack, for either speaker.
fn integrate_ask(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let q = match &front.mov {
        DialogueMove::Ask(q) => q.clone(),
        _ => return Ok(None),
    };
    Ok(Some(
        state.consume_front().push_qud(q.clone()).push_issue(q),
    ))
}

/// The system always answers with a full proposition.
fn integrate_sys_answer(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    match (&front.speaker, &front.mov) {
        (Speaker::System, DialogueMove::Answer(crate::semantics::Answer::Full(p))) => {
            let p = p.clone();
            Ok(Some(state.consume_front().commit(p)))
        }
        _ => Ok(None),
    }
}

/// Accepting a proposal commits it and discards the losing alternatives.
fn integrate_accept(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let p = match &front.mov {
        DialogueMove::Accept(p) if state.private.iun.contains(p) => p.clone(),
        _ => return Ok(None),
    };
    let mut next = state.consume_front().commit(p);
    next.private.iun = next.private.iun.clear();
    next.private.rejected = next.private.rejected.clear();
    next.private.proposed = next.private.proposed.clear();
    Ok(Some(next))
}

/// Rejecting one proposal keeps the negotiation open: the losing proposal
/// is recorded so the counter-offer search knows what it must beat.
fn integrate_reject(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let p = match &front.mov {
        DialogueMove::Reject(p) if state.private.iun.contains(p) => p.clone(),
        _ => return Ok(None),
    };
    let mut next = state.consume_front();
    next.private.iun = next.private.iun.remove(&p);
    next.private.rejected = next.private.rejected.add(p);
    Ok(Some(next))
}

fn integrate_propose(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let p = match &front.mov {
        DialogueMove::Propose(p) => p.clone(),
        _ => return Ok(None),
    };
    let speaker = front.speaker;
    let mut next = state.consume_front();
    next.private.iun = next.private.iun.add(p.clone());
    // Only the system's own offers count as "already tried" for the
    // counter-offer search; user-floated alternatives stay available.
    if speaker == Speaker::System {
        next.private.proposed = next.private.proposed.add(p);
    }
    Ok(Some(next))
}

/// Requests are gated on the domain precondition; a failed gate is
/// conversational friction, reported as acceptance-level feedback.
fn integrate_request(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let action = match (&front.speaker, &front.mov) {
        (Speaker::User, DialogueMove::Request(a)) => a.clone(),
        _ => return Ok(None),
    };
    let next = state.consume_front();
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

fn integrate_confirm(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    match &front.mov {
        DialogueMove::Confirm(_) => Ok(Some(state.consume_front())),
        _ => Ok(None),
    }
}

/// Remaining feedback moves carry no state update beyond being heard.
fn integrate_icm(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_cleared(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    match &front.mov {
        DialogueMove::Icm { .. } => Ok(Some(state.consume_front())),
        _ => Ok(None),
    }
}
