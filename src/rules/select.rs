//! Selection: first choose communicative goals onto the agenda
//! (`SelectAction`), then drain the agenda into outgoing dialogue moves
//! (`SelectMove`).

use crate::error::EngineError;
use crate::semantics::{
    ActionStatus, Answer, DialogueMove, IcmContent, IcmLevel, IcmPolarity, Question, Speaker,
};
use crate::state::{AgendaItem, InformationState};

use super::{Rule, RuleClass, RuleContext};

pub static ACTION_RULES: &[Rule] = &[
    Rule {
        name: "select_mark_confirmed",
        class: RuleClass::SelectAction,
        apply: select_mark_confirmed,
    },
    Rule {
        name: "select_cancel_action",
        class: RuleClass::SelectAction,
        apply: select_cancel_action,
    },
    Rule {
        name: "select_confirm_ask",
        class: RuleClass::SelectAction,
        apply: select_confirm_ask,
    },
    Rule {
        name: "select_counter_propose",
        class: RuleClass::SelectAction,
        apply: select_counter_propose,
    },
    Rule {
        name: "select_respond",
        class: RuleClass::SelectAction,
        apply: select_respond,
    },
    Rule {
        name: "select_reject_unanswerable",
        class: RuleClass::SelectAction,
        apply: select_reject_unanswerable,
    },
];

pub static MOVE_RULES: &[Rule] = &[
    Rule {
        name: "select_icm",
        class: RuleClass::SelectMove,
        apply: select_icm,
    },
    Rule {
        name: "select_greet",
        class: RuleClass::SelectMove,
        apply: select_greet,
    },
    Rule {
        name: "select_quit",
        class: RuleClass::SelectMove,
        apply: select_quit,
    },
    Rule {
        name: "select_ask",
        class: RuleClass::SelectMove,
        apply: select_ask,
    },
    Rule {
        name: "select_answer",
        class: RuleClass::SelectMove,
        apply: select_answer,
    },
    Rule {
        name: "select_propose",
        class: RuleClass::SelectMove,
        apply: select_propose,
    },
    Rule {
        name: "select_reject",
        class: RuleClass::SelectMove,
        apply: select_reject,
    },
    Rule {
        name: "select_confirm",
        class: RuleClass::SelectMove,
        apply: select_confirm,
    },
    Rule {
        name: "select_drop_stale",
        class: RuleClass::SelectMove,
        apply: select_drop_stale,
    },
];

/// The user said yes to the confirmation question: front action may run.
fn select_mark_confirmed(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match state.private.actions.front() {
        Some(a) => a,
        None => return Ok(None),
    };
    if front.status != ActionStatus::Pending || !ctx.domain.critical(&front.action) {
        return Ok(None);
    }
    let confirm = front.action.confirmation_prop();
    if !state.shared.com.contains(&confirm) {
        return Ok(None);
    }
    let confirmed = front.with_status(ActionStatus::Confirmed);
    let mut next = state.clone();
    let (_, rest) = next.private.actions.pop_front();
    next.private.actions = rest.push_front(confirmed);
    Ok(Some(next))
}

/// The user said no: the action never runs.
fn select_cancel_action(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match state.private.actions.front() {
        Some(a) => a,
        None => return Ok(None),
    };
    if front.status != ActionStatus::Pending || !ctx.domain.critical(&front.action) {
        return Ok(None);
    }
    let declined = front.action.confirmation_prop().negated();
    if !state.shared.com.contains(&declined) {
        return Ok(None);
    }
    let name = front.action.name.clone();
    let mut next = state.clone();
    let (_, rest) = next.private.actions.pop_front();
    next.private.actions = rest;
    Ok(Some(next.push_agenda(AgendaItem::Icm {
        level: IcmLevel::Acceptance,
        polarity: IcmPolarity::Negative,
        content: Some(IcmContent::Text(format!("{} will not be performed", name))),
    })))
}

/// Critical actions are gated behind an explicit polar question.
fn select_confirm_ask(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match state.private.actions.front() {
        Some(a) => a,
        None => return Ok(None),
    };
    if front.status != ActionStatus::Pending || !ctx.domain.critical(&front.action) {
        return Ok(None);
    }
    let confirm = front.action.confirmation_prop();
    if state.shared.com.contains(&confirm) || state.shared.com.contains(&confirm.negated()) {
        return Ok(None);
    }
    let q = Question::YesNo(confirm);
    if state.shared.qud.member(|x| x.unifiable(&q)).is_some()
        || state.private.agenda.contains(&AgendaItem::Findout(q.clone()))
    {
        return Ok(None);
    }
    Ok(Some(state.push_agenda(AgendaItem::Findout(q))))
}

/// Counter-offer: fires exactly when the domain declares dominance for a
/// rejected proposal's predicate and some untried alternative dominates
/// it.
fn select_counter_propose(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    for rejected in state.private.rejected.iter() {
        let alternative = state.private.iun.iter().find(|alt| {
            !state.private.rejected.contains(alt)
                && !state.private.proposed.contains(alt)
                && ctx.domain.dominates(alt, rejected)
        });
        if let Some(alt) = alternative {
            let alt = alt.clone();
            let mut next = state.clone();
            next.private.proposed = next.private.proposed.add(alt.clone());
            return Ok(Some(next.push_agenda(AgendaItem::Propose(alt))));
        }
    }
    Ok(None)
}

/// Answer an open question the private beliefs settle.
fn select_respond(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    for q in state.shared.qud.iter() {
        let answer = state.private.beliefs.iter().find(|b| {
            b.positive
                && !state.shared.com.contains(b)
                && ctx.domain.resolves(&Answer::Full((*b).clone()), q)
        });
        if answer.is_some() {
            let item = AgendaItem::Respond(q.clone());
            if state.private.agenda.contains(&item) {
                continue;
            }
            return Ok(Some(state.push_agenda(item)));
        }
    }
    Ok(None)
}

/// A question the user just asked that the system can neither answer nor
/// plan for is declined, not ignored.
fn select_reject_unanswerable(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    if state.shared.lu.speaker != Speaker::User {
        return Ok(None);
    }
    for mov in &state.shared.lu.moves {
        let q = match mov {
            DialogueMove::Ask(q) => q,
            _ => continue,
        };
        if state.shared.qud.member(|x| x.unifiable(q)).is_none() {
            continue;
        }
        // A question with proposals on the table is being negotiated, not
        // left unanswered.
        let negotiated = state
            .private
            .iun
            .iter()
            .any(|p| ctx.domain.resolves(&Answer::Full(p.clone()), q));
        if negotiated {
            continue;
        }
        let answerable = state
            .private
            .beliefs
            .iter()
            .any(|b| b.positive && ctx.domain.resolves(&Answer::Full(b.clone()), q));
        let plannable = ctx.domain.plan_for(q).is_some()
            || state
                .private
                .plan
                .as_ref()
                .is_some_and(|p| p.goal.unifiable(q) || !p.steps.is_empty());
        if answerable || plannable {
            continue;
        }
        let q = q.clone();
        let mut next = state.clone();
        next.shared.qud = next.shared.qud.remove(|x| x.unifiable(&q));
        next.shared.issues = next.shared.issues.remove(|x| x.unifiable(&q));
        return Ok(Some(next.push_agenda(AgendaItem::Icm {
            level: IcmLevel::Acceptance,
            polarity: IcmPolarity::Negative,
            content: Some(IcmContent::Question(q)),
        })));
    }
    Ok(None)
}

fn pop_agenda(state: &InformationState) -> (Option<AgendaItem>, InformationState) {
    let mut next = state.clone();
    let (front, rest) = next.private.agenda.pop_front();
    next.private.agenda = rest;
    (front, next)
}

fn emit(mut state: InformationState, mov: DialogueMove) -> InformationState {
    state.private.outgoing = state.private.outgoing.push_back(mov);
    state
}

fn select_icm(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.private.agenda.front() {
        Some(AgendaItem::Icm {
            level,
            polarity,
            content,
        }) => {
            let mov = DialogueMove::Icm {
                level: *level,
                polarity: *polarity,
                content: content.clone(),
            };
            let (_, next) = pop_agenda(state);
            Ok(Some(emit(next, mov)))
        }
        _ => Ok(None),
    }
}

fn select_greet(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.private.agenda.front() {
        Some(AgendaItem::Greet) => {
            let (_, next) = pop_agenda(state);
            Ok(Some(emit(next, DialogueMove::Greet)))
        }
        _ => Ok(None),
    }
}

fn select_quit(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.private.agenda.front() {
        Some(AgendaItem::Quit) => {
            let (_, next) = pop_agenda(state);
            Ok(Some(emit(next, DialogueMove::Quit)))
        }
        _ => Ok(None),
    }
}

fn select_ask(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let q = match state.private.agenda.front() {
        Some(AgendaItem::Findout(q)) | Some(AgendaItem::Raise(q)) => q.clone(),
        _ => return Ok(None),
    };
    let (_, next) = pop_agenda(state);
    // The question may have been settled after the goal was agendaed.
    if crate::domain::resolved(ctx.domain, &q, &state.shared.com) {
        return Ok(Some(next));
    }
    Ok(Some(emit(next, DialogueMove::Ask(q))))
}

/// Respond goals become full answers; the proposition comes from the
/// belief that resolves the question.
fn select_answer(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let q = match state.private.agenda.front() {
        Some(AgendaItem::Respond(q)) => q.clone(),
        _ => return Ok(None),
    };
    let belief = state
        .private
        .beliefs
        .iter()
        .find(|b| b.positive && ctx.domain.resolves(&Answer::Full((*b).clone()), &q))
        .cloned();
    let belief = match belief {
        Some(b) => b,
        None => return Ok(None), // stale goal; the fallback rule drops it
    };
    let (_, next) = pop_agenda(state);
    Ok(Some(emit(next, DialogueMove::Answer(Answer::Full(belief)))))
}

fn select_propose(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.private.agenda.front() {
        Some(AgendaItem::Propose(p)) => {
            let mov = DialogueMove::Propose(p.clone());
            let (_, next) = pop_agenda(state);
            Ok(Some(emit(next, mov)))
        }
        _ => Ok(None),
    }
}

fn select_reject(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.private.agenda.front() {
        Some(AgendaItem::RejectProp(p)) => {
            let mov = DialogueMove::Reject(p.clone());
            let (_, next) = pop_agenda(state);
            Ok(Some(emit(next, mov)))
        }
        _ => Ok(None),
    }
}

fn select_confirm(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.private.agenda.front() {
        Some(AgendaItem::ConfirmAction(a)) => {
            let mov = DialogueMove::Confirm(a.clone());
            let (_, next) = pop_agenda(state);
            Ok(Some(emit(next, mov)))
        }
        _ => Ok(None),
    }
}

/// A goal no earlier rule could realize (e.g. a respond whose belief was
/// retracted) is dropped so the drain terminates.
fn select_drop_stale(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match state.private.agenda.front() {
        Some(_) => {
            let (_, next) = pop_agenda(state);
            Ok(Some(next))
        }
        None => Ok(None),
    }
}
