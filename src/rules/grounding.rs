//! Grounding posture classification and the understanding subdialogue.
//!
//! Runs on the front NIM entry while it is still `Ungrounded`. Exactly one
//! rule applies to any ungrounded front move; a front move none of these
//! rules covers indicates a malformed state.

use crate::error::EngineError;
use crate::semantics::{Answer, DialogueMove, IcmContent, IcmLevel, IcmPolarity, Question, Speaker};
use crate::state::{AgendaItem, GroundingStatus, InformationState, TaggedMove};

use super::{relevant_open, Rule, RuleClass, RuleContext};

pub static RULES: &[Rule] = &[
    Rule {
        name: "ground_system_move",
        class: RuleClass::Grounding,
        apply: ground_system_move,
    },
    Rule {
        name: "ground_verification_positive",
        class: RuleClass::Grounding,
        apply: ground_verification_positive,
    },
    Rule {
        name: "ground_verification_negative",
        class: RuleClass::Grounding,
        apply: ground_verification_negative,
    },
    Rule {
        name: "clarify_ambiguous_answer",
        class: RuleClass::Grounding,
        apply: clarify_ambiguous_answer,
    },
    Rule {
        name: "ground_pessimistic",
        class: RuleClass::Grounding,
        apply: ground_pessimistic,
    },
    Rule {
        name: "ground_cautious",
        class: RuleClass::Grounding,
        apply: ground_cautious,
    },
    Rule {
        name: "ground_optimistic",
        class: RuleClass::Grounding,
        apply: ground_optimistic,
    },
];

fn front_ungrounded(state: &InformationState) -> Option<&TaggedMove> {
    state
        .nim_front()
        .filter(|m| m.grounding == GroundingStatus::Ungrounded)
}

fn is_perception_icm(mov: &DialogueMove) -> bool {
    matches!(
        mov,
        DialogueMove::Icm {
            level: IcmLevel::Perception,
            ..
        }
    )
}

/// A cautious-commit snapshot is only good for the perception feedback
/// that immediately follows it. Any other user move outdates it: keeping
/// it around would let a late negative perception roll shared state back
/// past commitments made in between.
fn expire_backup(state: &InformationState, mov: &DialogueMove) -> InformationState {
    let mut next = state.clone();
    if !is_perception_icm(mov) {
        next.private.backup = None;
    }
    next
}

/// The system's own moves need no evidential check.
fn ground_system_move(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    match front_ungrounded(state) {
        Some(m) if m.speaker == Speaker::System => {
            Ok(Some(state.mark_front(GroundingStatus::Cleared)))
        }
        _ => Ok(None),
    }
}

/// "yes" while a move is held for verification: release that move with
/// full confidence and consume the polar answer.
fn ground_verification_positive(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_ungrounded(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    if front.speaker != Speaker::User
        || front.mov != DialogueMove::Answer(Answer::Polar(true))
        || state.awaiting_verification().is_none()
    {
        return Ok(None);
    }
    let mut next = state.consume_front();
    next.private.nim = release_first_awaiting(&next);
    Ok(Some(next))
}

/// "no" drops the held move entirely; defaulting it to some other reading
/// would make the wrong downstream rule fire.
fn ground_verification_negative(
    state: &InformationState,
    _ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_ungrounded(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    if front.speaker != Speaker::User
        || front.mov != DialogueMove::Answer(Answer::Polar(false))
        || state.awaiting_verification().is_none()
    {
        return Ok(None);
    }
    let mut next = state.consume_front();
    let mut dropped = false;
    next.private.nim = next.private.nim.retain(|m| {
        if !dropped && m.grounding == GroundingStatus::AwaitingVerification {
            dropped = true;
            false
        } else {
            true
        }
    });
    Ok(Some(next))
}

fn release_first_awaiting(state: &InformationState) -> crate::state::Queue<TaggedMove> {
    let mut released = false;
    state.private.nim.map(|m| {
        if !released && m.grounding == GroundingStatus::AwaitingVerification {
            released = true;
            TaggedMove {
                confidence: 1.0,
                grounding: GroundingStatus::Cleared,
                ..m.clone()
            }
        } else {
            m.clone()
        }
    })
}

/// An answer compatible with two or more open questions never integrates
/// directly: defer it and raise an alternative clarification question
/// enumerating the candidate readings.
fn clarify_ambiguous_answer(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_ungrounded(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    let answer = match (&front.speaker, &front.mov) {
        (Speaker::User, DialogueMove::Answer(a)) => a,
        _ => return Ok(None),
    };
    let questions = relevant_open(state, ctx.domain, answer);
    if questions.len() < 2 {
        return Ok(None);
    }
    let mut candidates = Vec::new();
    for q in &questions {
        if let Some(p) = crate::domain::combine(ctx.domain, q, answer) {
            candidates.push(Question::YesNo(p));
        }
    }
    if candidates.len() < 2 {
        return Ok(None);
    }
    let clarification = Question::Alt(candidates);
    let next = expire_backup(state, &front.mov)
        .mark_front(GroundingStatus::Deferred)
        .push_agenda(AgendaItem::Findout(clarification));
    Ok(Some(next))
}

/// Below the cautious threshold: withhold the commit and check explicitly.
fn ground_pessimistic(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_ungrounded(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    if front.speaker != Speaker::User {
        return Ok(None);
    }
    let band = ctx.config.grounding.band_for(&front.mov);
    if front.confidence >= band.cautious {
        return Ok(None);
    }
    let quoted = front.mov.clone();
    let next = expire_backup(state, &quoted)
        .mark_front(GroundingStatus::AwaitingVerification)
        .push_agenda(AgendaItem::Icm {
            level: IcmLevel::Understanding,
            polarity: IcmPolarity::Interrogative,
            content: Some(IcmContent::Move(Box::new(quoted))),
        });
    Ok(Some(next))
}

/// Cautious band: commit, but snapshot shared state first so negative
/// perception feedback can swap it straight back. The snapshot always
/// reflects the state just before this commit; an older one is replaced.
fn ground_cautious(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_ungrounded(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    if front.speaker != Speaker::User {
        return Ok(None);
    }
    let band = ctx.config.grounding.band_for(&front.mov);
    if front.confidence < band.cautious || front.confidence >= band.optimistic {
        return Ok(None);
    }
    let echoed = front.mov.clone();
    let mut next = state.mark_front(GroundingStatus::Cleared);
    if !is_perception_icm(&echoed) {
        next.private.backup = Some(state.shared.clone());
    }
    let next = next.push_agenda(AgendaItem::Icm {
        level: IcmLevel::Understanding,
        polarity: IcmPolarity::Positive,
        content: Some(IcmContent::Move(Box::new(echoed))),
    });
    Ok(Some(next))
}

fn ground_optimistic(
    state: &InformationState,
    ctx: &RuleContext,
) -> Result<Option<InformationState>, EngineError> {
    let front = match front_ungrounded(state) {
        Some(m) => m,
        None => return Ok(None),
    };
    if front.speaker != Speaker::User {
        return Ok(None);
    }
    let band = ctx.config.grounding.band_for(&front.mov);
    if front.confidence < band.optimistic {
        return Ok(None);
    }
    let mov = front.mov.clone();
    Ok(Some(expire_backup(state, &mov).mark_front(GroundingStatus::Cleared)))
}
