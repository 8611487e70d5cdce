mod common;

use common::*;
use ibis::engine::ActionResult;
use ibis::semantics::{
    ActionOutcome, ActionStatus, DialogueMove, IcmContent, IcmLevel, IcmPolarity, Question,
};
use ibis::state::InformationState;
use ibis::Input;

fn confirm_question() -> Question {
    Question::YesNo(book_action().confirmation_prop())
}

fn trip_settled() -> InformationState {
    InformationState::new()
        .commit(prop("destination", "paris"))
        .commit(prop("month", "april"))
}

#[tokio::test]
async fn unmet_precondition_is_reported_not_queued() {
    let (mut engine, log) = engine(
        vec![vec![sm(DialogueMove::Request(book_action()), 0.95)]],
        vec![],
    );
    let out = engine
        .process_turn(Input::Utterance("book it".into()))
        .await
        .unwrap();
    assert!(matches!(
        out.moves.as_slice(),
        [DialogueMove::Icm {
            level: IcmLevel::Acceptance,
            polarity: IcmPolarity::Negative,
            content: Some(IcmContent::Text(_)),
        }]
    ));
    assert!(engine.state().private.actions.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn critical_action_waits_for_confirmation() {
    let (mut engine, log) = engine(
        vec![vec![sm(DialogueMove::Request(book_action()), 0.95)]],
        vec![],
    );
    engine.replace_state(trip_settled());
    let out = engine
        .process_turn(Input::Utterance("book it".into()))
        .await
        .unwrap();
    assert_eq!(out.moves, vec![DialogueMove::Ask(confirm_question())]);
    assert_eq!(engine.state().private.actions.len(), 1);
    // Nothing executed until the user says yes.
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn confirmed_action_executes_and_is_reported() {
    let (mut engine, log) = engine(
        vec![
            vec![sm(DialogueMove::Request(book_action()), 0.95)],
            vec![polar(true, 0.95)],
        ],
        vec![ActionResult::success(vec![])],
    );
    engine.replace_state(trip_settled());
    engine
        .process_turn(Input::Utterance("book it".into()))
        .await
        .unwrap();
    let out = engine
        .process_turn(Input::Utterance("yes".into()))
        .await
        .unwrap();
    assert_eq!(out.moves, vec![DialogueMove::Confirm(book_action())]);
    assert!(engine.state().shared.com.contains(&trip_booked()));
    assert!(engine.state().private.actions.is_empty());
    assert_eq!(
        engine.state().private.completed.front().map(|i| i.status),
        Some(ActionStatus::Executed(ActionOutcome::Success))
    );
    assert_eq!(log.lock().unwrap().as_slice(), &[book_action()]);
}

#[tokio::test]
async fn failed_action_rolls_its_postconditions_back() {
    let (mut engine, log) = engine(
        vec![
            vec![sm(DialogueMove::Request(book_action()), 0.95)],
            vec![polar(true, 0.95)],
        ],
        vec![ActionResult::failure("card declined")],
    );
    engine.replace_state(trip_settled());
    engine
        .process_turn(Input::Utterance("book it".into()))
        .await
        .unwrap();
    let before = engine.state().shared.com.clone();
    let out = engine
        .process_turn(Input::Utterance("yes".into()))
        .await
        .unwrap();

    // The optimistic commit is subtracted exactly; only the confirmation
    // answer itself survives the turn.
    assert!(!engine.state().shared.com.contains(&trip_booked()));
    let mut expected = before;
    expected = expected.add(book_action().confirmation_prop());
    assert_eq!(engine.state().shared.com, expected);
    match out.moves.as_slice() {
        [DialogueMove::Icm {
            level: IcmLevel::Acceptance,
            polarity: IcmPolarity::Negative,
            content: Some(IcmContent::Text(reason)),
        }] => assert_eq!(reason, "card declined"),
        other => panic!("expected failure feedback, got {:?}", other),
    }
    assert_eq!(
        engine.state().private.completed.front().map(|i| i.status),
        Some(ActionStatus::RolledBack)
    );
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn declined_confirmation_cancels_the_action() {
    let (mut engine, log) = engine(
        vec![
            vec![sm(DialogueMove::Request(book_action()), 0.95)],
            vec![polar(false, 0.95)],
        ],
        vec![],
    );
    engine.replace_state(trip_settled());
    engine
        .process_turn(Input::Utterance("book it".into()))
        .await
        .unwrap();
    let out = engine
        .process_turn(Input::Utterance("no".into()))
        .await
        .unwrap();
    assert!(matches!(
        out.moves.as_slice(),
        [DialogueMove::Icm {
            level: IcmLevel::Acceptance,
            polarity: IcmPolarity::Negative,
            content: Some(IcmContent::Text(_)),
        }]
    ));
    assert!(engine.state().private.actions.is_empty());
    assert!(!engine.state().shared.com.contains(&trip_booked()));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_critical_action_runs_without_a_gate() {
    // Covered end-to-end in the price scenario; here just the queue view.
    let (mut engine, log) = engine(
        vec![vec![sm(DialogueMove::Request(consult_action()), 0.95)]],
        vec![ActionResult::success(vec![])],
    );
    let out = engine
        .process_turn(Input::Utterance("look up prices".into()))
        .await
        .unwrap();
    assert_eq!(out.moves, vec![DialogueMove::Confirm(consult_action())]);
    assert_eq!(log.lock().unwrap().as_slice(), &[consult_action()]);
}
