mod common;

use common::*;
use ibis::semantics::{Answer, DialogueMove, Proposition, Question, Value};
use ibis::state::{GroundingStatus, InformationState};
use ibis::Input;

#[tokio::test]
async fn answer_ahead_of_the_plan_is_accommodated() {
    // The system is asking for a destination, but the user volunteers the
    // month. The plan was going to ask it anyway, so it integrates.
    let (mut engine, _) = engine(
        vec![
            vec![sm(DialogueMove::Ask(price_q()), 0.9)],
            vec![short("april", 0.9)],
        ],
        vec![],
    );
    let out = engine
        .process_turn(Input::Utterance("what does a trip cost?".into()))
        .await
        .unwrap();
    assert_eq!(out.moves, vec![DialogueMove::Ask(dest_q())]);

    let out = engine
        .process_turn(Input::Utterance("in april".into()))
        .await
        .unwrap();
    assert!(engine.state().shared.com.contains(&prop("month", "april")));
    // The destination question is still the open one; nothing to say yet.
    assert!(out.moves.is_empty());
    assert_eq!(engine.state().shared.qud.top(), Some(&dest_q()));
}

#[tokio::test]
async fn revised_answer_retracts_the_old_commitment() {
    let (mut engine, _) = engine(
        vec![vec![full(prop("destination", "london"), 0.9)]],
        vec![],
    );
    engine.replace_state(InformationState::new().commit(prop("destination", "paris")));
    engine
        .process_turn(Input::Utterance("london, actually".into()))
        .await
        .unwrap();
    let com = &engine.state().shared.com;
    assert!(com.contains(&prop("destination", "london")));
    assert!(!com.contains(&prop("destination", "paris")));
    assert_eq!(com.len(), 1);
}

#[tokio::test]
async fn unique_task_match_loads_the_plan() {
    // "economy" out of the blue: only the price plan ever asks for a
    // flight class, so the user must be after the price.
    let (mut engine, _) = engine(vec![vec![short("economy", 0.9)]], vec![]);
    let out = engine
        .process_turn(Input::Utterance("economy, please".into()))
        .await
        .unwrap();
    assert!(engine
        .state()
        .shared
        .com
        .contains(&prop("flight_class", "economy")));
    assert_eq!(
        engine.state().private.plan.as_ref().map(|p| &p.goal),
        Some(&price_q())
    );
    // The plan picks up from its first unresolved step.
    assert_eq!(out.moves, vec![DialogueMove::Ask(dest_q())]);
}

#[tokio::test]
async fn ambiguous_task_match_raises_a_clarification() {
    // "paris" could start the price, visa or booking task: never guess.
    let (mut engine, _) = engine(
        vec![vec![short("paris", 0.9)], vec![short("price", 0.9)]],
        vec![],
    );
    let out = engine
        .process_turn(Input::Utterance("paris".into()))
        .await
        .unwrap();
    let alt = match out.moves.as_slice() {
        [DialogueMove::Ask(q @ Question::Alt(members))] => {
            assert_eq!(members.len(), 3);
            q.clone()
        }
        other => panic!("expected a clarification question, got {:?}", other),
    };
    assert!(engine.state().shared.qud.top().unwrap().unifiable(&alt));
    assert_eq!(
        engine.state().private.nim.front().unwrap().grounding,
        GroundingStatus::Deferred
    );

    // Picking the price task releases the deferred answer against the
    // freshly loaded plan.
    let out = engine
        .process_turn(Input::Utterance("the price".into()))
        .await
        .unwrap();
    assert!(engine.state().shared.com.contains(&prop("destination", "paris")));
    assert!(engine.state().private.nim.is_empty());
    assert_eq!(
        engine.state().private.plan.as_ref().map(|p| &p.goal),
        Some(&price_q())
    );
    assert_eq!(out.moves, vec![DialogueMove::Ask(month_q())]);
}

#[tokio::test]
async fn ambiguous_question_match_raises_a_clarification() {
    // Two open city-sorted questions: "paris" could answer either.
    let departure = Question::wh("departure", "city");
    let (mut engine, _) = engine(
        vec![
            vec![short("paris", 0.9)],
            vec![full(prop("destination", "paris"), 0.9)],
        ],
        vec![],
    );
    engine.replace_state(
        InformationState::new()
            .push_qud(dest_q())
            .push_issue(dest_q())
            .push_qud(departure.clone())
            .push_issue(departure.clone()),
    );
    let out = engine
        .process_turn(Input::Utterance("paris".into()))
        .await
        .unwrap();
    match out.moves.as_slice() {
        [DialogueMove::Ask(Question::Alt(members))] => {
            assert!(members.contains(&Question::YesNo(prop("destination", "paris"))));
            assert!(members.contains(&Question::YesNo(prop("departure", "paris"))));
        }
        other => panic!("expected a clarification question, got {:?}", other),
    }

    // A full answer picks one reading; the deferred short answer is
    // superseded and dropped.
    engine
        .process_turn(Input::Utterance("the destination".into()))
        .await
        .unwrap();
    let com = &engine.state().shared.com;
    assert!(com.contains(&prop("destination", "paris")));
    assert!(!com.contains(&prop("departure", "paris")));
    assert!(engine.state().private.nim.is_empty());
    assert!(engine
        .state()
        .shared
        .qud
        .member(|q| q.unifiable(&departure))
        .is_some());
}

#[tokio::test]
async fn integer_short_answer_combines_through_the_domain() {
    let (mut engine, _) = engine(
        vec![vec![sm(
            DialogueMove::Answer(Answer::Short(Value::Int(700))),
            0.9,
        )]],
        vec![],
    );
    engine.replace_state(
        InformationState::new()
            .push_qud(price_q())
            .push_issue(price_q()),
    );
    engine
        .process_turn(Input::Utterance("700".into()))
        .await
        .unwrap();
    assert!(engine
        .state()
        .shared
        .com
        .contains(&Proposition::unary("price", Value::Int(700))));
}
