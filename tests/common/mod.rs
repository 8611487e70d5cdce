#![allow(dead_code)]

//! Shared fixture: a small travel-agency domain plus scripted
//! collaborators, so each test drives the engine through whole turns.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use ibis::domain::Domain;
use ibis::engine::{ActionResult, Device, Nlg, Nlu, ScoredMove};
use ibis::semantics::{
    Action, Answer, DialogueMove, Plan, PlanStep, Proposition, Question, Speaker, Value,
};
use ibis::state::{InformationState, Set};
use ibis::{DialogueMoveEngine, EngineConfig};

pub fn dest_q() -> Question {
    Question::wh("destination", "city")
}

pub fn month_q() -> Question {
    Question::wh("month", "month")
}

pub fn class_q() -> Question {
    Question::wh("flight_class", "class")
}

pub fn citizenship_q() -> Question {
    Question::wh("citizenship", "country")
}

pub fn price_q() -> Question {
    Question::wh("price", "amount")
}

pub fn visa_q() -> Question {
    Question::wh("visa_requirement", "document")
}

pub fn trip_booked() -> Proposition {
    Proposition::nullary("trip_booked")
}

pub fn book_goal() -> Question {
    Question::YesNo(trip_booked())
}

pub fn book_action() -> Action {
    Action::new("book", vec![])
}

pub fn consult_action() -> Action {
    Action::new("consult_price", vec![])
}

pub fn prop(predicate: &str, arg: &str) -> Proposition {
    Proposition::unary(predicate, Value::ind(arg))
}

fn sort_of(name: &str) -> Option<&'static str> {
    match name {
        "paris" | "london" | "berlin" => Some("city"),
        "april" | "may" | "june" => Some("month"),
        "economy" | "business" => Some("class"),
        "sweden" | "france" => Some("country"),
        _ => None,
    }
}

pub struct TravelDomain;

impl TravelDomain {
    fn hotel_rank(p: &Proposition) -> u8 {
        match p.args.first() {
            Some(Value::Ind(name)) if name == "plaza" => 2,
            Some(Value::Ind(name)) if name == "budget_inn" => 1,
            _ => 0,
        }
    }
}

impl Domain for TravelDomain {
    fn resolves(&self, answer: &Answer, question: &Question) -> bool {
        match (answer, question) {
            (Answer::Full(p), Question::Wh { predicate, .. }) => {
                p.positive && p.predicate == *predicate
            }
            (Answer::Full(p), Question::YesNo(target)) => p.same_atom(target),
            _ => false,
        }
    }

    fn combine(&self, question: &Question, answer: &Answer) -> Option<Proposition> {
        let (predicate, sort) = match question {
            Question::Wh {
                predicate, sort, ..
            } => (predicate, sort),
            _ => return None,
        };
        match answer {
            Answer::Short(Value::Ind(name)) if sort_of(name) == Some(sort.as_str()) => {
                Some(Proposition::unary(predicate, Value::ind(name)))
            }
            // Picking a task by its label ("price", "visa_requirement").
            Answer::Short(Value::Ind(name)) if name == predicate => {
                Some(Proposition::unary("task", Value::ind(name)))
            }
            Answer::Short(Value::Int(n)) if sort == "amount" => {
                Some(Proposition::unary(predicate, Value::Int(*n)))
            }
            Answer::Full(p) if p.predicate == *predicate => Some(p.clone()),
            _ => None,
        }
    }

    fn relevant(&self, answer: &Answer, question: &Question) -> bool {
        let (predicate, sort) = match question {
            Question::Wh {
                predicate, sort, ..
            } => (predicate, sort),
            _ => return false,
        };
        match answer {
            Answer::Short(Value::Ind(name)) => {
                sort_of(name) == Some(sort.as_str()) || name == predicate
            }
            Answer::Short(Value::Int(_)) => sort == "amount",
            Answer::Full(p) => p.predicate == *predicate,
            Answer::Polar(_) => false,
        }
    }

    fn plan_for(&self, question: &Question) -> Option<Plan> {
        if question.unifiable(&price_q()) {
            return Some(Plan::new(
                price_q(),
                vec![
                    PlanStep::Findout(dest_q()),
                    PlanStep::Findout(month_q()),
                    PlanStep::Findout(class_q()),
                    PlanStep::Perform(consult_action()),
                    PlanStep::Respond(price_q()),
                ],
            ));
        }
        if question.unifiable(&visa_q()) {
            return Some(Plan::new(
                visa_q(),
                vec![
                    PlanStep::Findout(dest_q()),
                    PlanStep::Findout(citizenship_q()),
                    PlanStep::Respond(visa_q()),
                ],
            ));
        }
        if question.unifiable(&book_goal()) {
            return Some(Plan::new(
                book_goal(),
                vec![
                    PlanStep::Findout(dest_q()),
                    PlanStep::Findout(month_q()),
                    PlanStep::Perform(book_action()),
                ],
            ));
        }
        None
    }

    fn tasks(&self) -> Vec<Question> {
        vec![price_q(), visa_q(), book_goal()]
    }

    fn precond(&self, action: &Action, commitments: &Set<Proposition>) -> Result<(), String> {
        if action.name != "book" {
            return Ok(());
        }
        let settled = |predicate: &str| {
            commitments
                .iter()
                .any(|p| p.positive && p.predicate == predicate)
        };
        if settled("destination") && settled("month") {
            Ok(())
        } else {
            Err("destination and month must be settled first".to_string())
        }
    }

    fn postcond(&self, action: &Action) -> Vec<Proposition> {
        if action.name == "book" {
            vec![trip_booked()]
        } else {
            vec![]
        }
    }

    fn critical(&self, action: &Action) -> bool {
        action.name == "book"
    }

    fn dominates(&self, a: &Proposition, b: &Proposition) -> bool {
        a.predicate == "hotel"
            && b.predicate == "hotel"
            && Self::hotel_rank(a) > Self::hotel_rank(b)
    }
}

/// Hands out one pre-scripted interpretation per utterance; an exhausted
/// script (or an explicitly empty entry) means "parsed nothing".
pub struct ScriptedNlu {
    script: VecDeque<Vec<ScoredMove>>,
}

impl Nlu for ScriptedNlu {
    async fn interpret(
        &mut self,
        _utterance: &str,
        _speaker: Speaker,
        _state: &InformationState,
    ) -> anyhow::Result<Vec<ScoredMove>> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}

pub struct CannedNlg;

fn render(mov: &DialogueMove) -> String {
    match mov {
        DialogueMove::Greet => "hello".into(),
        DialogueMove::Quit => "goodbye".into(),
        DialogueMove::Ask(q) => format!("{}", q),
        DialogueMove::Answer(Answer::Full(p)) => format!("{}.", p),
        DialogueMove::Answer(Answer::Polar(true)) => "yes.".into(),
        DialogueMove::Answer(Answer::Polar(false)) => "no.".into(),
        DialogueMove::Answer(Answer::Short(v)) => format!("{}.", v),
        DialogueMove::Request(a) => format!("do {}", a.name),
        DialogueMove::Confirm(a) => format!("{} done.", a.name),
        DialogueMove::Propose(p) => format!("how about {}?", p),
        DialogueMove::Accept(p) => format!("agreed: {}", p),
        DialogueMove::Reject(p) => format!("not {}", p),
        DialogueMove::Icm { .. } => "[feedback]".into(),
    }
}

impl Nlg for CannedNlg {
    async fn generate(
        &mut self,
        moves: &[DialogueMove],
        _state: &InformationState,
    ) -> anyhow::Result<String> {
        Ok(moves.iter().map(render).collect::<Vec<_>>().join(" "))
    }
}

pub struct ScriptedDevice {
    results: VecDeque<ActionResult>,
    log: Arc<Mutex<Vec<Action>>>,
}

impl Device for ScriptedDevice {
    async fn execute(
        &mut self,
        action: &Action,
        _state: &InformationState,
    ) -> anyhow::Result<ActionResult> {
        self.log.lock().unwrap().push(action.clone());
        Ok(self
            .results
            .pop_front()
            .unwrap_or_else(|| ActionResult::success(vec![])))
    }
}

pub type TestEngine = DialogueMoveEngine<ScriptedNlu, CannedNlg, ScriptedDevice>;

/// Engine over the travel domain with default configuration. The returned
/// handle sees every action the device was asked to execute.
pub fn engine(
    script: Vec<Vec<ScoredMove>>,
    device_results: Vec<ActionResult>,
) -> (TestEngine, Arc<Mutex<Vec<Action>>>) {
    engine_with_config(script, device_results, EngineConfig::default())
}

static TRACING: Once = Once::new();

/// RUST_LOG=debug shows which rule fired at every step of a failing test.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn engine_with_config(
    script: Vec<Vec<ScoredMove>>,
    device_results: Vec<ActionResult>,
    config: EngineConfig,
) -> (TestEngine, Arc<Mutex<Vec<Action>>>) {
    init_tracing();
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = DialogueMoveEngine::new(
        Arc::new(TravelDomain),
        config,
        ScriptedNlu {
            script: script.into(),
        },
        CannedNlg,
        ScriptedDevice {
            results: device_results.into(),
            log: Arc::clone(&log),
        },
    );
    (engine, log)
}

pub fn sm(mov: DialogueMove, confidence: f32) -> ScoredMove {
    ScoredMove::new(mov, confidence)
}

pub fn short(name: &str, confidence: f32) -> ScoredMove {
    sm(DialogueMove::Answer(Answer::short(name)), confidence)
}

pub fn polar(value: bool, confidence: f32) -> ScoredMove {
    sm(DialogueMove::Answer(Answer::Polar(value)), confidence)
}

pub fn full(p: Proposition, confidence: f32) -> ScoredMove {
    sm(DialogueMove::Answer(Answer::Full(p)), confidence)
}
