use serde::{Deserialize, Serialize};

use super::proposition::{Proposition, Value};

/// The three question forms of the issue-based model.
///
/// `Wh` carries its free variable and the domain sort constraining the
/// answers; two `Wh` questions over the same predicate and sort are the
/// same issue regardless of how the variable is spelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Question {
    /// ?P — polar question over a proposition.
    YesNo(Proposition),
    /// ?x.P(x) — single free variable, sort-constrained.
    Wh {
        predicate: String,
        var: String,
        sort: String,
    },
    /// Finite candidate set (used for alternative questions and for
    /// engine-raised clarification).
    Alt(Vec<Question>),
}

impl Question {
    pub fn wh(predicate: &str, sort: &str) -> Self {
        Question::Wh {
            predicate: predicate.to_string(),
            var: "x".to_string(),
            sort: sort.to_string(),
        }
    }

    /// Equality modulo variable naming. The QUD invariant ("no two
    /// unifiable entries") is phrased in terms of this relation.
    pub fn unifiable(&self, other: &Question) -> bool {
        match (self, other) {
            (Question::YesNo(a), Question::YesNo(b)) => a == b,
            (
                Question::Wh {
                    predicate: p1,
                    sort: s1,
                    ..
                },
                Question::Wh {
                    predicate: p2,
                    sort: s2,
                    ..
                },
            ) => p1 == p2 && s1 == s2,
            (Question::Alt(xs), Question::Alt(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().all(|x| ys.iter().any(|y| x.unifiable(y)))
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Question::YesNo(p) => write!(f, "?{}", p),
            Question::Wh { predicate, var, .. } => write!(f, "?{}.{}({})", var, predicate, var),
            Question::Alt(qs) => {
                let inner = qs.iter().map(|q| q.to_string()).collect::<Vec<_>>().join(" | ");
                write!(f, "?{{{}}}", inner)
            }
        }
    }
}

/// An answer as delivered by the interpreter: elliptical (`Short`), polar,
/// or a full proposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Polar(bool),
    Short(Value),
    Full(Proposition),
}

impl Answer {
    pub fn short(name: &str) -> Self {
        Answer::Short(Value::ind(name))
    }
}
