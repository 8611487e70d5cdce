use serde::{Deserialize, Serialize};

/// A ground term. Domain sorts are named by the domain description; the
/// engine only compares structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Ind(String),
    Int(i64),
}

impl Value {
    pub fn ind(name: &str) -> Self {
        Value::Ind(name.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Ind(s) => write!(f, "{}", s),
            Value::Int(n) => write!(f, "{}", n),
        }
    }
}

/// A predicate applied to ground arguments. Immutable value with structural
/// equality; `positive: false` is the negation (used for "no" answers and
/// rejected preconditions).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proposition {
    pub predicate: String,
    pub args: Vec<Value>,
    pub positive: bool,
}

impl Proposition {
    pub fn new(predicate: &str, args: Vec<Value>) -> Self {
        Self {
            predicate: predicate.to_string(),
            args,
            positive: true,
        }
    }

    pub fn unary(predicate: &str, arg: Value) -> Self {
        Self::new(predicate, vec![arg])
    }

    pub fn nullary(predicate: &str) -> Self {
        Self::new(predicate, vec![])
    }

    pub fn negated(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            positive: !self.positive,
        }
    }

    /// Same predicate and arguments, opposite or equal polarity.
    pub fn same_atom(&self, other: &Proposition) -> bool {
        self.predicate == other.predicate && self.args == other.args
    }
}

impl std::fmt::Display for Proposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args = self
            .args
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if self.positive {
            write!(f, "{}({})", self.predicate, args)
        } else {
            write!(f, "not {}({})", self.predicate, args)
        }
    }
}
