//! Filter criteria: `"field[__nested...][__op]" → value` terms.

use std::str::FromStr;

use crate::model::Value;
use crate::{Error, Result};

/// Comparison applied by one filter term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Is,
    Not,
    Gt,
    Lt,
    Gte,
    Lte,
    /// Case-sensitive substring.
    Like,
    /// Case-insensitive substring.
    ILike,
    In,
    NotIn,
}

impl FromStr for FilterOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "is" => FilterOp::Is,
            "not" => FilterOp::Not,
            "gt" => FilterOp::Gt,
            "lt" => FilterOp::Lt,
            "gte" => FilterOp::Gte,
            "lte" => FilterOp::Lte,
            "like" => FilterOp::Like,
            "ilike" => FilterOp::ILike,
            "in" => FilterOp::In,
            "not_in" => FilterOp::NotIn,
            other => return Err(other.to_string()),
        })
    }
}

impl FilterOp {
    /// Evaluate `actual <op> expected`. Incompatible operands never match,
    /// except for the negated membership test.
    pub fn apply(self, actual: &Value, expected: &Value) -> bool {
        use std::cmp::Ordering::*;
        match self {
            FilterOp::Is => actual.loose_eq(expected),
            FilterOp::Not => !actual.loose_eq(expected),
            FilterOp::Gt => actual.compare(expected) == Some(Greater),
            FilterOp::Lt => actual.compare(expected) == Some(Less),
            FilterOp::Gte => matches!(actual.compare(expected), Some(Greater | Equal)),
            FilterOp::Lte => matches!(actual.compare(expected), Some(Less | Equal)),
            FilterOp::Like => match (actual.as_str(), expected.as_str()) {
                (Some(a), Some(b)) => a.contains(b),
                _ => false,
            },
            FilterOp::ILike => match (actual.as_str(), expected.as_str()) {
                (Some(a), Some(b)) => a.to_lowercase().contains(&b.to_lowercase()),
                _ => false,
            },
            FilterOp::In => expected
                .as_list()
                .is_some_and(|l| l.iter().any(|v| actual.loose_eq(v))),
            FilterOp::NotIn => !FilterOp::In.apply(actual, expected),
        }
    }
}

/// One compiled term.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Property path; more than one segment addresses nested maps.
    pub path: Vec<String>,
    pub op: FilterOp,
    pub value: Value,
}

impl Condition {
    /// Parse `key`: a bare field means equality, otherwise the last
    /// `__` segment names the operator.
    pub fn parse(key: &str, value: Value) -> Result<Self> {
        let mut path: Vec<String> = key.split("__").map(str::to_string).collect();
        let op = if path.len() < 2 {
            FilterOp::Is
        } else {
            let suffix = path.pop().unwrap_or_default();
            suffix.parse::<FilterOp>().map_err(|op| Error::InvalidFilterOperator {
                op,
                key: key.to_string(),
            })?
        };
        Ok(Self { path, op, value })
    }
}

/// A group of terms that must all hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    terms: Vec<(String, Value)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Validate every key up front.
    pub fn compile(self) -> Result<Vec<Condition>> {
        self.terms
            .into_iter()
            .map(|(key, value)| Condition::parse(&key, value))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Criteria {
    fn from(terms: [(K, V); N]) -> Self {
        terms.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Criteria {
    fn from(terms: Vec<(K, V)>) -> Self {
        terms.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { terms: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
