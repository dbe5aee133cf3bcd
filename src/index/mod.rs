//! Single-field value indices.

use std::hash::Hash;
use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{Attributed, Edge, EdgeId, Node, NodeId, Value};

/// Hashable projection of a scalar [`Value`].
///
/// Integral floats collapse onto `Int` so `1` and `1.0` hit the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKey {
    Bool(bool),
    Int(i64),
    /// Bit pattern of a non-integral, non-NaN float.
    Float(u64),
    Str(String),
}

impl IndexKey {
    /// Key for `value`, or `None` when the value is not indexable
    /// (null, empty string, NaN, list, map).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Int(i) => Some(IndexKey::Int(*i)),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some(IndexKey::Int(*f as i64))
            }
            Value::Float(f) => Some(IndexKey::Float(f.to_bits())),
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(IndexKey::Str(s.clone())),
            Value::Null | Value::List(_) | Value::Map(_) => None,
        }
    }
}

/// Value → unit mapping for one field.
pub type FieldIndex<H> = HashMap<IndexKey, H>;

/// Arena handle usable as a collection member.
pub trait Handle: Copy + Eq + Hash + fmt::Debug {
    type Unit: Attributed;

    fn index(self) -> usize;

    fn resolve(self, arena: &[Self::Unit]) -> Option<&Self::Unit> {
        arena.get(self.index())
    }
}

impl Handle for NodeId {
    type Unit = Node;
    fn index(self) -> usize { self.0 }
}

impl Handle for EdgeId {
    type Unit = Edge;
    fn index(self) -> usize { self.0 }
}

/// Index key of `field` on the unit behind `handle`.
pub(crate) fn key_of<H: Handle>(handle: H, field: &str, arena: &[H::Unit]) -> Option<IndexKey> {
    handle
        .resolve(arena)
        .and_then(|u| u.get(field))
        .and_then(IndexKey::from_value)
}
