//! Unit: the attributed base shared by nodes and edges.

use std::fmt;

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};
use super::property_map::DisplayMap;

/// Graph-unique identifier, hex-encoded.
///
/// Allocated from a counter shared by nodes and edges of one graph, so two
/// units never carry the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueId(String);

impl UniqueId {
    pub(crate) fn from_counter(value: u64) -> Self {
        Self(format!("{value:x}"))
    }

    /// Counter value this id was allocated from, if it is valid hex.
    pub fn counter(&self) -> Option<u64> {
        u64::from_str_radix(&self.0, 16).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UniqueId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for UniqueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Entity tag, property bag and id.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    entity: String,
    uid: UniqueId,
    properties: PropertyMap,
}

impl Unit {
    pub(crate) fn new(entity: impl Into<String>, properties: PropertyMap, uid: UniqueId) -> Self {
        Self { entity: entity.into(), uid, properties }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn uid(&self) -> &UniqueId {
        &self.uid
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Read a property. Absent keys are `None`, never an error.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a property, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// Remove a property. Returns whether it was present.
    pub fn unset(&mut self, key: &str) -> bool {
        self.properties.remove(key).is_some()
    }

    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// `(entity, properties, uid)` as consumed by the export layer.
    pub fn export(&self) -> (String, PropertyMap, UniqueId) {
        (self.entity.clone(), self.properties.clone(), self.uid.clone())
    }
}

/// Access to the [`Unit`] embedded in a node or edge.
///
/// Collections and queries are generic over this trait so the same index
/// and filter code serves both kinds of unit.
pub trait Attributed {
    /// Display name of the unit kind (`"Node"` / `"Edge"`).
    const KIND: &'static str;

    fn unit(&self) -> &Unit;
    fn unit_mut(&mut self) -> &mut Unit;

    fn entity(&self) -> &str { self.unit().entity() }
    fn uid(&self) -> &UniqueId { self.unit().uid() }
    fn properties(&self) -> &PropertyMap { self.unit().properties() }
    fn get(&self, key: &str) -> Option<&Value> { self.unit().get(key) }
    fn has(&self, key: &str) -> bool { self.unit().has(key) }

    fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value>
    where
        Self: Sized,
    {
        self.unit_mut().set(key, value)
    }

    fn unset(&mut self, key: &str) -> bool {
        self.unit_mut().unset(key)
    }
}

/// `Node (person {"id":1,"name":"Keith"})`
pub(crate) fn fmt_unit<U: Attributed>(u: &U, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({} {})", U::KIND, u.entity(), DisplayMap(u.properties()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::props;

    #[test]
    fn test_uid_hex() {
        let uid = UniqueId::from_counter(255);
        assert_eq!(uid.as_str(), "ff");
        assert_eq!(uid.counter(), Some(255));
        assert_eq!(UniqueId::from("zz").counter(), None);
    }

    #[test]
    fn test_property_bag() {
        let mut u = Unit::new("person", props([("id", 1)]), UniqueId::from_counter(1));
        assert_eq!(u.set("a", "b"), None);
        assert_eq!(u.get("a"), Some(&Value::from("b")));
        assert!(u.has("a"));
        assert!(u.unset("a"));
        assert!(!u.unset("a"));
        assert_eq!(u.get("a"), None);

        let (entity, properties, uid) = u.export();
        assert_eq!(entity, "person");
        assert_eq!(properties.get("id"), Some(&Value::Int(1)));
        assert_eq!(uid.as_str(), "1");
    }
}
