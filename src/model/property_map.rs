//! PropertyMap: the key-value bag on nodes and edges.

use std::fmt;

use super::Value;

/// A map of property names to values.
pub type PropertyMap = hashbrown::HashMap<String, Value>;

/// Build a [`PropertyMap`] from `(key, value)` pairs.
///
/// ```rust
/// use unitgraph::{props, Value};
///
/// let p = props([("id", Value::from(1)), ("name", Value::from("A"))]);
/// assert_eq!(p.len(), 2);
/// ```
pub fn props<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PropertyMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Key-sorted JSON-like rendering, so output does not depend on hash order.
pub(crate) struct DisplayMap<'a>(pub &'a PropertyMap);

impl fmt::Display for DisplayMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();
        write!(f, "{{")?;
        for (i, k) in keys.into_iter().enumerate() {
            if i > 0 { write!(f, ",")?; }
            write!(f, "\"{k}\":{}", self.0[k])?;
        }
        write!(f, "}}")
    }
}
