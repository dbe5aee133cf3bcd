//! Property filters over collection snapshots.
//!
//! A [`Query`] is an immutable, ordered snapshot of units. `filter` and
//! `exclude` return new snapshots and never touch the source collection.
//!
//! ```rust
//! use unitgraph::{props, Graph, Value};
//!
//! let mut graph = Graph::new();
//! for id in 1..=6 {
//!     graph.create_node("person", props([("id", Value::from(id))]))?;
//! }
//!
//! let query = graph.node_query("person");
//! let picked = query.filter([("id__gt", 1), ("id__lt", 5)])?;
//! assert_eq!(picked.len(), 3);
//! # Ok::<(), unitgraph::Error>(())
//! ```

pub mod criteria;

pub use criteria::{Condition, Criteria, FilterOp};

use crate::model::{Attributed, Value};
use crate::{Error, Result};

/// Ordered snapshot of units with chainable filters.
#[derive(Debug)]
pub struct Query<'g, U> {
    units: Vec<&'g U>,
}

impl<U> Clone for Query<'_, U> {
    fn clone(&self) -> Self {
        Self { units: self.units.clone() }
    }
}

impl<'g, U: Attributed> Query<'g, U> {
    pub fn new(units: impl IntoIterator<Item = &'g U>) -> Self {
        Self { units: units.into_iter().collect() }
    }

    /// Keep units matching every condition of `criteria`.
    pub fn filter(&self, criteria: impl Into<Criteria>) -> Result<Self> {
        self.filter_any([criteria.into()])
    }

    /// Keep units matching at least one group. Zero groups keep everything.
    pub fn filter_any(&self, groups: impl IntoIterator<Item = Criteria>) -> Result<Self> {
        self.select(groups, false)
    }

    /// Drop units matching every condition of `criteria`.
    pub fn exclude(&self, criteria: impl Into<Criteria>) -> Result<Self> {
        self.exclude_any([criteria.into()])
    }

    /// Drop units matching at least one group. Zero groups drop everything.
    pub fn exclude_any(&self, groups: impl IntoIterator<Item = Criteria>) -> Result<Self> {
        self.select(groups, true)
    }

    fn select(&self, groups: impl IntoIterator<Item = Criteria>, exclude: bool) -> Result<Self> {
        let mut compiled = groups
            .into_iter()
            .map(|c| c.compile())
            .collect::<Result<Vec<_>>>()?;
        if compiled.is_empty() {
            compiled.push(Vec::new());
        }

        let mut kept = Vec::with_capacity(self.units.len());
        for &unit in &self.units {
            let mut matched = false;
            for group in &compiled {
                if matches_group(unit, group)? {
                    matched = true;
                    break;
                }
            }
            if matched != exclude {
                kept.push(unit);
            }
        }
        Ok(Self { units: kept })
    }

    pub fn first(&self) -> Option<&'g U> {
        self.units.first().copied()
    }

    pub fn last(&self) -> Option<&'g U> {
        self.units.last().copied()
    }

    /// Copy of the current result sequence.
    pub fn units(&self) -> Vec<&'g U> {
        self.units.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'g U> + '_ {
        self.units.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// All conditions hold (short-circuits on the first miss).
fn matches_group<U: Attributed>(unit: &U, group: &[Condition]) -> Result<bool> {
    for cond in group {
        let value = resolve(unit, &cond.path)?;
        if !cond.op.apply(value, &cond.value) {
            return Ok(false);
        }
    }
    Ok(true)
}

static NULL: Value = Value::Null;

/// Walk `path` through the property bag. A missing leaf reads as null; a
/// missing or non-map intermediate is an error.
fn resolve<'u, U: Attributed>(unit: &'u U, path: &[String]) -> Result<&'u Value> {
    let Some((leaf, parents)) = path.split_last() else {
        return Ok(&NULL);
    };
    let mut bag = unit.properties();
    for segment in parents {
        bag = bag
            .get(segment)
            .and_then(Value::as_map)
            .ok_or_else(|| Error::NestedFieldMissing(path.join("__")))?;
    }
    Ok(bag.get(leaf).unwrap_or(&NULL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{props, NodeId};
    use crate::Graph;

    fn people() -> Graph {
        let mut g = Graph::new();
        g.nodes_mut("person").create_index("id");
        for (id, name) in [(1, "Keith"), (2, "Scott"), (3, "Jules"), (4, "Kelly"), (5, "Trevor"), (6, "Arthur")] {
            g.create_node("person", props([("id", Value::from(id)), ("name", Value::from(name))])).unwrap();
        }
        g
    }

    fn ids(q: &Query<'_, crate::Node>) -> Vec<i64> {
        q.iter().filter_map(|n| n.get("id").and_then(Value::as_int)).collect()
    }

    fn find(g: &Graph, id: i64) -> NodeId {
        g.nodes("person").unwrap().find("id", id).unwrap()
    }

    #[test]
    fn test_first_last_units() {
        let g = people();
        let q = g.node_query("person");
        assert_eq!(q.first().map(|n| n.id()), Some(find(&g, 1)));
        assert_eq!(q.last().map(|n| n.id()), Some(find(&g, 6)));
        assert_eq!(q.units().len(), 6);
    }

    #[test]
    fn test_comparison_ops() {
        let g = people();
        let q = g.node_query("person");
        assert_eq!(ids(&q.filter([("name__is", "Keith")]).unwrap()), [1]);
        assert_eq!(ids(&q.filter([("name", "Keith")]).unwrap()), [1]);
        assert_eq!(ids(&q.filter([("name__not", "Keith")]).unwrap()), [2, 3, 4, 5, 6]);
        assert_eq!(ids(&q.filter([("id__gt", 1)]).unwrap()), [2, 3, 4, 5, 6]);
        assert_eq!(ids(&q.filter([("id__lt", 6)]).unwrap()), [1, 2, 3, 4, 5]);
        assert_eq!(ids(&q.filter([("id__gte", 2)]).unwrap()).len(), 5);
        assert_eq!(ids(&q.filter([("id__lte", 5)]).unwrap()).last(), Some(&5));
    }

    #[test]
    fn test_string_ops() {
        let g = people();
        let q = g.node_query("person");
        assert_eq!(ids(&q.filter([("name__ilike", "EIT")]).unwrap()), [1]);
        assert_eq!(ids(&q.filter([("name__like", "Jul")]).unwrap()), [3]);
        assert!(q.filter([("name__like", "jul")]).unwrap().first().is_none());
    }

    #[test]
    fn test_membership_ops() {
        let g = people();
        let q = g.node_query("person");
        let names = Value::from(vec!["Keith", "Scott"]);
        assert_eq!(ids(&q.filter([("name__in", names.clone())]).unwrap()), [1, 2]);
        assert_eq!(ids(&q.filter([("name__not_in", names)]).unwrap()), [3, 4, 5, 6]);
    }

    #[test]
    fn test_and_within_or_across() {
        let g = people();
        let q = g.node_query("person");
        assert_eq!(ids(&q.filter([("id__gt", 1), ("id__lt", 5)]).unwrap()), [2, 3, 4]);

        let either = q
            .filter_any([Criteria::from([("id", 1)]), Criteria::from([("name", "Arthur")])])
            .unwrap();
        assert_eq!(ids(&either), [1, 6]);
    }

    #[test]
    fn test_exclude() {
        let g = people();
        let q = g.node_query("person");
        let rest = q.exclude([("name__is", "Keith")]).unwrap();
        assert_eq!(rest.first().map(|n| n.id()), Some(find(&g, 2)));
        assert_eq!(rest.len(), 5);

        let rest = q
            .exclude_any([Criteria::from([("id__lt", 3)]), Criteria::from([("id__gt", 4)])])
            .unwrap();
        assert_eq!(ids(&rest), [3, 4]);

        assert!(q.exclude_any([]).unwrap().is_empty());
        assert_eq!(q.filter_any([]).unwrap().len(), 6);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut g = people();
        let before = ids(&g.node_query("person"));
        g.create_node("person", props([("id", 7)])).unwrap();
        assert_eq!(before.len(), 6);
        assert_eq!(g.node_query("person").len(), 7);
    }

    #[test]
    fn test_invalid_operator() {
        let g = people();
        let err = g.node_query("person").filter([("id__near", 1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidFilterOperator { ref op, .. } if op == "near"));
    }

    #[test]
    fn test_nested_fields() {
        let mut g = Graph::new();
        g.create_node("doc", props([("meta", Value::from(props([("lang", "en")])))])).unwrap();
        g.create_node("doc", props([("meta", Value::from(props([("lang", "fr")])))])).unwrap();

        let q = g.node_query("doc");
        assert_eq!(q.filter([("meta__lang__is", "fr")]).unwrap().len(), 1);

        let err = q.filter([("missing__lang__is", "fr")]).unwrap_err();
        match err {
            Error::NestedFieldMissing(path) => assert_eq!(path, "missing__lang"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
