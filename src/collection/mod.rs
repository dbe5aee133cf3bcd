//! Entity-scoped unit collections.
//!
//! A [`Collection`] holds the handles of every unit sharing one entity tag,
//! in insertion order, together with any number of single-field indices.
//!
//! ## Index maintenance
//!
//! - `add` registers the unit under each declared field it has an
//!   indexable value for. Duplicate values are last-write-wins.
//! - `remove` drops the entry keyed by the unit's *current* value. If that
//!   value was changed behind the collection's back (see
//!   [`Graph::node_mut`](crate::Graph::node_mut)), the stale entry is found
//!   by a sweep of that index and dropped, with a warning.
//! - Collections never read the unit arena on their own; every operation
//!   that needs property values takes the arena as an argument.
//!   [`CollectionMut`] bundles the two for ergonomic use.

use hashbrown::HashMap;

use crate::index::{key_of, FieldIndex, Handle, IndexKey};
use crate::model::Value;
use crate::query::Query;

// ============================================================================
// Collection
// ============================================================================

/// Ordered, indexed store of unit handles of one entity.
#[derive(Debug, Clone)]
pub struct Collection<H: Handle> {
    entity: String,
    sequence: Vec<H>,
    /// Declared index fields, in declaration order. The first one is the
    /// default for [`Collection::find_default`].
    index_order: Vec<String>,
    indices: HashMap<String, FieldIndex<H>>,
}

impl<H: Handle> Collection<H> {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            sequence: Vec::new(),
            index_order: Vec::new(),
            indices: HashMap::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Declared index fields, in declaration order.
    pub fn indices(&self) -> &[String] {
        &self.index_order
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.sequence.iter().copied()
    }

    pub fn units(&self) -> &[H] {
        &self.sequence
    }

    pub fn contains(&self, handle: H) -> bool {
        self.sequence.contains(&handle)
    }

    // ========================================================================
    // Index declaration
    // ========================================================================

    /// Declare an index on `field` and backfill it from the current units.
    pub fn create_index(&mut self, field: &str, arena: &[H::Unit]) -> &mut Self {
        self.create_indices([field], arena)
    }

    /// Declare several indices at once. Re-declaring a field rebuilds it.
    pub fn create_indices<'f>(
        &mut self,
        fields: impl IntoIterator<Item = &'f str>,
        arena: &[H::Unit],
    ) -> &mut Self {
        for field in fields {
            if !self.index_order.iter().any(|f| f == field) {
                self.index_order.push(field.to_string());
            }
            let mut index = FieldIndex::new();
            for &handle in &self.sequence {
                if let Some(key) = key_of(handle, field, arena) {
                    index.insert(key, handle);
                }
            }
            tracing::debug!(entity = %self.entity, field, entries = index.len(), "index built");
            self.indices.insert(field.to_string(), index);
        }
        self
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Append a unit and register it in every declared index.
    pub fn add(&mut self, handle: H, arena: &[H::Unit]) {
        self.sequence.push(handle);
        for (field, index) in self.indices.iter_mut() {
            if let Some(key) = key_of(handle, field, arena) {
                index.insert(key, handle);
            }
        }
    }

    /// Remove the first occurrence of `handle` and its index entries.
    ///
    /// Returns false if the unit was not a member.
    pub fn remove(&mut self, handle: H, arena: &[H::Unit]) -> bool {
        let Some(pos) = self.sequence.iter().position(|h| *h == handle) else {
            return false;
        };
        self.sequence.remove(pos);

        for (field, index) in self.indices.iter_mut() {
            let key = key_of(handle, field, arena);
            let cleared = match &key {
                Some(k) if index.get(k) == Some(&handle) => {
                    index.remove(k);
                    true
                }
                _ => false,
            };
            if !cleared {
                let before = index.len();
                index.retain(|_, h| *h != handle);
                if index.len() != before {
                    tracing::warn!(
                        entity = %self.entity,
                        field = %field,
                        "indexed field changed without re-indexing; stale entry swept on remove"
                    );
                }
            }
            // Another member may still hold the same value.
            if let Some(k) = key {
                if !index.contains_key(&k) {
                    if let Some(&holder) = self
                        .sequence
                        .iter()
                        .rev()
                        .find(|h| key_of(**h, field, arena).as_ref() == Some(&k))
                    {
                        index.insert(k, holder);
                    }
                }
            }
        }
        true
    }

    /// Move `handle`'s entry in `field` from `old` to its current value.
    pub fn reindex(&mut self, handle: H, field: &str, old: Option<&Value>, arena: &[H::Unit]) {
        if !self.contains(handle) {
            return;
        }
        let Some(index) = self.indices.get_mut(field) else {
            return;
        };
        if let Some(old_key) = old.and_then(IndexKey::from_value) {
            if index.get(&old_key) == Some(&handle) {
                index.remove(&old_key);
            }
        }
        if let Some(key) = key_of(handle, field, arena) {
            index.insert(key, handle);
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Look up a unit through the index on `field`.
    ///
    /// `None` when the field is not indexed or no unit holds `value`.
    pub fn find(&self, field: &str, value: impl Into<Value>) -> Option<H> {
        let key = IndexKey::from_value(&value.into())?;
        self.indices.get(field)?.get(&key).copied()
    }

    /// Look up through the first-declared index.
    pub fn find_default(&self, value: impl Into<Value>) -> Option<H> {
        let field = self.index_order.first()?;
        self.find(field, value)
    }

    /// `find` + `remove`. Returns the removed unit.
    pub fn destroy(&mut self, field: &str, value: impl Into<Value>, arena: &[H::Unit]) -> Option<H> {
        let handle = self.find(field, value)?;
        self.remove(handle, arena);
        Some(handle)
    }

    /// `destroy` through the first-declared index.
    pub fn destroy_default(&mut self, value: impl Into<Value>, arena: &[H::Unit]) -> Option<H> {
        let field = self.index_order.first()?.clone();
        self.destroy(&field, value, arena)
    }

    /// Snapshot of the current members for filtering.
    pub fn query<'g>(&self, arena: &'g [H::Unit]) -> Query<'g, H::Unit> {
        Query::new(self.sequence.iter().filter_map(|h| h.resolve(arena)))
    }
}

// ============================================================================
// CollectionMut: collection + arena view
// ============================================================================

/// A collection borrowed together with the arena its handles point into.
///
/// Returned by [`Graph::nodes_mut`](crate::Graph::nodes_mut) and
/// [`Graph::edges_mut`](crate::Graph::edges_mut).
pub struct CollectionMut<'g, H: Handle> {
    pub(crate) collection: &'g mut Collection<H>,
    pub(crate) arena: &'g [H::Unit],
}

impl<'g, H: Handle> CollectionMut<'g, H> {
    pub fn create_index(&mut self, field: &str) -> &mut Self {
        self.collection.create_index(field, self.arena);
        self
    }

    pub fn create_indices<'f>(&mut self, fields: impl IntoIterator<Item = &'f str>) -> &mut Self {
        self.collection.create_indices(fields, self.arena);
        self
    }

    pub fn remove(&mut self, handle: H) -> bool {
        self.collection.remove(handle, self.arena)
    }

    pub fn destroy(&mut self, field: &str, value: impl Into<Value>) -> Option<H> {
        self.collection.destroy(field, value, self.arena)
    }

    pub fn destroy_default(&mut self, value: impl Into<Value>) -> Option<H> {
        self.collection.destroy_default(value, self.arena)
    }

    pub fn find(&self, field: &str, value: impl Into<Value>) -> Option<H> {
        self.collection.find(field, value)
    }

    pub fn find_default(&self, value: impl Into<Value>) -> Option<H> {
        self.collection.find_default(value)
    }

    pub fn query(&self) -> Query<'g, H::Unit> {
        self.collection.query(self.arena)
    }

    pub fn collection(&self) -> &Collection<H> {
        self.collection
    }
}

// ============================================================================
// Tests
// ============================================================================
