//! # Graph
//!
//! Owns every unit, hands out ids, keeps per-entity collections and the
//! node ↔ edge adjacency in sync.
//!
//! ## Ownership
//!
//! Nodes and edges live in two arenas (`Vec<Node>`, `Vec<Edge>`). Units are
//! never removed from the arenas, so a [`NodeId`] / [`EdgeId`] stays valid
//! for the lifetime of the graph. Edges are detached with
//! [`Graph::unlink`]; collections drop members with
//! [`CollectionMut::remove`] / [`CollectionMut::destroy`].
//!
//! ## Ids
//!
//! One counter serves nodes and edges. It starts at `2^53 - 1` and counts
//! down; each id is the counter value in lower-case hex. Once id `0` has
//! been handed out the counter is exhausted and the factories return
//! [`Error::IdsExhausted`].

pub mod search;

use hashbrown::HashMap;

use crate::collection::{Collection, CollectionMut};
use crate::index::Handle;
use crate::model::*;
use crate::query::Query;
use crate::{Error, Result};

pub use search::{Always, Predicate, SearchOptions};

/// Largest integer a double represents exactly; default id seed.
pub const DEFAULT_ID_SEED: u64 = (1 << 53) - 1;

/// Graph construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// First id handed out; subsequent ids count down from here.
    pub id_seed: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { id_seed: DEFAULT_ID_SEED }
    }
}

/// Result of a global id lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRef {
    Node(NodeId),
    Edge(EdgeId),
}

impl UnitRef {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            UnitRef::Node(id) => Some(id),
            UnitRef::Edge(_) => None,
        }
    }

    pub fn as_edge(self) -> Option<EdgeId> {
        match self {
            UnitRef::Edge(id) => Some(id),
            UnitRef::Node(_) => None,
        }
    }
}

/// Per-entity collections plus their creation order.
#[derive(Debug, Clone)]
pub(crate) struct Entities<H: Handle> {
    pub(crate) by_name: HashMap<String, Collection<H>>,
    pub(crate) order: Vec<String>,
}

impl<H: Handle> Default for Entities<H> {
    fn default() -> Self {
        Self { by_name: HashMap::new(), order: Vec::new() }
    }
}

impl<H: Handle> Entities<H> {
    fn get_or_create(&mut self, entity: &str) -> &mut Collection<H> {
        if !self.by_name.contains_key(entity) {
            self.order.push(entity.to_string());
        }
        self.by_name
            .entry(entity.to_string())
            .or_insert_with(|| Collection::new(entity))
    }

    /// Collections in creation order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Collection<H>> + '_ {
        self.order.iter().filter_map(|e| self.by_name.get(e))
    }
}

/// In-memory attributed graph.
#[derive(Debug, Clone)]
pub struct Graph {
    config: GraphConfig,
    /// Next id to hand out; `None` once `0` has been used.
    counter: Option<u64>,
    lookup: HashMap<UniqueId, UnitRef>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_entities: Entities<NodeId>,
    edge_entities: Entities<EdgeId>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            counter: Some(config.id_seed),
            lookup: HashMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            node_entities: Entities::default(),
            edge_entities: Entities::default(),
        }
    }

    pub fn config(&self) -> GraphConfig {
        self.config
    }

    /// The value the next allocated id will carry, `None` if exhausted.
    pub fn next_id_seed(&self) -> Option<u64> {
        self.counter
    }

    fn allocate_uid(&mut self) -> Result<UniqueId> {
        let value = self.counter.ok_or(Error::IdsExhausted)?;
        self.counter = value.checked_sub(1);
        Ok(UniqueId::from_counter(value))
    }

    // ========================================================================
    // Unit factories
    // ========================================================================

    /// Create a node and register it in its entity's collection.
    pub fn create_node(&mut self, entity: &str, properties: PropertyMap) -> Result<NodeId> {
        let uid = self.allocate_uid()?;
        Ok(self.insert_node(entity, properties, uid))
    }

    /// Create an unlinked edge (distance 1) and register it in its entity's
    /// collection.
    pub fn create_edge(&mut self, entity: &str, properties: PropertyMap) -> Result<EdgeId> {
        let uid = self.allocate_uid()?;
        Ok(self.insert_edge(entity, properties, uid))
    }

    pub(crate) fn insert_node(&mut self, entity: &str, properties: PropertyMap, uid: UniqueId) -> NodeId {
        let id = NodeId(self.nodes.len());
        tracing::trace!(%uid, entity, "create node");
        self.lookup.insert(uid.clone(), UnitRef::Node(id));
        self.nodes.push(Node::new(id, Unit::new(entity, properties, uid)));
        self.node_entities.get_or_create(entity).add(id, &self.nodes);
        id
    }

    pub(crate) fn insert_edge(&mut self, entity: &str, properties: PropertyMap, uid: UniqueId) -> EdgeId {
        let id = EdgeId(self.edges.len());
        tracing::trace!(%uid, entity, "create edge");
        self.lookup.insert(uid.clone(), UnitRef::Edge(id));
        self.edges.push(Edge::new(id, Unit::new(entity, properties, uid)));
        self.edge_entities.get_or_create(entity).add(id, &self.edges);
        id
    }

    /// Validate an externally supplied id and return its counter value.
    pub(crate) fn claim_uid(&self, uid: &UniqueId) -> Result<u64> {
        let value = uid
            .counter()
            .ok_or_else(|| Error::InvalidId(uid.to_string()))?;
        if self.lookup.contains_key(uid) {
            return Err(Error::DuplicateId(uid.to_string()));
        }
        Ok(value)
    }

    pub(crate) fn set_next_id_seed(&mut self, seed: Option<u64>) {
        self.counter = seed;
    }

    pub(crate) fn lookup_uid(&self, uid: &UniqueId) -> Option<UnitRef> {
        self.lookup.get(uid).copied()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Global lookup by unique id.
    pub fn unit(&self, uid: &str) -> Option<UnitRef> {
        self.lookup.get(&UniqueId::from(uid)).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// Mutable access to a node's properties.
    ///
    /// Changing an indexed field here leaves the collection index pointing
    /// at the old value; use [`Graph::set_node_property`] to keep indices
    /// in step.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Mutable access to an edge's properties and distance. Same index
    /// caveat as [`Graph::node_mut`].
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.0)
    }

    /// Set a node property and move its index entry if the field is indexed.
    pub fn set_node_property(&mut self, id: NodeId, key: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        let node = self.nodes.get_mut(id.0).ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
        let old = node.unit.set(key, value);
        let entity = node.unit.entity().to_string();
        if let Some(coll) = self.node_entities.by_name.get_mut(&entity) {
            coll.reindex(id, key, old.as_ref(), &self.nodes);
        }
        Ok(old)
    }

    /// Set an edge property and move its index entry if the field is indexed.
    pub fn set_edge_property(&mut self, id: EdgeId, key: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        let edge = self.edges.get_mut(id.0).ok_or_else(|| Error::NotFound(format!("Edge {id}")))?;
        let old = edge.unit.set(key, value);
        let entity = edge.unit.entity().to_string();
        if let Some(coll) = self.edge_entities.by_name.get_mut(&entity) {
            coll.reindex(id, key, old.as_ref(), &self.edges);
        }
        Ok(old)
    }

    /// Move a node's `field` index entry from `old` to the current value,
    /// after a change made through [`Graph::node_mut`].
    pub fn reindex_node(&mut self, id: NodeId, field: &str, old: Option<&Value>) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        if let Some(coll) = self.node_entities.by_name.get_mut(node.unit.entity()) {
            coll.reindex(id, field, old, &self.nodes);
        }
    }

    pub fn reindex_edge(&mut self, id: EdgeId, field: &str, old: Option<&Value>) {
        let Some(edge) = self.edges.get(id.0) else {
            return;
        };
        if let Some(coll) = self.edge_entities.by_name.get_mut(edge.unit.entity()) {
            coll.reindex(id, field, old, &self.edges);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every node, in creation order.
    pub fn all_nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every edge, in creation order.
    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// The node collection for `entity`, if any node or index declaration
    /// created it.
    pub fn nodes(&self, entity: &str) -> Option<&Collection<NodeId>> {
        self.node_entities.by_name.get(entity)
    }

    pub fn edges(&self, entity: &str) -> Option<&Collection<EdgeId>> {
        self.edge_entities.by_name.get(entity)
    }

    /// The node collection for `entity`, created on first use.
    pub fn nodes_mut(&mut self, entity: &str) -> CollectionMut<'_, NodeId> {
        CollectionMut {
            collection: self.node_entities.get_or_create(entity),
            arena: &self.nodes,
        }
    }

    pub fn edges_mut(&mut self, entity: &str) -> CollectionMut<'_, EdgeId> {
        CollectionMut {
            collection: self.edge_entities.get_or_create(entity),
            arena: &self.edges,
        }
    }

    /// Node collections in creation order.
    pub fn node_collections(&self) -> impl Iterator<Item = &Collection<NodeId>> + '_ {
        self.node_entities.iter()
    }

    pub fn edge_collections(&self) -> impl Iterator<Item = &Collection<EdgeId>> + '_ {
        self.edge_entities.iter()
    }

    /// Snapshot query over the nodes of `entity` (empty if unknown).
    pub fn node_query(&self, entity: &str) -> Query<'_, Node> {
        match self.nodes(entity) {
            Some(c) => c.query(&self.nodes),
            None => Query::new([]),
        }
    }

    pub fn edge_query(&self, entity: &str) -> Query<'_, Edge> {
        match self.edges(entity) {
            Some(c) => c.query(&self.edges),
            None => Query::new([]),
        }
    }

    // ========================================================================
    // Adjacency
    // ========================================================================

    /// Connect `edge` from `input` to `output`, replacing any prior link.
    ///
    /// A directed edge is outbound on `input` and inbound on `output`; a
    /// duplex edge is both on each end.
    pub fn link(&mut self, edge: EdgeId, input: NodeId, output: NodeId, duplex: bool) -> Result<EdgeId> {
        if self.edge(edge).is_none() {
            return Err(Error::NotFound(format!("Edge {edge}")));
        }
        for node in [input, output] {
            if self.node(node).is_none() {
                return Err(Error::NotFound(format!("Node {node}")));
            }
        }

        self.unlink(edge);

        let e = &mut self.edges[edge.0];
        e.input = Some(input);
        e.output = Some(output);
        e.duplex = duplex;

        let inp = &mut self.nodes[input.0];
        inp.edges.push(edge);
        inp.outbound.push(edge);
        if duplex {
            inp.inbound.push(edge);
        }

        let out = &mut self.nodes[output.0];
        out.edges.push(edge);
        out.inbound.push(edge);
        if duplex {
            out.outbound.push(edge);
        }

        tracing::trace!(%edge, %input, %output, duplex, "link");
        Ok(edge)
    }

    /// Detach `edge` from both endpoints. Returns false if it was not linked.
    pub fn unlink(&mut self, edge: EdgeId) -> bool {
        let Some(e) = self.edges.get_mut(edge.0) else {
            return false;
        };
        let Some((input, output)) = e.endpoints() else {
            return false;
        };
        let duplex = e.duplex;
        e.input = None;
        e.output = None;
        e.duplex = false;

        let inp = &mut self.nodes[input.0];
        node::remove_edge(&mut inp.edges, edge);
        node::remove_edge(&mut inp.outbound, edge);
        if duplex {
            node::remove_edge(&mut inp.inbound, edge);
        }

        let out = &mut self.nodes[output.0];
        node::remove_edge(&mut out.edges, edge);
        node::remove_edge(&mut out.inbound, edge);
        if duplex {
            node::remove_edge(&mut out.outbound, edge);
        }

        tracing::trace!(%edge, %input, %output, "unlink");
        true
    }

    /// Detach every edge incident to `node`. Returns how many were detached.
    pub fn unlink_node(&mut self, node: NodeId) -> usize {
        let incident: Vec<EdgeId> = match self.node(node) {
            Some(n) => n.edges.to_vec(),
            None => return 0,
        };
        incident.into_iter().filter(|e| self.unlink(*e)).count()
    }

    /// Convenience: create an edge and link it in one call.
    pub fn connect(
        &mut self,
        entity: &str,
        properties: PropertyMap,
        input: NodeId,
        output: NodeId,
        duplex: bool,
    ) -> Result<EdgeId> {
        for node in [input, output] {
            if self.node(node).is_none() {
                return Err(Error::NotFound(format!("Node {node}")));
            }
        }
        let edge = self.create_edge(entity, properties)?;
        self.link(edge, input, output, duplex)
    }
}
