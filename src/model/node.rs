//! Node in the unit graph.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::unit::{fmt_unit, Attributed, Unit};
use super::EdgeId;

/// Arena handle of a node within its [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Incident edge handles. Most nodes have only a handful.
pub type EdgeList = SmallVec<[EdgeId; 4]>;

/// A node: a unit plus the edges incident to it.
///
/// Adjacency is maintained by [`Graph::link`](crate::Graph::link) and
/// [`Graph::unlink`](crate::Graph::unlink); the lists only hold handles.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) unit: Unit,
    pub(crate) edges: EdgeList,
    pub(crate) inbound: EdgeList,
    pub(crate) outbound: EdgeList,
}

impl Node {
    pub(crate) fn new(id: NodeId, unit: Unit) -> Self {
        Self {
            id,
            unit,
            edges: EdgeList::new(),
            inbound: EdgeList::new(),
            outbound: EdgeList::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Every incident edge.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Edges traversable into this node (directed-in plus duplex).
    pub fn inbound(&self) -> &[EdgeId] {
        &self.inbound
    }

    /// Edges traversable out of this node (directed-out plus duplex).
    pub fn outbound(&self) -> &[EdgeId] {
        &self.outbound
    }
}

impl Attributed for Node {
    const KIND: &'static str = "Node";

    fn unit(&self) -> &Unit { &self.unit }
    fn unit_mut(&mut self) -> &mut Unit { &mut self.unit }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_unit(self, f)
    }
}

/// Remove the first occurrence of `edge` from `list`.
pub(crate) fn remove_edge(list: &mut EdgeList, edge: EdgeId) -> bool {
    match list.iter().position(|e| *e == edge) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}
