//! Edge in the unit graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::unit::{fmt_unit, Attributed, Unit};
use super::{NodeId, Value};

/// Arena handle of an edge within its [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Follow every incident edge.
    #[default]
    Both,
    /// Follow only edges leaving the current node.
    Outbound,
    /// Follow only edges entering the current node.
    Inbound,
}

/// Signed shorthand: `0` both, `> 0` outbound, `< 0` inbound.
impl From<i32> for Direction {
    fn from(d: i32) -> Self {
        match d {
            0 => Direction::Both,
            d if d > 0 => Direction::Outbound,
            _ => Direction::Inbound,
        }
    }
}

/// Default traversal cost of a freshly created edge.
pub const DEFAULT_DISTANCE: f64 = 1.0;

/// An edge: a unit that links an input node to an output node.
///
/// Endpoints are either both set (linked) or both unset (unlinked).
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) unit: Unit,
    pub(crate) input: Option<NodeId>,
    pub(crate) output: Option<NodeId>,
    pub(crate) duplex: bool,
    pub(crate) distance: f64,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, unit: Unit) -> Self {
        Self {
            id,
            unit,
            input: None,
            output: None,
            duplex: false,
            distance: DEFAULT_DISTANCE,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn input(&self) -> Option<NodeId> {
        self.input
    }

    pub fn output(&self) -> Option<NodeId> {
        self.output
    }

    /// `(input, output)` when linked.
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        self.input.zip(self.output)
    }

    pub fn is_linked(&self) -> bool {
        self.endpoints().is_some()
    }

    pub fn is_duplex(&self) -> bool {
        self.duplex
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// `distance = |v|`, non-numeric input counts as 0.
    ///
    /// A zero distance is accepted; it makes the far node as close as the
    /// near one.
    pub fn set_distance(&mut self, v: impl Into<Value>) -> &mut Self {
        self.distance = v.into().parse_number().unwrap_or(0.0).abs();
        self
    }

    /// `distance = 1 / |v|`. A weight of 0 gives an infinite distance.
    pub fn set_weight(&mut self, v: impl Into<Value>) -> &mut Self {
        self.distance = 1.0 / v.into().parse_number().unwrap_or(0.0).abs();
        self
    }

    /// The endpoint that is not `node`, or `None` if `node` is not an endpoint.
    pub fn opposite(&self, node: NodeId) -> Option<NodeId> {
        if self.input == Some(node) {
            self.output
        } else if self.output == Some(node) {
            self.input
        } else {
            None
        }
    }
}

impl Attributed for Edge {
    const KIND: &'static str = "Edge";

    fn unit(&self) -> &Unit { &self.unit }
    fn unit_mut(&mut self) -> &mut Unit { &mut self.unit }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_unit(self, f)
    }
}
