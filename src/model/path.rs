//! Path: a sequence of alternating nodes and edges.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use super::{EdgeId, NodeId};
use crate::Graph;

/// One element of a path's alternating sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    Node(NodeId),
    Edge(EdgeId),
}

/// A path in the graph: node -[edge]- node -[edge]- node ...
///
/// Empty when no path exists; otherwise `nodes` has exactly one more
/// element than `edges`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

impl Path {
    /// The "no path" value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(node: NodeId) -> Self {
        Self { nodes: vec![node], edges: Vec::new() }
    }

    /// Extend path with an edge and the node it leads to.
    pub(crate) fn append(&mut self, edge: EdgeId, node: NodeId) {
        debug_assert!(!self.nodes.is_empty(), "append to an empty path");
        self.edges.push(edge);
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of entries in the alternating sequence (`2k + 1`, or 0).
    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hop count: the number of edges on the path.
    ///
    /// This is not the summed edge distance; see [`Path::total_distance`].
    pub fn distance(&self) -> usize {
        self.len() / 2
    }

    /// Sum of the distances of the edges on the path.
    pub fn total_distance(&self, graph: &Graph) -> f64 {
        self.edges
            .iter()
            .filter_map(|e| graph.edge(*e))
            .fold(0.0, |acc, e| acc + e.distance())
    }

    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn end(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// The alternating sequence `n0, e0, n1, ..., nk`.
    pub fn raw(&self) -> Vec<PathStep> {
        let mut raw = Vec::with_capacity(self.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                raw.push(PathStep::Edge(self.edges[i - 1]));
            }
            raw.push(PathStep::Node(*node));
        }
        raw
    }

    /// Human-readable rendering.
    ///
    /// Each edge is framed by `<>` when duplex, `>>` when it points away
    /// from the node printed before it, and `<<` otherwise:
    ///
    /// ```text
    /// Node (node {"name":"A"}) >> Edge (edge {}) >> Node (node {"name":"C"})
    /// ```
    pub fn prettify(&self, graph: &Graph) -> String {
        let mut out = String::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                let prev = self.nodes[i - 1];
                if let Some(edge) = graph.edge(self.edges[i - 1]) {
                    let glyph = if edge.is_duplex() {
                        "<>"
                    } else if edge.input() == Some(prev) {
                        ">>"
                    } else {
                        "<<"
                    };
                    let _ = write!(out, " {glyph} {edge} {glyph}");
                }
                out.push(' ');
            }
            match graph.node(*node) {
                Some(n) => { let _ = write!(out, "{n}"); }
                None => { let _ = write!(out, "{node}"); }
            }
        }
        out
    }
}

impl FromIterator<PathStep> for Path {
    /// Build from an alternating sequence; malformed input is cut at the
    /// first out-of-place step.
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        let mut path = Path::empty();
        let mut pending_edge = None;
        for step in iter {
            match (step, path.nodes.is_empty(), pending_edge) {
                (PathStep::Node(n), true, None) => path.nodes.push(n),
                (PathStep::Edge(e), false, None) => pending_edge = Some(e),
                (PathStep::Node(n), false, Some(e)) => {
                    path.append(e, n);
                    pending_edge = None;
                }
                _ => break,
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path() {
        let p = Path::empty();
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
        assert_eq!(p.distance(), 0);
        assert_eq!(p.start(), None);
    }

    #[test]
    fn test_raw_alternates() {
        let mut p = Path::single(NodeId(0));
        p.append(EdgeId(5), NodeId(1));
        p.append(EdgeId(6), NodeId(2));
        assert_eq!(p.len(), 5);
        assert_eq!(p.distance(), 2);
        assert_eq!(
            p.raw(),
            vec![
                PathStep::Node(NodeId(0)),
                PathStep::Edge(EdgeId(5)),
                PathStep::Node(NodeId(1)),
                PathStep::Edge(EdgeId(6)),
                PathStep::Node(NodeId(2)),
            ]
        );
        assert_eq!(p.raw().into_iter().collect::<Path>(), p);
        assert_eq!(p.start(), Some(NodeId(0)));
        assert_eq!(p.end(), Some(NodeId(2)));
    }

    #[test]
    fn test_total_distance_of_single_node_is_positive_zero() {
        let mut g = Graph::new();
        let a = g.create_node("n", crate::PropertyMap::new()).unwrap();
        let total = Path::single(a).total_distance(&g);
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive());
        assert_eq!(total.to_string(), "0");
        assert_eq!(Path::empty().total_distance(&g).to_string(), "0");
    }
}
