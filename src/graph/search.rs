//! Nearest-first traversal.
//!
//! All public traversals ([`Graph::closest`], [`Graph::trace`],
//! [`Graph::trace_with`]) run through [`Graph::search`], a bucket-queue
//! expansion over non-negative edge distances:
//!
//! 1. Pending cumulative distances are kept as an ascending list of
//!    distinct values (binary-search insert); each value owns a FIFO of
//!    nodes discovered at exactly that distance.
//! 2. The lowest bucket drains first. A popped node is *settled*: its
//!    distance is final and it is never revisited.
//! 3. Expanding a node walks the edge list selected by the direction,
//!    admitting an edge through the edge predicate and the far node
//!    through the node predicate and `max_depth`. A node seen earlier at a
//!    strictly larger tentative distance is moved to the smaller bucket;
//!    ties keep the first discovery. A plain first-discovery walk would
//!    keep whatever route reached a node first; here a shorter route found
//!    later replaces the earlier back-pointer, so every emitted path is a
//!    shortest one.
//! 4. After expansion the popped node is emitted as a [`Path`] if it is at
//!    least `min_depth` away and passes the result and node predicates.
//!
//! Results therefore come out in non-decreasing cumulative distance, with
//! equal distances in discovery order. Cost is O((V + E) · log D) for D
//! distinct distances.

use std::collections::VecDeque;
use std::fmt;

use hashbrown::HashMap;

use crate::model::{Direction, Edge, EdgeId, Node, NodeId, Path};
use super::Graph;

// ============================================================================
// Predicates
// ============================================================================

/// Admission test applied during traversal.
///
/// Implemented for every `Fn(&T) -> bool` closure and for [`Always`].
pub trait Predicate<T: ?Sized> {
    fn admit(&self, item: &T) -> bool;
}

impl<T: ?Sized, F: Fn(&T) -> bool> Predicate<T> for F {
    fn admit(&self, item: &T) -> bool {
        self(item)
    }
}

/// Predicate that admits everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Always;

impl<T: ?Sized> Predicate<T> for Always {
    fn admit(&self, _: &T) -> bool {
        true
    }
}

// ============================================================================
// Options
// ============================================================================

/// Traversal settings.
///
/// The predicates are type parameters, so a search with closures is
/// monomorphized and pays no dynamic dispatch.
///
/// ```rust
/// use unitgraph::{Attributed, Direction, Node, SearchOptions};
///
/// let opts = SearchOptions::new()
///     .direction(Direction::Outbound)
///     .max_depth(2.0)
///     .node_filter(|n: &Node| n.entity() == "city");
/// assert_eq!(opts.max_depth, 2.0);
/// ```
#[derive(Clone, Copy)]
pub struct SearchOptions<N = Always, E = Always, R = Always> {
    /// Gate on every node, both for traversal and for emission.
    pub node_filter: N,
    /// Gate on every edge considered for expansion.
    pub edge_filter: E,
    /// Extra gate on emission only.
    pub result_filter: R,
    /// Stop after this many results; 0 means unlimited.
    pub count: usize,
    pub direction: Direction,
    /// Suppress results closer than this.
    pub min_depth: f64,
    /// Do not expand beyond this cumulative distance; 0 means unlimited.
    pub max_depth: f64,
    /// Count every edge as distance 1.
    pub by_hop_count: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            node_filter: Always,
            edge_filter: Always,
            result_filter: Always,
            count: 0,
            direction: Direction::Both,
            min_depth: 0.0,
            max_depth: 0.0,
            by_hop_count: false,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N, E, R> SearchOptions<N, E, R> {
    pub fn node_filter<F: Fn(&Node) -> bool>(self, f: F) -> SearchOptions<F, E, R> {
        SearchOptions {
            node_filter: f,
            edge_filter: self.edge_filter,
            result_filter: self.result_filter,
            count: self.count,
            direction: self.direction,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            by_hop_count: self.by_hop_count,
        }
    }

    pub fn edge_filter<F: Fn(&Edge) -> bool>(self, f: F) -> SearchOptions<N, F, R> {
        SearchOptions {
            node_filter: self.node_filter,
            edge_filter: f,
            result_filter: self.result_filter,
            count: self.count,
            direction: self.direction,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            by_hop_count: self.by_hop_count,
        }
    }

    pub fn result_filter<F: Fn(&Node) -> bool>(self, f: F) -> SearchOptions<N, E, F> {
        SearchOptions {
            node_filter: self.node_filter,
            edge_filter: self.edge_filter,
            result_filter: f,
            count: self.count,
            direction: self.direction,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            by_hop_count: self.by_hop_count,
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn direction(mut self, direction: impl Into<Direction>) -> Self {
        self.direction = direction.into();
        self
    }

    pub fn min_depth(mut self, depth: f64) -> Self {
        self.min_depth = depth;
        self
    }

    pub fn max_depth(mut self, depth: f64) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn by_hop_count(mut self, yes: bool) -> Self {
        self.by_hop_count = yes;
        self
    }
}

impl<N, E, R> fmt::Debug for SearchOptions<N, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("count", &self.count)
            .field("direction", &self.direction)
            .field("min_depth", &self.min_depth)
            .field("max_depth", &self.max_depth)
            .field("by_hop_count", &self.by_hop_count)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bucket queue
// ============================================================================

/// Ascending distinct distances, each with its FIFO of nodes.
#[derive(Default)]
struct BucketQueue {
    depths: VecDeque<f64>,
    buckets: HashMap<u64, VecDeque<NodeId>>,
}

impl BucketQueue {
    fn push(&mut self, node: NodeId, depth: f64) {
        if let Err(pos) = self.depths.binary_search_by(|d| d.total_cmp(&depth)) {
            self.depths.insert(pos, depth);
        }
        self.buckets.entry(depth.to_bits()).or_default().push_back(node);
    }

    /// Remove and return the lowest bucket.
    fn pop(&mut self) -> Option<(f64, VecDeque<NodeId>)> {
        let depth = self.depths.pop_front()?;
        let bucket = self.buckets.remove(&depth.to_bits()).unwrap_or_default();
        Some((depth, bucket))
    }
}

/// Per-node traversal state.
struct Visit {
    depth: f64,
    /// Edge taken and the node it was taken from.
    back: Option<(EdgeId, NodeId)>,
    settled: bool,
}

// ============================================================================
// Traversal
// ============================================================================

impl Graph {
    /// General traversal primitive; see the module docs.
    ///
    /// An origin that is not in this graph yields no results.
    pub fn search<N, E, R>(&self, origin: NodeId, opts: &SearchOptions<N, E, R>) -> Vec<Path>
    where
        N: Predicate<Node>,
        E: Predicate<Edge>,
        R: Predicate<Node>,
    {
        let mut found = Vec::new();
        if self.node(origin).is_none() {
            tracing::debug!(%origin, "search origin not in graph");
            return found;
        }
        tracing::debug!(%origin, ?opts, "search");

        let mut visits: HashMap<NodeId, Visit> = HashMap::new();
        visits.insert(origin, Visit { depth: 0.0, back: None, settled: false });
        let mut queue = BucketQueue::default();
        queue.push(origin, 0.0);

        while let Some((depth, mut bucket)) = queue.pop() {
            // The bucket may grow while it drains (zero-distance edges).
            while let Some(id) = bucket.pop_front() {
                match visits.get_mut(&id) {
                    Some(v) if !v.settled && v.depth == depth => v.settled = true,
                    _ => continue, // superseded by a shorter discovery
                }

                let node = &self.nodes[id.0];
                let adjacent = match opts.direction {
                    Direction::Both => &node.edges,
                    Direction::Outbound => &node.outbound,
                    Direction::Inbound => &node.inbound,
                };

                for &eid in adjacent.iter() {
                    let edge = &self.edges[eid.0];
                    if !opts.edge_filter.admit(edge) {
                        continue;
                    }
                    let step = if opts.by_hop_count { 1.0 } else { edge.distance };
                    let next_depth = depth + step;
                    if opts.max_depth != 0.0 && next_depth > opts.max_depth {
                        continue;
                    }
                    let Some(next) = edge.opposite(id) else {
                        continue;
                    };

                    match visits.get_mut(&next) {
                        Some(v) if v.settled || v.depth <= next_depth => continue,
                        Some(v) => {
                            v.depth = next_depth;
                            v.back = Some((eid, id));
                        }
                        None => {
                            if !opts.node_filter.admit(&self.nodes[next.0]) {
                                continue;
                            }
                            visits.insert(next, Visit { depth: next_depth, back: Some((eid, id)), settled: false });
                        }
                    }

                    if next_depth == depth {
                        bucket.push_back(next);
                    } else {
                        queue.push(next, next_depth);
                    }
                }

                if depth >= opts.min_depth
                    && opts.result_filter.admit(node)
                    && opts.node_filter.admit(node)
                {
                    found.push(rebuild_path(&visits, origin, id));
                    if opts.count != 0 && found.len() >= opts.count {
                        tracing::debug!(%origin, results = found.len(), "search stopped at count");
                        return found;
                    }
                }
            }
        }

        tracing::debug!(%origin, results = found.len(), reached = visits.len(), "search done");
        found
    }

    /// Every node reachable from `origin` under `opts`, nearest first.
    pub fn closest<N, E, R>(&self, origin: NodeId, opts: &SearchOptions<N, E, R>) -> Vec<Path>
    where
        N: Predicate<Node>,
        E: Predicate<Edge>,
        R: Predicate<Node>,
    {
        self.search(origin, opts)
    }

    /// Nearest path from `from` to `to`, or an empty [`Path`] if `to` is
    /// unreachable in `direction`.
    pub fn trace(&self, from: NodeId, to: NodeId, direction: impl Into<Direction>) -> Path {
        let opts = SearchOptions::new().direction(direction);
        self.trace_with(from, to, opts)
    }

    /// [`Graph::trace`] honoring the remaining options. `count` is forced
    /// to 1 and the target test is combined with any result filter.
    pub fn trace_with<N, E, R>(&self, from: NodeId, to: NodeId, opts: SearchOptions<N, E, R>) -> Path
    where
        N: Predicate<Node>,
        E: Predicate<Edge>,
        R: Predicate<Node>,
    {
        let extra = opts.result_filter;
        let opts = SearchOptions {
            node_filter: opts.node_filter,
            edge_filter: opts.edge_filter,
            result_filter: move |n: &Node| n.id() == to && extra.admit(n),
            count: 1,
            direction: opts.direction,
            min_depth: opts.min_depth,
            max_depth: opts.max_depth,
            by_hop_count: opts.by_hop_count,
        };
        self.search(from, &opts).into_iter().next().unwrap_or_default()
    }
}

/// Follow back-pointers from `target` to `origin`.
fn rebuild_path(visits: &HashMap<NodeId, Visit>, origin: NodeId, target: NodeId) -> Path {
    let mut steps = Vec::new();
    let mut cursor = target;
    while let Some((edge, prev)) = visits.get(&cursor).and_then(|v| v.back) {
        steps.push((edge, cursor));
        cursor = prev;
    }
    debug_assert_eq!(cursor, origin);

    let mut path = Path::single(origin);
    for (edge, node) in steps.into_iter().rev() {
        path.append(edge, node);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{props, Attributed, PropertyMap, Value};
    use pretty_assertions::assert_eq;

    /// Hub graph: A–Z:1, C–Y:0.5, A–B:3, A–C:1, A–D:1, A–E:5, C–F:1.
    fn hub() -> (Graph, HashMap<&'static str, NodeId>) {
        let mut g = Graph::new();
        g.nodes_mut("node").create_index("name");
        let mut ids = HashMap::new();
        for name in ["A", "B", "C", "D", "E", "F", "Z", "Y"] {
            ids.insert(name, g.create_node("node", props([("name", name)])).unwrap());
        }
        for (a, b, d) in [("A", "Z", 1.0), ("C", "Y", 0.5), ("A", "B", 3.0), ("A", "C", 1.0), ("A", "D", 1.0), ("A", "E", 5.0), ("C", "F", 1.0)] {
            let e = g.connect("edge", PropertyMap::new(), ids[a], ids[b], false).unwrap();
            g.edge_mut(e).unwrap().set_distance(d);
        }
        (g, ids)
    }

    fn names(g: &Graph, paths: &[Path]) -> Vec<String> {
        paths
            .iter()
            .filter_map(|p| p.end())
            .filter_map(|n| g.node(n)?.get("name")?.as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_closest_order() {
        let (g, ids) = hub();
        let paths = g.closest(ids["A"], &SearchOptions::new());
        assert_eq!(names(&g, &paths), ["A", "Z", "C", "D", "Y", "F", "B", "E"]);

        let totals: Vec<f64> = paths.iter().map(|p| p.total_distance(&g)).collect();
        assert_eq!(totals, [0.0, 1.0, 1.0, 1.0, 1.5, 2.0, 3.0, 5.0]);
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_max_depth_uses_summed_distance() {
        let (g, ids) = hub();
        let paths = g.closest(ids["A"], &SearchOptions::new().max_depth(1.0));
        assert_eq!(names(&g, &paths), ["A", "Z", "C", "D"]);

        let paths = g.closest(ids["A"], &SearchOptions::new().max_depth(2.0).by_hop_count(true));
        assert_eq!(names(&g, &paths), ["A", "Z", "B", "C", "D", "E", "Y", "F"]);
    }

    #[test]
    fn test_min_depth_and_count() {
        let (g, ids) = hub();
        let paths = g.closest(ids["A"], &SearchOptions::new().min_depth(1.5).count(2));
        assert_eq!(names(&g, &paths), ["Y", "F"]);
    }

    #[test]
    fn test_direction() {
        let (g, ids) = hub();
        let inbound = g.closest(ids["Y"], &SearchOptions::new().direction(-1));
        assert_eq!(names(&g, &inbound), ["Y", "C", "A"]);

        let outbound = g.closest(ids["Y"], &SearchOptions::new().direction(1));
        assert_eq!(names(&g, &outbound), ["Y"]);
    }

    #[test]
    fn test_node_filter_blocks_traversal() {
        let (g, ids) = hub();
        let c = ids["C"];
        let paths = g.closest(ids["A"], &SearchOptions::new().node_filter(move |n: &Node| n.id() != c));
        assert_eq!(names(&g, &paths), ["A", "Z", "D", "B", "E"]);
    }

    #[test]
    fn test_edge_filter() {
        let (mut g, ids) = hub();
        let heavy = g.node(ids["A"]).unwrap().edges().to_vec();
        for e in heavy {
            if g.edge(e).unwrap().distance() > 2.0 {
                g.edge_mut(e).unwrap().set("skip", true);
            }
        }
        let opts = SearchOptions::new().edge_filter(|e: &Edge| !e.has("skip"));
        let paths = g.closest(ids["A"], &opts);
        assert_eq!(names(&g, &paths), ["A", "Z", "C", "D", "Y", "F"]);
    }

    #[test]
    fn test_result_filter() {
        let (g, ids) = hub();
        let opts = SearchOptions::new()
            .result_filter(|n: &Node| n.get("name").and_then(Value::as_str) > Some("D"));
        let paths = g.closest(ids["A"], &opts);
        assert_eq!(names(&g, &paths), ["Z", "Y", "F", "E"]);
    }

    #[test]
    fn test_trace() {
        let (g, ids) = hub();
        let path = g.trace(ids["A"], ids["Y"], 0);
        assert_eq!(path.nodes(), [ids["A"], ids["C"], ids["Y"]]);
        assert_eq!(path.distance(), 2);
        assert_eq!(path.total_distance(&g), 1.5);

        let itself = g.trace(ids["A"], ids["A"], 0);
        assert_eq!(itself.nodes(), [ids["A"]]);
        assert_eq!(itself.distance(), 0);

        // Against edge direction.
        assert!(g.trace(ids["Y"], ids["A"], 1).is_empty());
        assert_eq!(g.trace(ids["Y"], ids["A"], -1).distance(), 2);
    }

    #[test]
    fn test_shorter_route_found_later_wins() {
        let mut g = Graph::new();
        let a = g.create_node("n", PropertyMap::new()).unwrap();
        let b = g.create_node("n", PropertyMap::new()).unwrap();
        let c = g.create_node("n", PropertyMap::new()).unwrap();
        let direct = g.connect("e", PropertyMap::new(), a, c, false).unwrap();
        g.edge_mut(direct).unwrap().set_distance(5);
        let ab = g.connect("e", PropertyMap::new(), a, b, false).unwrap();
        let bc = g.connect("e", PropertyMap::new(), b, c, false).unwrap();

        let path = g.trace(a, c, 0);
        assert_eq!(path.edges(), [ab, bc]);
        assert_eq!(path.total_distance(&g), 2.0);

        let hops = g.trace_with(a, c, SearchOptions::new().by_hop_count(true));
        assert_eq!(hops.edges(), [direct]);
    }

    #[test]
    fn test_zero_distance_and_infinite_weight() {
        let mut g = Graph::new();
        let a = g.create_node("n", PropertyMap::new()).unwrap();
        let b = g.create_node("n", PropertyMap::new()).unwrap();
        let c = g.create_node("n", PropertyMap::new()).unwrap();
        let ab = g.connect("e", PropertyMap::new(), a, b, false).unwrap();
        g.edge_mut(ab).unwrap().set_distance(0);
        let bc = g.connect("e", PropertyMap::new(), b, c, false).unwrap();
        g.edge_mut(bc).unwrap().set_weight(0);

        let paths = g.closest(a, &SearchOptions::new());
        let ends: Vec<NodeId> = paths.iter().filter_map(Path::end).collect();
        assert_eq!(ends, [a, b, c]);
        assert!(paths[2].total_distance(&g).is_infinite());

        let bounded = g.closest(a, &SearchOptions::new().max_depth(100.0));
        assert_eq!(bounded.len(), 2);
    }

    #[test]
    fn test_unknown_origin() {
        let (g, _) = hub();
        assert!(g.closest(NodeId(999), &SearchOptions::new()).is_empty());
        assert!(g.trace(NodeId(999), NodeId(0), 0).is_empty());
    }
}
