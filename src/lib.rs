//! # unitgraph: In-memory attributed graph
//!
//! Nodes and edges ("units") carry an entity tag, a property bag and a
//! stable hex id. Units of one entity live in an ordered, optionally
//! indexed [`Collection`]; collections can be snapshotted into a [`Query`]
//! and filtered with `field__op` criteria. Edges have a non-negative
//! distance and a direction, and [`Graph::closest`] / [`Graph::trace`]
//! walk them nearest-first.
//!
//! ## Design Principles
//!
//! 1. **Arena-owned units**: the [`Graph`] owns every node and edge;
//!    everything else refers to them by [`NodeId`] / [`EdgeId`]
//! 2. **One property model**: [`Value`] and [`PropertyMap`] are shared by
//!    nodes, edges, filters and the export record
//! 3. **Queries are snapshots**: filtering never touches the collection
//! 4. **Traversal is a pure read**: predicates see shared references only
//!
//! ## Quick Start
//!
//! ```rust
//! use unitgraph::{props, Attributed, Graph, SearchOptions};
//!
//! let mut graph = Graph::new();
//! graph.nodes_mut("city").create_index("name");
//!
//! let paris = graph.create_node("city", props([("name", "Paris")]))?;
//! let lyon = graph.create_node("city", props([("name", "Lyon")]))?;
//! let nice = graph.create_node("city", props([("name", "Nice")]))?;
//!
//! let road = graph.connect("road", props([("km", 465)]), paris, lyon, true)?;
//! graph.edge_mut(road).unwrap().set_distance(465);
//! let road = graph.connect("road", props([("km", 470)]), lyon, nice, true)?;
//! graph.edge_mut(road).unwrap().set_distance(470);
//!
//! let path = graph.trace(paris, nice, 0);
//! assert_eq!(path.total_distance(&graph), 935.0);
//!
//! let near = graph.closest(paris, &SearchOptions::new().max_depth(500.0));
//! assert_eq!(near.len(), 2);
//!
//! let lyon_again = graph.nodes("city").unwrap().find("name", "Lyon");
//! assert_eq!(lyon_again, Some(lyon));
//! assert_eq!(graph.node(lyon).unwrap().entity(), "city");
//! # Ok::<(), unitgraph::Error>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`model`] | `Value`, `Unit`, `Node`, `Edge`, `Path` |
//! | [`index`] | index keys and per-field lookup tables |
//! | [`collection`] | entity collections |
//! | [`query`] | filter criteria and snapshots |
//! | [`graph`] | the graph, adjacency, traversal |
//! | [`export`] | export record and JSON helpers |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod index;
pub mod collection;
pub mod query;
pub mod graph;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    props, Attributed, Direction, Edge, EdgeId, Node, NodeId, Path, PathStep,
    PropertyMap, UniqueId, Unit, Value, DEFAULT_DISTANCE,
};

// ============================================================================
// Re-exports: Collections and queries
// ============================================================================

pub use collection::{Collection, CollectionMut};
pub use index::IndexKey;
pub use query::{Criteria, FilterOp, Query};

// ============================================================================
// Re-exports: Graph
// ============================================================================

pub use graph::{Always, Graph, GraphConfig, Predicate, SearchOptions, UnitRef};
pub use export::GraphExport;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filter type \"{op}\" not supported (in criteria key \"{key}\")")]
    InvalidFilterOperator { op: String, key: String },

    #[error("Nested field {0} does not exist")]
    NestedFieldMissing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid unit id: {0}")]
    InvalidId(String),

    #[error("Duplicate unit id: {0}")]
    DuplicateId(String),

    #[error("Unit id space exhausted")]
    IdsExhausted,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
