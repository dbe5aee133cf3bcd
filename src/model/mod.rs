//! # Unit Graph Model
//!
//! Plain data that crosses every boundary: graph ↔ collection ↔ query ↔ user.
//!
//! Nodes and edges live in arenas owned by [`Graph`](crate::Graph) and refer
//! to each other through [`NodeId`] / [`EdgeId`] handles, never through
//! references.

pub mod unit;
pub mod node;
pub mod edge;
pub mod path;
pub mod value;
pub mod property_map;

pub use unit::{Attributed, Unit, UniqueId};
pub use node::{EdgeList, Node, NodeId};
pub use edge::{Direction, Edge, EdgeId, DEFAULT_DISTANCE};
pub use path::{Path, PathStep};
pub use value::Value;
pub use property_map::{props, PropertyMap};
