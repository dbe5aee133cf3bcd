//! Graph export / import.
//!
//! A [`GraphExport`] is a plain record of everything needed to rebuild a
//! graph: collection declarations (entity + indexed fields), node records
//! and edge records with endpoints referenced by unique id.
//!
//! ```text
//! Graph → export() → GraphExport → serde_json → {"nc":…,"ec":…,"n":…,"e":…}
//!       ← import() ←             ← serde_json ←
//! ```
//!
//! The record is deliberately compact: tuples instead of objects, short
//! top-level keys. Non-finite edge distances are written as `null` and
//! read back as infinity.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::graph::{Graph, UnitRef};
use crate::model::*;
use crate::{Error, Result};

/// `[entity, [indexed fields]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDecl(pub String, pub Vec<String>);

/// `[entity, properties, uid]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord(pub String, pub PropertyMap, pub UniqueId);

/// `[entity, properties, uid, input uid, output uid, duplex, distance]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord(
    pub String,
    pub PropertyMap,
    pub UniqueId,
    pub Option<UniqueId>,
    pub Option<UniqueId>,
    pub u8,
    #[serde(with = "distance")] pub f64,
);

/// Serializable snapshot of a whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    #[serde(rename = "nc")]
    pub node_collections: Vec<CollectionDecl>,
    #[serde(rename = "ec")]
    pub edge_collections: Vec<CollectionDecl>,
    #[serde(rename = "n")]
    pub nodes: Vec<NodeRecord>,
    #[serde(rename = "e")]
    pub edges: Vec<EdgeRecord>,
}

/// `f64` that survives JSON when it is infinite.
mod distance {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &f64, s: S) -> Result<S::Ok, S::Error> {
        if d.is_finite() {
            s.serialize_f64(*d)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
    }
}

impl Graph {
    /// Snapshot every unit and collection declaration.
    pub fn export(&self) -> GraphExport {
        let node_collections = self
            .node_collections()
            .map(|c| CollectionDecl(c.entity().to_string(), c.indices().to_vec()))
            .collect();
        let edge_collections = self
            .edge_collections()
            .map(|c| CollectionDecl(c.entity().to_string(), c.indices().to_vec()))
            .collect();

        let nodes = self
            .all_nodes()
            .iter()
            .map(|n| {
                let (entity, properties, uid) = n.unit().export();
                NodeRecord(entity, properties, uid)
            })
            .collect();

        let uid_of = |id: Option<NodeId>| id.and_then(|n| self.node(n)).map(|n| n.uid().clone());
        let edges = self
            .all_edges()
            .iter()
            .map(|e| {
                let (entity, properties, uid) = e.unit().export();
                EdgeRecord(
                    entity,
                    properties,
                    uid,
                    uid_of(e.input()),
                    uid_of(e.output()),
                    u8::from(e.is_duplex()),
                    e.distance(),
                )
            })
            .collect();

        let export = GraphExport { node_collections, edge_collections, nodes, edges };
        tracing::debug!(nodes = export.nodes.len(), edges = export.edges.len(), "graph exported");
        export
    }

    /// Replace this graph's contents with `data`.
    ///
    /// All-or-nothing: on error the graph is left untouched. Ids keep
    /// counting down from below both the current counter and the smallest
    /// imported id.
    pub fn import(&mut self, data: &GraphExport) -> Result<()> {
        let mut scratch = Graph::with_config(self.config());
        let mut lowest = self.next_id_seed();

        for CollectionDecl(entity, fields) in &data.node_collections {
            scratch.nodes_mut(entity).create_indices(fields.iter().map(String::as_str));
        }
        for CollectionDecl(entity, fields) in &data.edge_collections {
            scratch.edges_mut(entity).create_indices(fields.iter().map(String::as_str));
        }

        for NodeRecord(entity, properties, uid) in &data.nodes {
            let value = scratch.claim_uid(uid)?;
            lowest = lowest.map(|l| l.min(value));
            scratch.insert_node(entity, properties.clone(), uid.clone());
        }

        for EdgeRecord(entity, properties, uid, input, output, duplex, distance) in &data.edges {
            let value = scratch.claim_uid(uid)?;
            lowest = lowest.map(|l| l.min(value));
            let edge = scratch.insert_edge(entity, properties.clone(), uid.clone());
            if let Some(e) = scratch.edge_mut(edge) {
                e.set_distance(*distance);
            }
            match (input, output) {
                (Some(i), Some(o)) => {
                    let input = scratch.endpoint(i)?;
                    let output = scratch.endpoint(o)?;
                    scratch.link(edge, input, output, *duplex != 0)?;
                }
                (None, None) => {}
                (Some(only), None) | (None, Some(only)) => {
                    return Err(Error::NotFound(format!("second endpoint of edge {uid} (first is {only})")));
                }
            }
        }

        scratch.set_next_id_seed(lowest.and_then(|l| l.checked_sub(1)));
        tracing::debug!(
            nodes = scratch.node_count(),
            edges = scratch.edge_count(),
            next_id = ?scratch.next_id_seed(),
            "graph imported"
        );
        *self = scratch;
        Ok(())
    }

    /// Fresh graph built from `data`.
    pub fn from_export(data: &GraphExport) -> Result<Self> {
        let mut graph = Graph::new();
        graph.import(data)?;
        Ok(graph)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.export())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data: GraphExport = serde_json::from_str(json)?;
        Self::from_export(&data)
    }

    /// [`Graph::import`] from a JSON document.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let data: GraphExport = serde_json::from_str(json)?;
        self.import(&data)
    }

    fn endpoint(&self, uid: &UniqueId) -> Result<NodeId> {
        self.lookup_uid(uid)
            .and_then(UnitRef::as_node)
            .ok_or_else(|| Error::NotFound(format!("Node {uid}")))
    }
}

/// Write `graph` as JSON.
pub fn write_json<W: Write>(graph: &Graph, mut writer: W) -> Result<()> {
    serde_json::to_writer(&mut writer, &graph.export())?;
    writer.flush()?;
    Ok(())
}

/// Read a graph written by [`write_json`].
pub fn read_json<R: Read>(reader: R) -> Result<Graph> {
    let data: GraphExport = serde_json::from_reader(reader)?;
    Graph::from_export(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_ID_SEED;
    use pretty_assertions::assert_eq;

    fn sample() -> (Graph, NodeId, NodeId, EdgeId) {
        let mut g = Graph::new();
        g.nodes_mut("person").create_index("name");
        let a = g.create_node("person", props([("name", "Ada")])).unwrap();
        let b = g.create_node("person", props([("name", "Grace")])).unwrap();
        let e = g.connect("knows", props([("since", 1843)]), a, b, true).unwrap();
        g.edge_mut(e).unwrap().set_distance(2.5);
        (g, a, b, e)
    }

    #[test]
    fn test_export_shape() {
        let (g, ..) = sample();
        let json: serde_json::Value = serde_json::from_str(&g.to_json().unwrap()).unwrap();

        assert_eq!(json["nc"], serde_json::json!([["person", ["name"]]]));
        assert_eq!(json["ec"], serde_json::json!([["knows", []]]));
        assert_eq!(json["n"][0][0], "person");
        assert_eq!(json["n"][0][1], serde_json::json!({"name": "Ada"}));
        assert_eq!(json["n"][0][2], format!("{DEFAULT_ID_SEED:x}"));

        let edge = &json["e"][0];
        assert_eq!(edge[3], json["n"][0][2]);
        assert_eq!(edge[4], json["n"][1][2]);
        assert_eq!(edge[5], 1);
        assert_eq!(edge[6], 2.5);
    }

    #[test]
    fn test_roundtrip_rebuilds_links_and_indices() {
        let (g, ..) = sample();
        let copy = Graph::from_json(&g.to_json().unwrap()).unwrap();

        assert_eq!(copy.export(), g.export());
        let people = copy.nodes("person").unwrap();
        let grace = people.find("name", "Grace").unwrap();
        let edge = copy.node(grace).unwrap().edges()[0];
        assert!(copy.edge(edge).unwrap().is_duplex());
        assert_eq!(copy.edge(edge).unwrap().distance(), 2.5);
        assert_eq!(copy.next_id_seed(), Some(DEFAULT_ID_SEED - 3));
    }

    #[test]
    fn test_infinite_distance_as_null() {
        let (mut g, _, _, e) = sample();
        g.edge_mut(e).unwrap().set_weight(0);
        let json = g.to_json().unwrap();
        assert!(json.contains("null]"));

        let copy = Graph::from_json(&json).unwrap();
        assert!(copy.all_edges()[0].distance().is_infinite());
    }

    #[test]
    fn test_id_seed_after_import() {
        let (g, ..) = sample();
        let data = g.export();

        let mut low = Graph::with_config(crate::GraphConfig { id_seed: 10 });
        low.import(&data).unwrap();
        assert_eq!(low.next_id_seed(), Some(9));

        let fresh = low.create_node("person", PropertyMap::new()).unwrap();
        assert_eq!(low.node(fresh).unwrap().uid().counter(), Some(9));
    }

    #[test]
    fn test_import_of_uid_zero_exhausts_ids() {
        let (g, ..) = sample();
        let mut data = g.export();
        data.nodes[0].2 = UniqueId::from("0");
        data.edges[0].3 = Some(UniqueId::from("0"));

        let mut copy = Graph::from_export(&data).unwrap();
        assert_eq!(copy.next_id_seed(), None);
        assert!(matches!(copy.create_node("person", PropertyMap::new()), Err(Error::IdsExhausted)));
        assert_eq!(copy.node_count(), 2);
    }

    #[test]
    fn test_import_normalizes_negative_distance() {
        let mut g = Graph::new();
        let a = g.create_node("city", props([("name", "A")])).unwrap();
        let b = g.create_node("city", props([("name", "B")])).unwrap();
        let c = g.create_node("city", props([("name", "C")])).unwrap();
        g.connect("road", PropertyMap::new(), a, b, false).unwrap();
        g.connect("road", PropertyMap::new(), a, c, false).unwrap();

        let mut data = g.export();
        data.edges[1].6 = -5.0;
        let copy = Graph::from_export(&data).unwrap();
        assert_eq!(copy.all_edges()[1].distance(), 5.0);

        let origin = copy.unit(data.nodes[0].2.as_str()).and_then(UnitRef::as_node).unwrap();
        let target = copy.unit(data.nodes[2].2.as_str()).and_then(UnitRef::as_node).unwrap();
        let ends: Vec<NodeId> = copy
            .closest(origin, &crate::SearchOptions::new())
            .iter()
            .filter_map(|p| p.end())
            .collect();
        assert_eq!(ends.len(), 3);
        assert_eq!(ends.last(), Some(&target));
    }

    #[test]
    fn test_import_json_replaces_contents() {
        let (g, ..) = sample();
        let json = g.to_json().unwrap();

        let mut target = Graph::new();
        target.create_node("robot", props([("name", "R2")])).unwrap();
        target.import_json(&json).unwrap();

        assert!(target.nodes("robot").is_none());
        assert_eq!(target.node_count(), 2);
        let grace = target.nodes("person").unwrap().find("name", "Grace");
        assert!(grace.is_some());
        assert_eq!(target.export(), g.export());

        assert!(matches!(target.import_json(r#"{"nc":"#), Err(Error::Serialization(_))));
        assert_eq!(target.node_count(), 2);
    }

    #[test]
    fn test_import_is_atomic() {
        let (mut g, ..) = sample();
        let mut bad = g.export();
        bad.edges[0].4 = Some(UniqueId::from("abc"));

        let err = g.import(&bad).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.nodes("person").unwrap().find("name", "Ada").is_some());
    }

    #[test]
    fn test_import_rejects_bad_ids() {
        let (g, ..) = sample();

        let mut data = g.export();
        data.nodes[1].2 = UniqueId::from("not-hex");
        assert!(matches!(Graph::from_export(&data), Err(Error::InvalidId(id)) if id == "not-hex"));

        let mut data = g.export();
        data.nodes[1].2 = data.nodes[0].2.clone();
        assert!(matches!(Graph::from_export(&data), Err(Error::DuplicateId(_))));

        let mut data = g.export();
        data.edges[0].3 = None;
        assert!(matches!(Graph::from_export(&data), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_reader_writer() {
        let (g, ..) = sample();
        let mut buf = Vec::new();
        write_json(&g, &mut buf).unwrap();
        let copy = read_json(buf.as_slice()).unwrap();
        assert_eq!(copy.node_count(), 2);
        assert_eq!(copy.edge_count(), 1);

        assert!(matches!(read_json(&b"{"[..]), Err(Error::Serialization(_))));
    }
}
