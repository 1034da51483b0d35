use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Preset layout coordinates of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A publication in the citation network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Publication number (e.g., "09-D-06")
    pub id: String,

    pub label: String,

    /// Sector name; absent for publications cited from outside the corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Document type (decision, opinion, interim measure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Publication date, ISO-8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Rendered diameter
    pub size: f64,

    #[serde(default)]
    pub position: Position,
}

impl NodeData {
    /// Whether the node carries corpus metadata beyond its label
    pub fn has_metadata(&self) -> bool {
        self.sector.is_some()
            || self.doc_type.is_some()
            || self.title.is_some()
            || self.date.is_some()
    }
}

/// A citation from `source` to `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,

    /// Number of times `source` quotes `target`
    #[serde(default)]
    pub citation_count: u32,
}

/// Node or edge of the citation network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphElement {
    Node(NodeData),
    Edge(EdgeData),
}

impl GraphElement {
    pub fn id(&self) -> &str {
        match self {
            Self::Node(node) => &node.id,
            Self::Edge(edge) => &edge.id,
        }
    }

    pub fn as_node(&self) -> Option<&NodeData> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeData> {
        match self {
            Self::Edge(edge) => Some(edge),
            Self::Node(_) => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Node(_) => "node",
            Self::Edge(_) => "edge",
        }
    }
}

/// Deduplicated union of shards over a year range
///
/// Elements keep first-occurrence order. Every edge endpoint is a node of the
/// same graph and ids are unique across nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct ComposedGraph {
    elements: Vec<GraphElement>,

    /// Element id -> position in `elements`
    by_id: HashMap<String, usize>,

    node_count: usize,
}

impl ComposedGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Union the given fragments in order, keeping the first occurrence of
    /// every id.
    pub fn merge<'a, I>(fragments: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [GraphElement]>,
    {
        let mut graph = Self::default();
        for fragment in fragments {
            graph.extend(fragment)?;
        }
        graph.validate_edges()?;
        Ok(graph)
    }

    /// Appends the ids of `fragment` not yet present. Edge endpoints are
    /// checked separately by `validate_edges` once every fragment is in.
    pub(crate) fn extend(&mut self, fragment: &[GraphElement]) -> Result<()> {
        for element in fragment {
            self.push_unique(element)?;
        }
        Ok(())
    }

    pub fn from_elements(elements: &[GraphElement]) -> Result<Self> {
        Self::merge(std::iter::once(elements))
    }

    fn push_unique(&mut self, element: &GraphElement) -> Result<()> {
        if let Some(&existing) = self.by_id.get(element.id()) {
            let kept = &self.elements[existing];
            if kept.kind_name() != element.kind_name() {
                return Err(GraphError::InvalidGraph(format!(
                    "id {} already names a {}, cannot reuse it for a {}",
                    element.id(),
                    kept.kind_name(),
                    element.kind_name()
                )));
            }
            return Ok(());
        }

        if matches!(element, GraphElement::Node(_)) {
            self.node_count += 1;
        }
        self.by_id
            .insert(element.id().to_string(), self.elements.len());
        self.elements.push(element.clone());
        Ok(())
    }

    pub(crate) fn validate_edges(&self) -> Result<()> {
        for edge in self.edges() {
            for endpoint in [&edge.source, &edge.target] {
                if self.node(endpoint).is_none() {
                    return Err(GraphError::InvalidGraph(format!(
                        "edge {} references missing node {endpoint}",
                        edge.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// All elements in composition order
    pub fn elements(&self) -> &[GraphElement] {
        &self.elements
    }

    pub fn get(&self, id: &str) -> Option<&GraphElement> {
        self.by_id.get(id).map(|&idx| &self.elements[idx])
    }

    pub fn node(&self, id: &str) -> Option<&NodeData> {
        self.get(id).and_then(GraphElement::as_node)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeData> {
        self.get(id).and_then(GraphElement::as_edge)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.elements.iter().filter_map(GraphElement::as_node)
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeData> {
        self.elements.iter().filter_map(GraphElement::as_edge)
    }

    /// Position of an element in composition order
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.elements.len() - self.node_count
    }

    /// Order-independent element-set equality
    pub fn same_elements(&self, other: &ComposedGraph) -> bool {
        self.len() == other.len()
            && self
                .elements
                .iter()
                .all(|element| other.get(element.id()) == Some(element))
    }

    /// True when every id of `other` is also present here
    pub fn is_superset_of(&self, other: &ComposedGraph) -> bool {
        other.by_id.keys().all(|id| self.by_id.contains_key(id))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{edge, node};
    use super::*;

    #[test]
    fn merge_keeps_first_occurrence() {
        let first = vec![node("a", Some("Santé")), node("b", None), edge("e1", "a", "b")];
        let mut shadow = node("b", Some("Sport"));
        if let GraphElement::Node(data) = &mut shadow {
            data.label = "shadow".to_string();
        }
        let second = vec![shadow, node("c", None), edge("e2", "c", "b")];

        let graph = ComposedGraph::merge([first.as_slice(), second.as_slice()]).unwrap();

        let ids: Vec<_> = graph.elements().iter().map(GraphElement::id).collect();
        assert_eq!(ids, vec!["a", "b", "e1", "c", "e2"]);
        assert_eq!(graph.node("b").unwrap().label, "b");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn merge_rejects_node_edge_id_collision() {
        let elements = vec![node("x", None), node("y", None), edge("x", "x", "y")];
        let err = ComposedGraph::from_elements(&elements).unwrap_err();
        assert!(matches!(err, GraphError::InvalidGraph(_)));
    }

    #[test]
    fn merge_rejects_dangling_edge() {
        let elements = vec![node("a", None), edge("e", "a", "ghost")];
        let err = ComposedGraph::from_elements(&elements).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn element_serialization_uses_kind_tag() {
        let json = serde_json::to_value(edge("e", "a", "b")).unwrap();
        assert_eq!(json["kind"], "edge");
        assert_eq!(json["citation_count"], 1);

        let parsed: GraphElement = serde_json::from_str(
            r#"{"kind":"node","id":"98-MC-01","label":"98-MC-01","size":12.5}"#,
        )
        .unwrap();
        let data = parsed.as_node().unwrap();
        assert!(!data.has_metadata());
        assert_eq!(data.position, Position::default());
    }
}
