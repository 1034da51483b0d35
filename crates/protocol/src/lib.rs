use anyhow::Result;
use citenet_graph::{GraphElement, GraphError, RenderFrame, StyleRule, StyleValue};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub struct YearRange {
    pub lo: i32,
    pub hi: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElementGroup {
    Nodes,
    Edges,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, JsonSchema)]
pub struct PositionPayload {
    pub x: f64,
    pub y: f64,
}

/// Element in the shape the graph widget consumes: attributes under `data`,
/// preset coordinates under `position`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ElementPayload {
    pub group: ElementGroup,
    pub data: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionPayload>,
}

impl From<&GraphElement> for ElementPayload {
    fn from(element: &GraphElement) -> Self {
        let mut data = BTreeMap::new();
        match element {
            GraphElement::Node(node) => {
                data.insert("id".to_string(), node.id.clone().into());
                data.insert("label".to_string(), node.label.clone().into());
                data.insert("size".to_string(), node.size.into());
                let optional = [
                    ("sector", &node.sector),
                    ("doc_type", &node.doc_type),
                    ("title", &node.title),
                    ("date", &node.date),
                ];
                for (key, value) in optional {
                    if let Some(value) = value {
                        data.insert(key.to_string(), value.clone().into());
                    }
                }
                Self {
                    group: ElementGroup::Nodes,
                    data,
                    position: Some(PositionPayload {
                        x: node.position.x,
                        y: node.position.y,
                    }),
                }
            }
            GraphElement::Edge(edge) => {
                data.insert("id".to_string(), edge.id.clone().into());
                data.insert("source".to_string(), edge.source.clone().into());
                data.insert("target".to_string(), edge.target.clone().into());
                data.insert("citation_count".to_string(), edge.citation_count.into());
                Self {
                    group: ElementGroup::Edges,
                    data,
                    position: None,
                }
            }
        }
    }
}

/// One stylesheet entry with its selector rendered to text
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct StylesheetEntry {
    pub selector: String,
    pub style: BTreeMap<String, serde_json::Value>,
}

impl From<&StyleRule> for StylesheetEntry {
    fn from(rule: &StyleRule) -> Self {
        let style = rule
            .style
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    StyleValue::Number(number) => serde_json::Value::from(*number),
                    StyleValue::Text(text) => serde_json::Value::from(text.clone()),
                };
                (key.clone(), value)
            })
            .collect();
        Self {
            selector: rule.selector.to_string(),
            style,
        }
    }
}

/// Everything the rendering surface reads on a recompute cycle
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RenderPayload {
    pub schema_version: u32,
    pub range: YearRange,
    pub elements: Vec<ElementPayload>,
    pub stylesheet: Vec<StylesheetEntry>,
}

impl From<&RenderFrame> for RenderPayload {
    fn from(frame: &RenderFrame) -> Self {
        Self {
            schema_version: PAYLOAD_SCHEMA_VERSION,
            range: YearRange {
                lo: frame.range.0,
                hi: frame.range.1,
            },
            elements: frame.graph.elements().iter().map(ElementPayload::from).collect(),
            stylesheet: frame.stylesheet.iter().map(StylesheetEntry::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn from_graph_error(err: &GraphError) -> Self {
        let (code, hint) = match err {
            GraphError::ShardUnavailable { .. } => (
                "shard_unavailable",
                Some("Check the shard directory and the configured year domain"),
            ),
            GraphError::DecodeFailed { .. } => (
                "decode_failed",
                Some("Re-pack the shard with `citenet pack`"),
            ),
            GraphError::CompositionFailed { .. } => ("composition_failed", None),
            GraphError::EncodeFailed(_) => ("encode_failed", None),
            GraphError::InvalidRange { .. } => (
                "invalid_range",
                Some("The first year must not be after the last year"),
            ),
            GraphError::InvalidGraph(_) => ("invalid_graph", None),
            GraphError::Config(_) => ("config", None),
            GraphError::NotFound(_) => (
                "not_found",
                Some("The element may be outside the selected year range"),
            ),
        };
        Self {
            code: code.to_string(),
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }

    /// Envelope for any error, using the graph error code when one is in the chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        match err.chain().find_map(|cause| cause.downcast_ref::<GraphError>()) {
            Some(graph_err) => Self {
                message: format!("{err:#}"),
                ..Self::from_graph_error(graph_err)
            },
            None => Self {
                code: "internal".to_string(),
                message: format!("{err:#}"),
                hint: None,
            },
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// JSON Schema of [`RenderPayload`] for consumers of `citenet render`
pub fn render_payload_schema() -> Result<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(RenderPayload)).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citenet_graph::{
        ComposedGraph, EdgeData, FilterState, NeighborIndex, NodeData, Position, StyleRuleEngine,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn frame() -> RenderFrame {
        let elements = vec![
            GraphElement::Node(NodeData {
                id: "09-D-06".to_string(),
                label: "09-D-06".to_string(),
                sector: Some("Banque".to_string()),
                doc_type: None,
                title: None,
                date: None,
                size: 25.0,
                position: Position { x: 3.0, y: 4.0 },
            }),
            GraphElement::Node(NodeData {
                id: "05-D-75".to_string(),
                label: "05-D-75".to_string(),
                sector: None,
                doc_type: None,
                title: None,
                date: None,
                size: 10.0,
                position: Position::default(),
            }),
            GraphElement::Edge(EdgeData {
                id: "09-D-06_05-D-75".to_string(),
                source: "09-D-06".to_string(),
                target: "05-D-75".to_string(),
                citation_count: 3,
            }),
        ];
        let graph = Arc::new(ComposedGraph::from_elements(&elements).unwrap());
        let index = NeighborIndex::build(Arc::clone(&graph));
        let stylesheet = StyleRuleEngine::default()
            .compute_rules(&FilterState::new().with_selected_node("09-D-06"), &index);
        RenderFrame {
            range: (2009, 2009),
            graph,
            stylesheet,
        }
    }

    #[test]
    fn payload_uses_widget_element_shape() {
        let payload = RenderPayload::from(&frame());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["elements"][0]["group"], "nodes");
        assert_eq!(json["elements"][0]["data"]["sector"], "Banque");
        assert_eq!(json["elements"][0]["position"]["x"], 3.0);
        assert!(json["elements"][1]["data"].get("sector").is_none());
        assert_eq!(json["elements"][2]["data"]["citation_count"], 3);
        assert!(json["elements"][2].get("position").is_none());
    }

    #[test]
    fn stylesheet_selectors_are_rendered() {
        let payload = RenderPayload::from(&frame());
        let selectors: Vec<_> = payload
            .stylesheet
            .iter()
            .map(|entry| entry.selector.as_str())
            .collect();
        assert_eq!(
            selectors,
            vec![
                "node",
                "edge",
                "node[id = \"09-D-06\"]",
                "node[id = \"05-D-75\"]",
                "edge[id = \"09-D-06_05-D-75\"]",
            ]
        );
        assert_eq!(payload.stylesheet[1].style["arrow-scale"], 2.0);
        assert_eq!(payload.stylesheet[0].style["label"], "data(label)");
    }

    #[test]
    fn payload_schema_names_top_level_fields() {
        let schema = render_payload_schema().unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["schema_version", "range", "elements", "stylesheet"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
    }

    #[test]
    fn error_envelope_codes() {
        let err = GraphError::InvalidRange { lo: 2012, hi: 2010 };
        let envelope = ErrorEnvelope::from_graph_error(&err);
        assert_eq!(envelope.code, "invalid_range");

        let wrapped = anyhow::Error::new(GraphError::NotFound("x".to_string())).context("details");
        let envelope = ErrorEnvelope::from_anyhow(&wrapped);
        assert_eq!(envelope.code, "not_found");
        assert!(envelope.message.starts_with("details"));

        assert_eq!(
            ErrorEnvelope::from_anyhow(&anyhow::anyhow!("boom")).code,
            "internal"
        );
    }
}
