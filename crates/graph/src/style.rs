use crate::filter::FilterState;
use crate::neighbors::NeighborIndex;
use crate::theme::StyleTheme;
use crate::types::{ComposedGraph, GraphElement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which elements a rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementPredicate {
    AllNodes,
    AllEdges,
    NodeId(String),
    EdgeId(String),
    /// Nodes whose sector starts with the token
    SectorPrefix(String),
    /// Nodes whose id starts with the token
    IdPrefix(String),
}

impl ElementPredicate {
    pub fn matches(&self, element: &GraphElement) -> bool {
        match (self, element) {
            (Self::AllNodes, GraphElement::Node(_)) => true,
            (Self::AllEdges, GraphElement::Edge(_)) => true,
            (Self::NodeId(id), GraphElement::Node(node)) => &node.id == id,
            (Self::EdgeId(id), GraphElement::Edge(edge)) => &edge.id == id,
            (Self::SectorPrefix(token), GraphElement::Node(node)) => node
                .sector
                .as_deref()
                .is_some_and(|sector| sector.starts_with(token.as_str())),
            (Self::IdPrefix(token), GraphElement::Node(node)) => {
                node.id.starts_with(token.as_str())
            }
            _ => false,
        }
    }
}

/// Selector syntax understood by the rendering surface
impl fmt::Display for ElementPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllNodes => write!(f, "node"),
            Self::AllEdges => write!(f, "edge"),
            Self::NodeId(id) => write!(f, "node[id = \"{}\"]", escape(id)),
            Self::EdgeId(id) => write!(f, "edge[id = \"{}\"]", escape(id)),
            Self::SectorPrefix(token) => write!(f, "node[sector ^= \"{}\"]", escape(token)),
            Self::IdPrefix(token) => write!(f, "node[id ^= \"{}\"]", escape(token)),
        }
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Style property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Why a rule was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleRole {
    Base,
    Sector,
    Search,
    Selection,
    Downstream,
    Upstream,
}

/// Selector plus property overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    pub role: RuleRole,
    pub selector: ElementPredicate,
    pub style: BTreeMap<String, StyleValue>,
}

impl StyleRule {
    fn new<const N: usize>(
        role: RuleRole,
        selector: ElementPredicate,
        props: [(&str, StyleValue); N],
    ) -> Self {
        Self {
            role,
            selector,
            style: props
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }

    /// Elements of `graph` this rule applies to; empty for selectors naming
    /// nothing in the graph.
    pub fn matching_elements<'g>(&self, graph: &'g ComposedGraph) -> Vec<&'g GraphElement> {
        graph
            .elements()
            .iter()
            .filter(|element| self.selector.matches(element))
            .collect()
    }
}

/// Derives the ordered stylesheet from the active filters
///
/// The surface applies rules in order, later ones overriding earlier ones:
/// base node, base edge, sector, search (only without a selection),
/// selection, then downstream neighbors followed by upstream neighbors.
#[derive(Debug, Clone, Default)]
pub struct StyleRuleEngine {
    theme: StyleTheme,
}

impl StyleRuleEngine {
    pub fn new(theme: StyleTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &StyleTheme {
        &self.theme
    }

    pub fn compute_rules(&self, state: &FilterState, index: &NeighborIndex) -> Vec<StyleRule> {
        let mut rules = self.base_rules();

        if let Some(sector) = state.sector() {
            rules.push(self.sector_rule(sector));
        }

        match state.selected_node() {
            Some(selected) => {
                rules.push(self.selection_rule(selected));
                self.push_neighbor_rules(selected, index, &mut rules);
            }
            None => {
                if let Some(search) = state.search() {
                    rules.push(self.search_rule(search));
                }
            }
        }

        rules
    }

    pub fn base_rules(&self) -> Vec<StyleRule> {
        let t = &self.theme;
        vec![
            StyleRule::new(
                RuleRole::Base,
                ElementPredicate::AllNodes,
                [
                    ("opacity", t.node_opacity.into()),
                    ("label", "data(label)".into()),
                    ("width", "data(size)".into()),
                    ("height", "data(size)".into()),
                    ("background-color", t.node_color.clone().into()),
                    ("color", t.node_label_color.clone().into()),
                ],
            ),
            StyleRule::new(
                RuleRole::Base,
                ElementPredicate::AllEdges,
                [
                    ("target-arrow-color", t.edge_color.clone().into()),
                    ("target-arrow-shape", "triangle".into()),
                    ("line-color", t.edge_color.clone().into()),
                    ("background-color", t.node_color.clone().into()),
                    ("arrow-scale", t.arrow_scale.into()),
                    ("curve-style", "bezier".into()),
                ],
            ),
        ]
    }

    fn sector_rule(&self, sector: &str) -> StyleRule {
        StyleRule::new(
            RuleRole::Sector,
            ElementPredicate::SectorPrefix(sector.to_string()),
            [("background-color", self.theme.highlight_color.clone().into())],
        )
    }

    fn search_rule(&self, search: &str) -> StyleRule {
        let t = &self.theme;
        let mut rule = self.emphasis(
            RuleRole::Search,
            ElementPredicate::IdPrefix(search.to_string()),
        );
        rule.style
            .insert("width".to_string(), t.search_match_size.clone().into());
        rule.style
            .insert("height".to_string(), t.search_match_size.clone().into());
        rule
    }

    fn selection_rule(&self, node_id: &str) -> StyleRule {
        self.emphasis(RuleRole::Selection, ElementPredicate::NodeId(node_id.to_string()))
    }

    fn emphasis(&self, role: RuleRole, selector: ElementPredicate) -> StyleRule {
        let t = &self.theme;
        StyleRule::new(
            role,
            selector,
            [
                ("background-color", t.highlight_color.clone().into()),
                ("border-color", t.highlight_color.clone().into()),
                ("border-width", t.highlight_border_width.into()),
                ("border-opacity", StyleValue::Number(1.0)),
                ("opacity", StyleValue::Number(1.0)),
                ("label", "data(label)".into()),
                ("color", t.highlight_color.clone().into()),
                ("text-opacity", StyleValue::Number(1.0)),
                ("font-size", t.highlight_font_size.into()),
            ],
        )
    }

    fn push_neighbor_rules(
        &self,
        selected: &str,
        index: &NeighborIndex,
        rules: &mut Vec<StyleRule>,
    ) {
        let t = &self.theme;

        for edge in index.outgoing(selected) {
            rules.push(StyleRule::new(
                RuleRole::Downstream,
                ElementPredicate::NodeId(edge.target.clone()),
                [
                    ("background-color", t.downstream_color.clone().into()),
                    ("opacity", t.downstream_opacity.into()),
                ],
            ));
            rules.push(self.neighbor_edge_rule(
                RuleRole::Downstream,
                &edge.id,
                &t.downstream_color,
                t.downstream_opacity,
            ));
        }

        for edge in index.incoming(selected) {
            rules.push(StyleRule::new(
                RuleRole::Upstream,
                ElementPredicate::NodeId(edge.source.clone()),
                [
                    ("background-color", t.upstream_color.clone().into()),
                    ("opacity", t.upstream_node_opacity.into()),
                ],
            ));
            rules.push(self.neighbor_edge_rule(
                RuleRole::Upstream,
                &edge.id,
                &t.upstream_color,
                t.upstream_edge_opacity,
            ));
        }
    }

    fn neighbor_edge_rule(
        &self,
        role: RuleRole,
        edge_id: &str,
        color: &str,
        opacity: f64,
    ) -> StyleRule {
        StyleRule::new(
            role,
            ElementPredicate::EdgeId(edge_id.to_string()),
            [
                ("mid-target-arrow-color", color.into()),
                ("mid-target-arrow-shape", "vee".into()),
                ("line-color", color.into()),
                ("opacity", opacity.into()),
            ],
        )
    }
}
