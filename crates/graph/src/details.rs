use crate::types::{EdgeData, GraphElement, NodeData};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const SOURCE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Settings for the element info panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsConfig {
    /// Link to the publication page; `{id}` is replaced by the publication id
    pub search_url_template: String,
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            search_url_template: concat!(
                "https://www.autoritedelaconcurrence.fr/fr/liste-des-decisions-et-avis",
                "?search_api_fulltext={id}&sort_by=search_api_relevance"
            )
            .to_string(),
        }
    }
}

/// What the info panel shows for a tapped element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementDetails {
    Publication {
        id: String,
        /// "{id} : {Doc type} {title}"
        heading: String,
        sector: Option<String>,
        date: Option<String>,
        link: String,
    },
    /// Cited publication outside the corpus
    NotAvailable { id: String },
    Connection {
        source: String,
        target: String,
        citation_count: u32,
    },
}

impl ElementDetails {
    pub fn for_element(element: &GraphElement, config: &DetailsConfig) -> Self {
        match element {
            GraphElement::Node(node) => Self::for_node(node, config),
            GraphElement::Edge(edge) => Self::for_edge(edge),
        }
    }

    pub fn for_node(node: &NodeData, config: &DetailsConfig) -> Self {
        if !node.has_metadata() {
            return Self::NotAvailable {
                id: node.id.clone(),
            };
        }

        let mut heading = format!("{} :", node.id);
        for part in [
            node.doc_type.as_deref().map(title_case),
            node.title.clone(),
        ]
        .into_iter()
        .flatten()
        {
            heading.push(' ');
            heading.push_str(&part);
        }

        Self::Publication {
            id: node.id.clone(),
            heading,
            sector: node.sector.as_deref().map(title_case),
            date: node.date.as_deref().map(display_date),
            link: config.search_url_template.replace("{id}", &node.id),
        }
    }

    pub fn for_edge(edge: &EdgeData) -> Self {
        Self::Connection {
            source: edge.source.clone(),
            target: edge.target.clone(),
            citation_count: edge.citation_count,
        }
    }
}

/// `dd/mm/yyyy`, or the raw value when it is not in the shard date format.
fn display_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, SOURCE_DATE_FORMAT)
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Uppercase the first letter of every word, lowercase the rest.
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
