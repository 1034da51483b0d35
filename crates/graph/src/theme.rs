use serde::{Deserialize, Serialize};

/// Colors and sizes used by the generated stylesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTheme {
    pub node_color: String,
    pub node_label_color: String,
    pub node_opacity: f64,

    pub edge_color: String,
    pub arrow_scale: f64,

    /// Selected node, search matches and sector matches
    pub highlight_color: String,
    pub highlight_border_width: f64,
    pub highlight_font_size: f64,

    /// Diameter forced onto search matches
    pub search_match_size: String,

    /// Publications cited by the selection
    pub downstream_color: String,
    pub downstream_opacity: f64,

    /// Publications citing the selection
    pub upstream_color: String,
    pub upstream_node_opacity: f64,
    pub upstream_edge_opacity: f64,
}

impl Default for StyleTheme {
    fn default() -> Self {
        Self {
            node_color: "#07ABA0".to_string(),
            node_label_color: "#008B80".to_string(),
            node_opacity: 0.9,
            edge_color: "#C5D3E2".to_string(),
            arrow_scale: 2.0,
            highlight_color: "#920000".to_string(),
            highlight_border_width: 2.0,
            highlight_font_size: 12.0,
            search_match_size: "200px".to_string(),
            downstream_color: "#ffdf4d".to_string(),
            downstream_opacity: 0.9,
            upstream_color: "#b66dff".to_string(),
            upstream_node_opacity: 0.9,
            upstream_edge_opacity: 1.0,
        }
    }
}
