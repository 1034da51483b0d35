use serde::{Deserialize, Serialize};

/// Active highlight inputs
///
/// Selection, sector and search are independent; each UI event changes one
/// of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    selected_node: Option<String>,

    #[serde(default)]
    sector: Option<String>,

    #[serde(default)]
    search: Option<String>,
}

/// Which highlight inputs are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    Reset,
    NodeOnly,
    NodeAndSector,
    SectorOnly,
    SearchOnly,
    /// Any other combination (search with a sector or a selection)
    Combined,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Select `node_id`, or clear the selection when it is already selected.
    /// A blank id leaves the state unchanged.
    pub fn tap_node(&mut self, node_id: &str) {
        if node_id.trim().is_empty() {
            return;
        }
        if self.selected_node.as_deref() == Some(node_id) {
            self.selected_node = None;
        } else {
            self.selected_node = Some(node_id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_node = None;
    }

    pub fn set_sector(&mut self, sector: Option<&str>) {
        self.sector = normalize_token(sector);
    }

    pub fn set_search(&mut self, search: Option<&str>) {
        self.search = normalize_token(search);
    }

    pub fn with_selected_node(mut self, node_id: &str) -> Self {
        self.selected_node = Some(node_id)
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_sector(mut self, sector: &str) -> Self {
        self.set_sector(Some(sector));
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.set_search(Some(search));
        self
    }

    pub fn is_reset(&self) -> bool {
        self.mode() == FilterMode::Reset
    }

    pub fn mode(&self) -> FilterMode {
        match (
            self.selected_node.is_some(),
            self.sector.is_some(),
            self.search.is_some(),
        ) {
            (false, false, false) => FilterMode::Reset,
            (true, false, false) => FilterMode::NodeOnly,
            (true, true, false) => FilterMode::NodeAndSector,
            (false, true, false) => FilterMode::SectorOnly,
            (false, false, true) => FilterMode::SearchOnly,
            _ => FilterMode::Combined,
        }
    }
}

/// Blank dropdown/text values mean "no filter".
fn normalize_token(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
