use crate::composer::RangeComposer;
use crate::details::{DetailsConfig, ElementDetails};
use crate::error::{GraphError, Result};
use crate::filter::FilterState;
use crate::neighbors::NeighborIndex;
use crate::style::{StyleRule, StyleRuleEngine};
use crate::types::ComposedGraph;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Discrete input from the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    SetRange { lo: i32, hi: i32 },
    TapNode { id: String },
    ClearSelection,
    SetSector { sector: Option<String> },
    SetSearch { search: Option<String> },
}

/// What the rendering surface draws
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub range: (i32, i32),
    pub graph: Arc<ComposedGraph>,
    pub stylesheet: Vec<StyleRule>,
}

/// One user's view of the network
///
/// Events are applied one at a time. A range change builds the new graph and
/// its index before anything is swapped, so a failed composition leaves the
/// previous frame untouched.
pub struct ExplorerSession {
    composer: Arc<RangeComposer>,
    engine: StyleRuleEngine,
    details: DetailsConfig,
    range: (i32, i32),
    index: NeighborIndex,
    filters: FilterState,
    stylesheet: Vec<StyleRule>,
}

impl ExplorerSession {
    /// Session showing the whole domain with no filter active
    pub fn open(
        composer: Arc<RangeComposer>,
        engine: StyleRuleEngine,
        details: DetailsConfig,
    ) -> Result<Self> {
        let domain = composer.domain();
        Self::open_at(composer, engine, details, (domain.min(), domain.max()))
    }

    /// Session showing `range` with no filter active
    pub fn open_at(
        composer: Arc<RangeComposer>,
        engine: StyleRuleEngine,
        details: DetailsConfig,
        range: (i32, i32),
    ) -> Result<Self> {
        let graph = composer.compose(range.0, range.1)?;
        let index = NeighborIndex::build(graph);
        let filters = FilterState::new();
        let stylesheet = engine.compute_rules(&filters, &index);
        Ok(Self {
            composer,
            engine,
            details,
            range,
            index,
            filters,
            stylesheet,
        })
    }

    pub fn apply(&mut self, event: UiEvent) -> Result<RenderFrame> {
        log::debug!("Applying {event:?}");
        match event {
            UiEvent::SetRange { lo, hi } => self.set_range(lo, hi)?,
            UiEvent::TapNode { id } => self.filters.tap_node(&id),
            UiEvent::ClearSelection => self.filters.clear_selection(),
            UiEvent::SetSector { sector } => self.filters.set_sector(sector.as_deref()),
            UiEvent::SetSearch { search } => self.filters.set_search(search.as_deref()),
        }
        self.stylesheet = self.engine.compute_rules(&self.filters, &self.index);
        Ok(self.frame())
    }

    fn set_range(&mut self, lo: i32, hi: i32) -> Result<()> {
        if (lo, hi) == self.range {
            return Ok(());
        }
        let graph = self.composer.compose(lo, hi)?;
        self.index = NeighborIndex::build(graph);
        self.range = (lo, hi);
        Ok(())
    }

    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            range: self.range,
            graph: Arc::clone(self.index.graph()),
            stylesheet: self.stylesheet.clone(),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn range(&self) -> (i32, i32) {
        self.range
    }

    pub fn graph(&self) -> &ComposedGraph {
        self.index.graph()
    }

    pub fn neighbors(&self) -> &NeighborIndex {
        &self.index
    }

    /// Info panel content for an element of the current graph
    pub fn details(&self, id: &str) -> Result<ElementDetails> {
        self.graph()
            .get(id)
            .map(|element| ElementDetails::for_element(element, &self.details))
            .ok_or_else(|| GraphError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_shard;
    use crate::shard_store::{MemoryShardSource, ShardKey, ShardStore, YearDomain};
    use crate::style::RuleRole;
    use crate::types::fixtures::{edge, node};

    fn session(with_2011: bool) -> ExplorerSession {
        let mut source = MemoryShardSource::new()
            .with_blob(
                ShardKey::Year(2009),
                encode_shard(&[node("a", Some("Santé"))]).unwrap(),
            )
            .with_blob(
                ShardKey::Year(2010),
                encode_shard(&[
                    node("b", Some("Sport")),
                    node("a", Some("Santé")),
                    edge("b->a", "b", "a"),
                ])
                .unwrap(),
            );
        let full = if with_2011 {
            source.insert(
                ShardKey::Year(2011),
                encode_shard(&[node("c", None)]).unwrap(),
            );
            vec![
                node("a", Some("Santé")),
                node("b", Some("Sport")),
                edge("b->a", "b", "a"),
                node("c", None),
            ]
        } else {
            vec![node("a", Some("Santé")), node("b", Some("Sport")), edge("b->a", "b", "a")]
        };
        source.insert(ShardKey::Full, encode_shard(&full).unwrap());

        let store = ShardStore::new(source, YearDomain::new(2009, 2011).unwrap());
        let composer = Arc::new(RangeComposer::new(Arc::new(store)));
        ExplorerSession::open(composer, StyleRuleEngine::default(), DetailsConfig::default())
            .expect("open session")
    }

    #[test]
    fn opens_on_full_domain_with_base_rules() {
        let session = session(true);
        let frame = session.frame();
        assert_eq!(frame.range, (2009, 2011));
        assert_eq!(frame.graph.len(), 4);
        assert_eq!(frame.stylesheet.len(), 2);
    }

    #[test]
    fn tap_recomputes_rules_without_recomposing() {
        let mut session = session(true);
        let before = Arc::clone(&session.frame().graph);

        let frame = session
            .apply(UiEvent::TapNode { id: "a".to_string() })
            .unwrap();
        assert!(Arc::ptr_eq(&before, &frame.graph));
        let roles: Vec<_> = frame.stylesheet.iter().map(|r| r.role).collect();
        assert_eq!(
            roles,
            vec![
                RuleRole::Base,
                RuleRole::Base,
                RuleRole::Selection,
                RuleRole::Upstream,
                RuleRole::Upstream,
            ]
        );

        let frame = session
            .apply(UiEvent::TapNode { id: "a".to_string() })
            .unwrap();
        assert_eq!(frame.stylesheet.len(), 2);
    }

    #[test]
    fn range_change_rebuilds_neighbors() {
        let mut session = session(true);
        session
            .apply(UiEvent::TapNode { id: "a".to_string() })
            .unwrap();

        let frame = session
            .apply(UiEvent::SetRange { lo: 2009, hi: 2009 })
            .unwrap();
        assert_eq!(frame.graph.len(), 1);
        // Selection survives the range change but has no neighbors left.
        assert_eq!(frame.stylesheet.len(), 3);
        assert_eq!(session.filters().selected_node(), Some("a"));
    }

    #[test]
    fn failed_range_change_keeps_previous_frame() {
        let mut session = session(false);
        session
            .apply(UiEvent::SetRange { lo: 2009, hi: 2010 })
            .unwrap();

        let err = session
            .apply(UiEvent::SetRange { lo: 2010, hi: 2011 })
            .unwrap_err();
        assert!(matches!(err, GraphError::CompositionFailed { year: 2011, .. }));
        assert_eq!(session.range(), (2009, 2010));
        assert_eq!(session.graph().len(), 3);
    }

    #[test]
    fn details_for_current_graph_only() {
        let mut session = session(true);
        assert!(matches!(
            session.details("b->a").unwrap(),
            ElementDetails::Connection { .. }
        ));
        session
            .apply(UiEvent::SetRange { lo: 2009, hi: 2009 })
            .unwrap();
        assert!(matches!(
            session.details("b->a"),
            Err(GraphError::NotFound(_))
        ));
    }
}
