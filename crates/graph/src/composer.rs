use crate::error::{GraphError, Result};
use crate::shard_store::{ShardStore, YearDomain};
use crate::types::{ComposedGraph, GraphElement};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Builds the visible graph for a year range out of cached shards
pub struct RangeComposer {
    store: Arc<ShardStore>,

    /// Whole-domain composition, built at most once
    full: OnceCell<Arc<ComposedGraph>>,
}

impl RangeComposer {
    pub fn new(store: Arc<ShardStore>) -> Self {
        Self {
            store,
            full: OnceCell::new(),
        }
    }

    pub fn domain(&self) -> YearDomain {
        self.store.domain()
    }

    pub fn store(&self) -> &ShardStore {
        &self.store
    }

    /// Deduplicated union of the shards for every year in `lo..=hi`.
    ///
    /// First occurrence of an id wins. Nothing is returned unless every shard
    /// in range loaded.
    pub fn compose(&self, lo: i32, hi: i32) -> Result<Arc<ComposedGraph>> {
        if lo > hi {
            return Err(GraphError::InvalidRange { lo, hi });
        }
        // An out-of-domain bound is reported as is, not as a failed composition.
        self.store.check_year(lo)?;
        self.store.check_year(hi)?;

        // A one-year range is always its own shard, even when the domain is
        // that single year.
        let graph = if lo == hi {
            debug!("Composing single year {lo}");
            let shard = self.load_year(lo)?;
            Arc::new(ComposedGraph::from_elements(&shard).map_err(|err| wrap(lo, err))?)
        } else if self.domain().is_full(lo, hi) {
            self.compose_full()?
        } else {
            Arc::new(self.union(lo, hi)?)
        };

        info!(
            "Composed {lo}..={hi}: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn compose_full(&self) -> Result<Arc<ComposedGraph>> {
        self.full
            .get_or_try_init(|| {
                let domain = self.domain();
                match self.store.load_full() {
                    Ok(elements) => {
                        debug!("Using whole-domain shard");
                        ComposedGraph::from_elements(&elements)
                            .map(Arc::new)
                            .map_err(|err| wrap(domain.min(), err))
                    }
                    Err(err) if err.is_unavailable() => {
                        warn!("Whole-domain shard missing ({err}), unioning years instead");
                        self.union(domain.min(), domain.max()).map(Arc::new)
                    }
                    Err(err) => Err(wrap(domain.min(), err)),
                }
            })
            .cloned()
    }

    /// Id clashes are attributed to the year whose shard introduced them. A
    /// dangling edge spans the whole range and is reported as `InvalidGraph`.
    fn union(&self, lo: i32, hi: i32) -> Result<ComposedGraph> {
        let shards = (lo..=hi)
            .map(|year| self.load_year(year).map(|shard| (year, shard)))
            .collect::<Result<Vec<_>>>()?;

        let mut graph = ComposedGraph::empty();
        for (year, shard) in &shards {
            graph.extend(shard).map_err(|err| wrap(*year, err))?;
        }
        graph.validate_edges()?;
        Ok(graph)
    }

    fn load_year(&self, year: i32) -> Result<Arc<[GraphElement]>> {
        self.store.load(year).map_err(|err| wrap(year, err))
    }
}

fn wrap(year: i32, err: GraphError) -> GraphError {
    GraphError::CompositionFailed {
        year,
        source: Box::new(err),
    }
}
