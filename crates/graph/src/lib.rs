//! # Citation Network Graph
//!
//! Composition and highlight styling for a year-sharded citation network of
//! regulatory publications.
//!
//! ## Features
//!
//! - **Shard store** - decode and cache one compressed fragment per year
//! - **Range composition** - deduplicated union of shards over a year range
//! - **Neighbor index** - citations made and received per publication
//! - **Style rules** - ordered highlight overlays for sector, search and selection
//!
//! ## Architecture
//!
//! ```text
//! UI event
//!     │
//!     ├──> FilterState (selected node, sector, search)
//!     │
//!     ├──> RangeComposer (only when the year range changes)
//!     │      ├─ ShardStore::load(year) for each year, cached
//!     │      └─ first occurrence of each id wins
//!     │
//!     ├──> NeighborIndex (petgraph)
//!     │      └─ incoming / outgoing citations per node
//!     │
//!     └──> StyleRuleEngine
//!            └─ base, sector, search, selection, downstream, upstream
//! ```

mod codec;
mod composer;
mod config;
mod details;
mod error;
mod filter;
mod neighbors;
mod session;
mod shard_store;
mod style;
mod theme;
mod types;

pub use codec::{decode_shard, encode_shard, DEFAULT_MAX_DECOMPRESSED_BYTES, SHARD_MAGIC};
pub use composer::RangeComposer;
pub use config::{ExplorerConfig, ShardConfig};
pub use details::{DetailsConfig, ElementDetails};
pub use error::{GraphError, Result};
pub use filter::{FilterMode, FilterState};
pub use neighbors::NeighborIndex;
pub use session::{ExplorerSession, RenderFrame, UiEvent};
pub use shard_store::{
    shard_path, DirShardSource, MemoryShardSource, ShardKey, ShardSource, ShardStore, YearDomain,
};
pub use style::{ElementPredicate, RuleRole, StyleRule, StyleRuleEngine, StyleValue};
pub use theme::StyleTheme;
pub use types::{ComposedGraph, EdgeData, GraphElement, NodeData, Position};
