use crate::shard_store::ShardKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Shard {key} unavailable: {reason}")]
    ShardUnavailable { key: ShardKey, reason: String },

    #[error("Shard {key} could not be decoded: {reason}")]
    DecodeFailed { key: ShardKey, reason: String },

    #[error("Composition failed at year {year}: {source}")]
    CompositionFailed {
        year: i32,
        #[source]
        source: Box<GraphError>,
    },

    #[error("Shard encoding failed: {0}")]
    EncodeFailed(String),

    #[error("Invalid year range: {lo}..={hi}")]
    InvalidRange { lo: i32, hi: i32 },

    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Element not found: {0}")]
    NotFound(String),
}

impl GraphError {
    pub(crate) fn unavailable(key: ShardKey, reason: impl Into<String>) -> Self {
        Self::ShardUnavailable {
            key,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(key: ShardKey, reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            key,
            reason: reason.into(),
        }
    }

    /// True for failures caused by a missing or unreadable shard, including
    /// when wrapped by a failed composition.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::ShardUnavailable { .. } => true,
            Self::CompositionFailed { source, .. } => source.is_unavailable(),
            _ => false,
        }
    }
}
