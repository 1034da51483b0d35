use crate::codec::DEFAULT_MAX_DECOMPRESSED_BYTES;
use crate::details::DetailsConfig;
use crate::error::{GraphError, Result};
use crate::shard_store::{DirShardSource, ShardStore, YearDomain};
use crate::theme::StyleTheme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where shards live and which years they cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShardConfig {
    /// Directory holding `{stem}_{year}.dat` and `{stem}.dat`
    pub dir: PathBuf,
    pub stem: String,
    pub min_year: i32,
    pub max_year: i32,
    pub max_decompressed_bytes: usize,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static"),
            stem: "elements".to_string(),
            min_year: 2009,
            max_year: 2021,
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

impl ShardConfig {
    pub fn domain(&self) -> Result<YearDomain> {
        YearDomain::new(self.min_year, self.max_year)
    }

    pub fn source(&self) -> DirShardSource {
        DirShardSource::new(&self.dir, &self.stem)
    }

    pub fn open_store(&self) -> Result<ShardStore> {
        Ok(ShardStore::new(self.source(), self.domain()?)
            .with_max_decompressed_bytes(self.max_decompressed_bytes))
    }
}

/// Top-level configuration, every section optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerConfig {
    pub shards: ShardConfig,
    pub theme: StyleTheme,
    pub details: DetailsConfig,
}

impl ExplorerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| {
            GraphError::Config(format!("Failed to read config file {}: {err}", path.display()))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Accepts JSON or TOML.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self = match serde_json::from_slice(bytes) {
            Ok(config) => config,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes)
                    .map_err(|err| GraphError::Config(format!("{json_err}; {err}")))?;
                toml::from_str(utf8).map_err(|toml_err| {
                    GraphError::Config(format!(
                        "Config is not valid JSON or TOML ({json_err}); \
                         TOML parse error: {toml_err}"
                    ))
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.shards.domain()?;
        if self.shards.stem.trim().is_empty() {
            return Err(GraphError::Config("shards.stem must not be empty".to_string()));
        }
        if self.shards.max_decompressed_bytes == 0 {
            return Err(GraphError::Config(
                "shards.max_decompressed_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
