use crate::codec::{decode_shard, DEFAULT_MAX_DECOMPRESSED_BYTES};
use crate::error::{GraphError, Result};
use crate::types::GraphElement;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Identifies one stored fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShardKey {
    /// Elements attributable to publications of one year
    Year(i32),

    /// Pre-unioned whole domain
    Full,
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "year {year}"),
            Self::Full => write!(f, "full domain"),
        }
    }
}

/// Inclusive range of years for which shards are published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearDomain {
    min: i32,
    max: i32,
}

impl YearDomain {
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(GraphError::Config(format!(
                "year domain is empty: {min} > {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    pub fn is_full(&self, lo: i32, hi: i32) -> bool {
        lo == self.min && hi == self.max
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

/// Where shard blobs come from
pub trait ShardSource: Send + Sync {
    /// Raw blob for `key`; `ShardUnavailable` when it cannot be located or read.
    fn fetch(&self, key: ShardKey) -> Result<Vec<u8>>;
}

/// Blobs stored as `{stem}_{year}.dat` and `{stem}.dat` in one directory
#[derive(Debug, Clone)]
pub struct DirShardSource {
    dir: PathBuf,
    stem: String,
}

impl DirShardSource {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: ShardKey) -> PathBuf {
        shard_path(&self.dir, &self.stem, key)
    }
}

/// File location of a shard inside a shard directory.
pub fn shard_path(dir: &Path, stem: &str, key: ShardKey) -> PathBuf {
    match key {
        ShardKey::Year(year) => dir.join(format!("{stem}_{year}.dat")),
        ShardKey::Full => dir.join(format!("{stem}.dat")),
    }
}

impl ShardSource for DirShardSource {
    fn fetch(&self, key: ShardKey) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        std::fs::read(&path).map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::NotFound => format!("{} not found", path.display()),
                _ => format!("failed to read {}: {err}", path.display()),
            };
            GraphError::unavailable(key, reason)
        })
    }
}

/// In-memory blobs, keyed like the files of a shard directory
#[derive(Debug, Clone, Default)]
pub struct MemoryShardSource {
    blobs: HashMap<ShardKey, Vec<u8>>,
}

impl MemoryShardSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ShardKey, blob: Vec<u8>) {
        self.blobs.insert(key, blob);
    }

    pub fn with_blob(mut self, key: ShardKey, blob: Vec<u8>) -> Self {
        self.insert(key, blob);
        self
    }
}

impl ShardSource for MemoryShardSource {
    fn fetch(&self, key: ShardKey) -> Result<Vec<u8>> {
        self.blobs
            .get(&key)
            .cloned()
            .ok_or_else(|| GraphError::unavailable(key, "no blob registered"))
    }
}

/// Decoded shards, cached for the life of the store
///
/// Published shards never change, so entries are filled on first miss and
/// never evicted. Concurrent readers share the same `Arc`; two threads
/// missing on the same key both decode and the first insert is kept.
pub struct ShardStore {
    source: Box<dyn ShardSource>,
    domain: YearDomain,
    max_decompressed_bytes: usize,
    cache: RwLock<HashMap<ShardKey, Arc<[GraphElement]>>>,
}

impl ShardStore {
    pub fn new(source: impl ShardSource + 'static, domain: YearDomain) -> Self {
        Self {
            source: Box::new(source),
            domain,
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_max_decompressed_bytes(mut self, max: usize) -> Self {
        self.max_decompressed_bytes = max;
        self
    }

    pub fn domain(&self) -> YearDomain {
        self.domain
    }

    /// Elements of the shard for `year`
    pub fn load(&self, year: i32) -> Result<Arc<[GraphElement]>> {
        self.check_year(year)?;
        self.load_key(ShardKey::Year(year))
    }

    /// `ShardUnavailable` for years no shard is published for
    pub fn check_year(&self, year: i32) -> Result<()> {
        if self.domain.contains(year) {
            return Ok(());
        }
        Err(GraphError::unavailable(
            ShardKey::Year(year),
            format!(
                "outside of the published years {}..={}",
                self.domain.min(),
                self.domain.max()
            ),
        ))
    }

    /// Elements of the pre-unioned whole-domain entry
    pub fn load_full(&self) -> Result<Arc<[GraphElement]>> {
        self.load_key(ShardKey::Full)
    }

    fn load_key(&self, key: ShardKey) -> Result<Arc<[GraphElement]>> {
        if let Some(hit) = self.cached(key) {
            debug!("Shard cache hit: {key}");
            return Ok(hit);
        }

        debug!("Shard cache miss: {key}");
        let blob = self.source.fetch(key)?;
        let elements: Arc<[GraphElement]> =
            decode_shard(key, &blob, self.max_decompressed_bytes)?.into();
        info!(
            "Loaded shard {key}: {} elements from {} bytes",
            elements.len(),
            blob.len()
        );

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(key).or_insert(elements)))
    }

    fn cached(&self, key: ShardKey) -> Option<Arc<[GraphElement]>> {
        // Entries are immutable once inserted, so a poisoned lock still holds
        // consistent data.
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    pub fn is_cached(&self, key: ShardKey) -> bool {
        self.cached(key).is_some()
    }

    /// Keys currently held in the cache, sorted
    pub fn cached_keys(&self) -> Vec<ShardKey> {
        let mut keys: Vec<_> = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        keys.sort();
        keys
    }
}
