use crate::error::WdbcResult;
use crate::format::FormatSpecification;
use crate::table::TableReader;
use lru::LruCache;
use smol_str::SmolStr;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use xxhash_rust::xxh64::xxh64;

/// Configuration for [`TableCache`].
#[derive(Debug, Clone)]
pub struct TableCacheConfig {
    /// Maximum number of decoded tables to keep.
    ///
    /// When this limit is reached, the least-recently-used table is dropped
    /// and decoded again on the next request.
    pub capacity: NonZeroUsize,
}

impl Default for TableCacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(64).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// `(table name, xxh64 of the format string)`. Two layouts applied to the
/// same file are different entries.
pub type CacheKey = (SmolStr, u64);

/// Caller-side cache of decoded tables.
///
/// The decoding core never caches anything itself. The backing files are
/// assumed not to change while cached; call [`TableCache::invalidate`] if
/// they do.
pub struct TableCache {
    tables: LruCache<CacheKey, Arc<TableReader>>,
}

impl TableCache {
    pub fn new(config: TableCacheConfig) -> Self {
        Self {
            tables: LruCache::new(config.capacity),
        }
    }

    pub fn key_for(name: &str, spec: &FormatSpecification) -> CacheKey {
        (SmolStr::from(name), xxh64(spec.format_string().as_bytes(), 0))
    }

    /// Cached table, if present. Marks it most recently used.
    pub fn get(&mut self, name: &str, spec: &FormatSpecification) -> Option<Arc<TableReader>> {
        self.tables.get(&Self::key_for(name, spec)).cloned()
    }

    /// Cached table or, on a miss, open `path` and remember the result.
    /// Failures are returned and not cached.
    pub fn get_or_open(
        &mut self,
        name: &str,
        spec: &FormatSpecification,
        path: impl AsRef<Path>,
    ) -> WdbcResult<Arc<TableReader>> {
        let key = Self::key_for(name, spec);
        if let Some(hit) = self.tables.get(&key) {
            tracing::trace!(table = name, "table cache hit");
            return Ok(Arc::clone(hit));
        }
        tracing::debug!(table = name, path = %path.as_ref().display(), "table cache miss, decoding");
        let reader = Arc::new(TableReader::open(path, spec.clone())?);
        if let Some((evicted, _)) = self.tables.push(key, Arc::clone(&reader)) {
            tracing::debug!(table = evicted.0.as_str(), "evicted table from cache");
        }
        Ok(reader)
    }

    /// Drop every cached layout of `name`. Returns how many entries went.
    pub fn invalidate(&mut self, name: &str) -> usize {
        let stale: Vec<CacheKey> = self
            .tables
            .iter()
            .filter(|(k, _)| k.0 == name)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            self.tables.pop(key);
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new(TableCacheConfig::default())
    }
}
