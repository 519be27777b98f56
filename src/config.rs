use crate::cache::TableCacheConfig;
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const ENV_DBC_PATH: &str = "DBC_PATH";
pub const ENV_FORMAT_FILE: &str = "DBC_FORMAT_FILE";
pub const ENV_CACHE_CAPACITY: &str = "DBC_CACHE_CAPACITY";

/// Where tables and their layout declarations live.
#[derive(Debug, Clone)]
pub struct WdbcConfig {
    /// Directory holding `<Name>.dbc` files.
    pub dbc_dir: PathBuf,
    /// Header file with the `Namefmt[] = "..."` declarations.
    pub format_file: PathBuf,
    /// Install the built-in short-name overrides on the catalog.
    pub default_overrides: bool,
    pub cache: TableCacheConfig,
}

impl Default for WdbcConfig {
    fn default() -> Self {
        Self {
            dbc_dir: PathBuf::from("dbc"),
            format_file: PathBuf::from("DBCfmt.h"),
            default_overrides: true,
            cache: TableCacheConfig::default(),
        }
    }
}

impl WdbcConfig {
    /// Defaults overridden by `DBC_PATH`, `DBC_FORMAT_FILE` and
    /// `DBC_CACHE_CAPACITY` when set.
    pub fn from_env() -> Self {
        Self::default().with_vars(|k| std::env::var(k).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var(ENV_DBC_PATH) {
            self.dbc_dir = PathBuf::from(dir);
        }
        if let Some(file) = var(ENV_FORMAT_FILE) {
            self.format_file = PathBuf::from(file);
        }
        if let Some(raw) = var(ENV_CACHE_CAPACITY) {
            match raw.trim().parse::<NonZeroUsize>() {
                Ok(capacity) => self.cache.capacity = capacity,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring invalid {ENV_CACHE_CAPACITY}"),
            }
        }
        self
    }

    /// `<dbc_dir>/<name>.dbc`
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dbc_dir.join(format!("{name}.dbc"))
    }
}
