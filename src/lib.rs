pub mod cache;
pub mod catalog;
pub mod config;
pub mod deserialization;
pub mod error;
pub mod format;
pub mod string_table;
pub mod table;
pub mod types;
pub mod wdbc_value;

pub use cache::{TableCache, TableCacheConfig};
pub use catalog::FormatCatalog;
pub use config::WdbcConfig;
pub use error::{WdbcError, WdbcResult};
pub use format::{FieldKind, FormatSpecification};
pub use string_table::StringTable;
pub use table::{Filter, TableInfo, TableReader};
pub use wdbc_value::{QueryRow, Record, WdbcValue};
