// ─── Error ──────────────────────────────────────────────────────────────────
use std::path::PathBuf;
use thiserror::Error;

pub type WdbcResult<T> = Result<T, WdbcError>;

#[derive(Debug, Error)]
pub enum WdbcError {
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Fewer bytes on disk than the header declares.
    #[error("truncated file: expected at least {expected} bytes, got {actual}")]
    TruncatedFile { expected: usize, actual: usize },
    #[error("bad signature: expected \"WDBC\", found {found:?}")]
    BadSignature { found: [u8; 4] },
    #[error("field count mismatch: format={format}, header={header}")]
    FormatMismatch { format: u32, header: u32 },
    #[error("record size mismatch: format={format}, header={header}")]
    RecordSizeMismatch { format: u32, header: u32 },
    #[error("unknown field character {ch:?} at position {position}")]
    UnknownFieldChar { ch: char, position: usize },
    #[error("no format found for table: {0}")]
    NameNotResolved(String),
    #[error("catalog parse error on line {line}: {reason}")]
    CatalogParse { line: usize, reason: String },
}
