use crate::deserialization::decode_record;
use crate::error::{WdbcError, WdbcResult};
use crate::format::FormatSpecification;
use crate::string_table::StringTable;
use crate::types::{HEADER_SIZE, Header};
use crate::wdbc_value::Record;
use serde::Serialize;
use smol_str::SmolStr;
use std::path::Path;

/// A fully decoded WDBC table.
///
/// Built once by [`TableReader::open`] / [`TableReader::from_bytes`] and never
/// mutated afterwards, so a shared reference can be handed to any number of
/// readers at once. A value of this type only exists in the loaded state;
/// every validation failure surfaces as an error from the constructor.
#[derive(Debug, Clone)]
pub struct TableReader {
    pub(crate) label: SmolStr,
    pub(crate) header: Header,
    pub(crate) spec: FormatSpecification,
    pub(crate) data: Box<[u8]>,
    pub(crate) strings: StringTable,
    pub(crate) records: Vec<Record>,
}

/// Introspection block for listing tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub file: String,
    pub signature: String,
    pub record_count: u32,
    pub field_count: u32,
    pub record_size: u32,
    pub string_block_size: u32,
    pub format: String,
}

impl TableReader {
    /// Read and decode the file at `path` with the given layout.
    pub fn open(path: impl AsRef<Path>, spec: FormatSpecification) -> WdbcResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WdbcError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path)?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        Self::from_bytes(&bytes, spec, &label)
    }

    /// Validate and decode an in-memory WDBC image.
    ///
    /// Checks run in order: header length, signature, field count, record
    /// size, total length. Rows are only decoded once all of them pass.
    pub fn from_bytes(bytes: &[u8], spec: FormatSpecification, label: &str) -> WdbcResult<Self> {
        let header = Header::parse(bytes)?;

        if spec.field_count() != header.field_count {
            return Err(WdbcError::FormatMismatch {
                format: spec.field_count(),
                header: header.field_count,
            });
        }
        if spec.record_size() != header.record_size {
            return Err(WdbcError::RecordSizeMismatch {
                format: spec.record_size(),
                header: header.record_size,
            });
        }
        let expected = header.expected_len();
        if bytes.len() < expected {
            return Err(WdbcError::TruncatedFile {
                expected,
                actual: bytes.len(),
            });
        }

        let data_end = HEADER_SIZE + header.data_size();
        let data: Box<[u8]> = Box::from(&bytes[HEADER_SIZE..data_end]);
        let strings = StringTable::new(&bytes[data_end..expected]);

        let records: Vec<Record> = if header.record_size == 0 {
            // zero-width rows still occupy an index each
            (0..header.record_count).map(|_| Record::default()).collect()
        } else {
            data.chunks_exact(header.record_size as usize)
                .map(|row| decode_record(&spec, row, &strings))
                .collect()
        };

        tracing::debug!(
            table = label,
            records = records.len(),
            fields = header.field_count,
            record_size = header.record_size,
            string_block = header.string_block_size,
            "decoded WDBC table"
        );

        Ok(Self {
            label: SmolStr::from(label),
            header,
            spec,
            data,
            strings,
            records,
        })
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn spec(&self) -> &FormatSpecification {
        &self.spec
    }

    #[inline]
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Name the table was opened under (file name for on-disk tables).
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Positional lookup, 0-based.
    #[inline]
    pub fn record_at(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    /// Undecoded bytes of one row.
    pub fn row_bytes(&self, row: usize) -> Option<&[u8]> {
        if row >= self.records.len() {
            return None;
        }
        let size = self.header.record_size as usize;
        let start = row.checked_mul(size)?;
        self.data.get(start..start.checked_add(size)?)
    }

    pub fn info(&self) -> TableInfo {
        TableInfo {
            file: self.label.to_string(),
            signature: String::from_utf8_lossy(&self.header.signature).into_owned(),
            record_count: self.header.record_count,
            field_count: self.header.field_count,
            record_size: self.header.record_size,
            string_block_size: self.header.string_block_size,
            format: self.spec.format_string().to_string(),
        }
    }
}
