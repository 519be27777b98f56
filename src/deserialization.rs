use super::format::{FieldKind, FormatSpecification};
use super::string_table::StringTable;
use super::wdbc_value::{Record, WdbcValue};

// ─── RecordDecode Trait ─────────────────────────────────────────────────────

/// Trait for value types a WDBC row can be decoded into.
///
/// The row walk is the same for every target; only the leaf constructors
/// differ, so callers can decode straight into `serde_json::Value` without
/// going through `WdbcValue` first.
pub trait RecordDecode: Sized {
    /// Value stored at a padding index.
    fn from_empty() -> Self;

    fn from_u32(v: u32) -> Self;

    fn from_f32(v: f32) -> Self;

    fn from_u8(v: u8) -> Self;

    /// Construct a string value from the resolved string-block entry.
    fn from_str(s: &str) -> Self;
}

// ─── RecordDecode for WdbcValue ─────────────────────────────────────────────

impl RecordDecode for WdbcValue {
    #[inline]
    fn from_empty() -> Self {
        WdbcValue::Empty
    }

    #[inline]
    fn from_u32(v: u32) -> Self {
        WdbcValue::U32(v)
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        WdbcValue::F32(v)
    }

    #[inline]
    fn from_u8(v: u8) -> Self {
        WdbcValue::U8(v)
    }

    #[inline]
    fn from_str(s: &str) -> Self {
        WdbcValue::from(s)
    }
}

// ─── RecordDecode for serde_json::Value ─────────────────────────────────────

impl RecordDecode for serde_json::Value {
    #[inline]
    fn from_empty() -> Self {
        serde_json::Value::Null
    }

    #[inline]
    fn from_u32(v: u32) -> Self {
        serde_json::Value::Number(v.into())
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        serde_json::Number::from_f64(v as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }

    #[inline]
    fn from_u8(v: u8) -> Self {
        serde_json::Value::Number(v.into())
    }

    #[inline]
    fn from_str(s: &str) -> Self {
        serde_json::Value::String(s.to_string())
    }
}

// ─── Decode ─────────────────────────────────────────────────────────────────

#[inline]
fn le_u32(row: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&row[at..at + 4]);
    u32::from_le_bytes(b)
}

/// Decode one field of `kind` at `cursor`.
#[inline]
pub fn decode_field<V: RecordDecode>(
    kind: FieldKind,
    row: &[u8],
    cursor: usize,
    strings: &StringTable,
) -> V {
    match kind {
        FieldKind::FixedU32 => V::from_u32(le_u32(row, cursor)),
        FieldKind::FixedFloat32 => V::from_f32(f32::from_bits(le_u32(row, cursor))),
        FieldKind::FixedU8 => V::from_u8(row[cursor]),
        FieldKind::StringRef => V::from_str(&strings.read_string(le_u32(row, cursor))),
        FieldKind::PadU32 | FieldKind::PadU8 => V::from_empty(),
    }
}

/// Walk `spec` over one row and return the values in field order.
///
/// `row` must be exactly `spec.record_size()` bytes; the table reader
/// guarantees this before any row is decoded.
pub fn decode_record_as<V: RecordDecode>(
    spec: &FormatSpecification,
    row: &[u8],
    strings: &StringTable,
) -> Vec<V> {
    debug_assert_eq!(
        row.len(),
        spec.record_size() as usize,
        "decode_record_as: row length does not match the format"
    );
    let mut out = Vec::with_capacity(spec.field_count() as usize);
    let mut cursor = 0usize;
    for kind in spec.iter() {
        out.push(decode_field(kind, row, cursor, strings));
        cursor += kind.width();
    }
    out
}

/// Decode one row into a `Record` keyed by field index. Padding fields are
/// kept as `WdbcValue::Empty` so indices line up with the format string.
pub fn decode_record(spec: &FormatSpecification, row: &[u8], strings: &StringTable) -> Record {
    decode_record_as::<WdbcValue>(spec, row, strings)
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i as u32, v))
        .collect()
}
