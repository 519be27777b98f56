use serde::ser::{Serialize, SerializeMap, Serializer};
use smol_str::SmolStr;
use std::collections::BTreeMap;

// ─── WdbcValue ──────────────────────────────────────────────────────────────

/// One decoded field. Every `FieldKind` produces exactly one variant:
///
/// | kind            | variant |
/// |-----------------|---------|
/// | FixedU32        | `U32`   |
/// | FixedFloat32    | `F32`   |
/// | FixedU8         | `U8`    |
/// | StringRef       | `Str`   |
/// | PadU32 / PadU8  | `Empty` |
#[derive(Debug, Clone, PartialEq)]
pub enum WdbcValue {
    U32(u32),
    F32(f32),
    U8(u8),
    Str(SmolStr),
    Empty,
}

impl Default for WdbcValue {
    fn default() -> Self {
        WdbcValue::Empty
    }
}

impl WdbcValue {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            WdbcValue::U32(v) => Some(*v),
            WdbcValue::U8(v) => Some(*v as u32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WdbcValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view used when comparing across integer and float fields.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WdbcValue::U32(v) => Some(*v as f64),
            WdbcValue::U8(v) => Some(*v as f64),
            WdbcValue::F32(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, WdbcValue::Empty)
    }

    /// Loose equality used by query filters: integers compare by value
    /// regardless of width, and an integer equals a float with the same
    /// numeric value. Text only matches text, `Empty` only matches `Empty`.
    pub fn matches(&self, other: &WdbcValue) -> bool {
        match (self, other) {
            (WdbcValue::Str(a), WdbcValue::Str(b)) => a == b,
            (WdbcValue::Empty, WdbcValue::Empty) => true,
            (WdbcValue::F32(_), _) | (_, WdbcValue::F32(_)) => {
                match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ => match (self.as_u32(), other.as_u32()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for WdbcValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WdbcValue::U32(v) => write!(f, "{v}"),
            WdbcValue::F32(v) => write!(f, "{v}"),
            WdbcValue::U8(v) => write!(f, "{v}"),
            WdbcValue::Str(s) => f.write_str(s),
            WdbcValue::Empty => f.write_str("null"),
        }
    }
}

// ─── Serialize ──────────────────────────────────────────────────────────────

impl Serialize for WdbcValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WdbcValue::U32(v) => serializer.serialize_u32(*v),
            WdbcValue::F32(v) => serializer.serialize_f32(*v),
            WdbcValue::U8(v) => serializer.serialize_u8(*v),
            WdbcValue::Str(s) => serializer.serialize_str(s.as_str()),
            WdbcValue::Empty => serializer.serialize_none(),
        }
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<u32> for WdbcValue {
    fn from(v: u32) -> Self {
        WdbcValue::U32(v)
    }
}

impl From<f32> for WdbcValue {
    fn from(v: f32) -> Self {
        WdbcValue::F32(v)
    }
}

impl From<u8> for WdbcValue {
    fn from(v: u8) -> Self {
        WdbcValue::U8(v)
    }
}

impl From<&str> for WdbcValue {
    fn from(s: &str) -> Self {
        WdbcValue::Str(SmolStr::from(s))
    }
}

impl From<String> for WdbcValue {
    fn from(s: String) -> Self {
        WdbcValue::Str(SmolStr::from(s))
    }
}

impl From<SmolStr> for WdbcValue {
    fn from(s: SmolStr) -> Self {
        WdbcValue::Str(s)
    }
}

impl From<WdbcValue> for serde_json::Value {
    fn from(val: WdbcValue) -> Self {
        match val {
            WdbcValue::U32(v) => serde_json::Value::Number(v.into()),
            WdbcValue::U8(v) => serde_json::Value::Number(v.into()),
            WdbcValue::F32(v) => serde_json::Number::from_f64(v as f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            WdbcValue::Str(s) => serde_json::Value::String(s.to_string()),
            WdbcValue::Empty => serde_json::Value::Null,
        }
    }
}

// ─── Record ─────────────────────────────────────────────────────────────────

/// One decoded row: field index → value, in index order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: BTreeMap<u32, WdbcValue>,
}

/// A query result row. `None` marks a requested field the record lacks;
/// fields that were not requested have no key at all.
pub type QueryRow = BTreeMap<u32, Option<WdbcValue>>;

impl Record {
    pub fn with_fields(fields: BTreeMap<u32, WdbcValue>) -> Self {
        Self { fields }
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&WdbcValue> {
        self.fields.get(&index)
    }

    pub fn insert(&mut self, index: u32, value: WdbcValue) {
        self.fields.insert(index, value);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(index, value)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &WdbcValue)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// The conventional identity field.
    pub fn id(&self) -> Option<u32> {
        self.get(0)?.as_u32()
    }

    /// Every field, present ones as `Some`.
    pub fn to_row(&self) -> QueryRow {
        self.fields
            .iter()
            .map(|(k, v)| (*k, Some(v.clone())))
            .collect()
    }

    /// Only the requested indices, absent ones as `None`.
    pub fn project(&self, indices: &[u32]) -> QueryRow {
        indices
            .iter()
            .map(|i| (*i, self.fields.get(i).cloned()))
            .collect()
    }
}

impl FromIterator<(u32, WdbcValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (u32, WdbcValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut m = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            m.serialize_entry(k, v)?;
        }
        m.end()
    }
}

impl From<Record> for serde_json::Value {
    fn from(rec: Record) -> Self {
        serde_json::Value::Object(
            rec.fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}
