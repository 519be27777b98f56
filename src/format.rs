use crate::error::{WdbcError, WdbcResult};
use smol_str::SmolStr;
use std::sync::Arc;

// ─── FieldKind ──────────────────────────────────────────────────────────────
//
//  char   kind           width
//  ────   ────────────   ─────
//  i n    FixedU32       4      (index / sorted index / plain int)
//  d l    FixedU32       4      (same bits on the wire)
//  f      FixedFloat32   4
//  s      StringRef      4      offset into the string block
//  b      FixedU8        1
//  x      PadU32         4      skipped
//  X      PadU8          1      skipped

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    FixedU32,
    FixedFloat32,
    FixedU8,
    StringRef,
    PadU32,
    PadU8,
}

impl FieldKind {
    /// Map a format character to its kind. `position` is only used for the
    /// error report.
    pub fn from_char(ch: char, position: usize) -> WdbcResult<Self> {
        Ok(match ch {
            'i' | 'n' | 'd' | 'l' => FieldKind::FixedU32,
            'f' => FieldKind::FixedFloat32,
            's' => FieldKind::StringRef,
            'b' => FieldKind::FixedU8,
            'x' => FieldKind::PadU32,
            'X' => FieldKind::PadU8,
            _ => return Err(WdbcError::UnknownFieldChar { ch, position }),
        })
    }

    /// Byte width on the wire.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            FieldKind::FixedU32 | FieldKind::FixedFloat32 | FieldKind::StringRef | FieldKind::PadU32 => 4,
            FieldKind::FixedU8 | FieldKind::PadU8 => 1,
        }
    }

    /// Canonical format character. `n`, `d` and `l` collapse to `i`.
    pub const fn as_char(self) -> char {
        match self {
            FieldKind::FixedU32 => 'i',
            FieldKind::FixedFloat32 => 'f',
            FieldKind::FixedU8 => 'b',
            FieldKind::StringRef => 's',
            FieldKind::PadU32 => 'x',
            FieldKind::PadU8 => 'X',
        }
    }

    #[inline]
    pub const fn is_padding(self) -> bool {
        matches!(self, FieldKind::PadU32 | FieldKind::PadU8)
    }
}

// ─── FormatSpecification ────────────────────────────────────────────────────

/// Parsed field layout of one table. Cloning is cheap; the kinds are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpecification {
    source: SmolStr,
    kinds: Arc<[FieldKind]>,
}

impl FormatSpecification {
    /// Parse a format string. Fails fast on the first unknown character.
    pub fn parse(format: &str) -> WdbcResult<Self> {
        let kinds = format
            .chars()
            .enumerate()
            .map(|(pos, ch)| FieldKind::from_char(ch, pos))
            .collect::<WdbcResult<Vec<_>>>()?;
        Ok(Self {
            source: SmolStr::from(format),
            kinds: kinds.into(),
        })
    }

    /// The format string this spec was parsed from, verbatim.
    #[inline]
    pub fn format_string(&self) -> &str {
        self.source.as_str()
    }

    #[inline]
    pub fn kinds(&self) -> &[FieldKind] {
        &self.kinds
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = FieldKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Number of logical fields.
    #[inline]
    pub fn field_count(&self) -> u32 {
        self.kinds.len() as u32
    }

    /// Bytes per row: the sum of every field width.
    pub fn record_size(&self) -> u32 {
        self.kinds.iter().map(|k| k.width() as u32).sum()
    }
}

impl std::str::FromStr for FormatSpecification {
    type Err = WdbcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatSpecification::parse(s)
    }
}

impl std::fmt::Display for FormatSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
