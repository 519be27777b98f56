use smol_str::SmolStr;

/// The string block at the end of a WDBC file: NUL-terminated strings
/// addressed by byte offset. Offset 0 is conventionally the empty string.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    bytes: Box<[u8]>,
}

impl StringTable {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw bytes at `offset` up to (not including) the next NUL or the end
    /// of the block. Out-of-range offsets give an empty slice.
    pub fn raw_at(&self, offset: u32) -> &[u8] {
        let start = offset as usize;
        let Some(tail) = self.bytes.get(start..) else {
            return &[];
        };
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..end]
    }

    /// Decode the string at `offset`. Never fails: out-of-range offsets give
    /// `""`, and bytes that are not UTF-8 are read as Latin-1 so every byte
    /// survives as one char.
    pub fn read_string(&self, offset: u32) -> SmolStr {
        let raw = self.raw_at(offset);
        match std::str::from_utf8(raw) {
            Ok(s) => SmolStr::from(s),
            Err(_) => {
                tracing::trace!(offset, len = raw.len(), "string is not UTF-8, decoding as Latin-1");
                raw.iter().map(|&b| b as char).collect()
            }
        }
    }
}
