use crate::error::{WdbcError, WdbcResult};
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

pub type FastMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;

// ─── Binary Layout ──────────────────────────────────────────────────────────
//
//  ┌──────────────────────────────────────────────┐
//  │ Header (20 bytes)                            │
//  │   signature:         [u8; 4]  "WDBC"         │
//  │   record_count:      u32 (LE)                │
//  │   field_count:       u32 (LE)                │
//  │   record_size:       u32 (LE)                │
//  │   string_block_size: u32 (LE)                │
//  ├──────────────────────────────────────────────┤
//  │ Rows (record_size × record_count)            │
//  │   fields packed per format string            │
//  ├──────────────────────────────────────────────┤
//  │ String block (string_block_size)             │
//  │   NUL-terminated strings, addressed by offset│
//  └──────────────────────────────────────────────┘

pub const WDBC_SIGNATURE: [u8; 4] = *b"WDBC";
pub const HEADER_SIZE: usize = 20; // 4 + 4 * 4

// ─── Header ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub signature: [u8; 4],
    pub record_count: u32,
    pub field_count: u32,
    pub record_size: u32,
    pub string_block_size: u32,
}

impl Header {
    /// Parse the fixed header from the start of a file buffer.
    ///
    /// The signature is checked here so a foreign file is rejected before
    /// anything else is looked at.
    pub fn parse(bytes: &[u8]) -> WdbcResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(WdbcError::TruncatedFile {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let mut signature = [0u8; 4];
        signature.copy_from_slice(&bytes[0..4]);
        if signature != WDBC_SIGNATURE {
            return Err(WdbcError::BadSignature { found: signature });
        }

        Ok(Header {
            signature,
            record_count: read_u32_le(bytes, 4),
            field_count: read_u32_le(bytes, 8),
            record_size: read_u32_le(bytes, 12),
            string_block_size: read_u32_le(bytes, 16),
        })
    }

    /// Bytes of row data following the header.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.record_count as usize * self.record_size as usize
    }

    /// Total file size the header promises.
    #[inline]
    pub fn expected_len(&self) -> usize {
        HEADER_SIZE + self.data_size() + self.string_block_size as usize
    }
}

#[inline]
pub(crate) fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(b)
}
