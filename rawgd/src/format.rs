//! RAWGD binary layout
//!
//! # Layout
//! ```text
//! 0x00: magic "RAWGD" (5 bytes)
//! 0x05: version u8 (major << 4 | minor)
//! 0x06: flags u8
//! 0x07: vertex_count u16
//! 0x09: positions (vertex_count * 3 * f16)
//! var:  index_count u16 + indices (index_count * u16), if FLAG_INDICES
//! var:  normals (vertex_count * 2 bytes, octahedral), if FLAG_NORMALS
//! var:  uvs (vertex_count * 2 * i16), if FLAG_UVS
//! var:  colors (vertex_count * u16), if FLAG_RGBA5551 or FLAG_RGB565
//! ```
//!
//! All multi-byte values are little-endian. No padding, no alignment.

use crate::error::{RawgdError, Result};
use crate::packing::FormatVersion;

/// Magic bytes at the start of every buffer
pub const RAWGD_MAGIC: [u8; 5] = *b"RAWGD";

/// Version written by the encoder
pub const RAWGD_VERSION: FormatVersion = FormatVersion::new(1, 0);

/// File extension without dot
pub const RAWGD_EXT: &str = "rawgd";

/// Flag: index section present
pub const FLAG_INDICES: u8 = 0x01;
/// Flag: octahedral normals present
pub const FLAG_NORMALS: u8 = 0x02;
/// Flag: snorm16 UVs present
pub const FLAG_UVS: u8 = 0x04;
/// Flag: RGBA5551 colors present
pub const FLAG_RGBA5551: u8 = 0x08;
/// Flag: RGB565 colors present
pub const FLAG_RGB565: u8 = 0x10;

/// Bytes per vertex for each section
pub const POSITION_STRIDE: usize = 6;
pub const NORMAL_STRIDE: usize = 2;
pub const UV_STRIDE: usize = 4;
pub const COLOR_STRIDE: usize = 2;

/// Fixed-size RAWGD header (9 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawgdHeader {
    pub version: FormatVersion,
    pub flags: u8,
    pub vertex_count: u16,
}

impl RawgdHeader {
    pub const SIZE: usize = 9;

    pub fn new(flags: u8, vertex_count: u16) -> Self {
        Self {
            version: RAWGD_VERSION,
            flags,
            vertex_count,
        }
    }

    #[inline]
    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..5].copy_from_slice(&RAWGD_MAGIC);
        bytes[5] = self.version.to_byte();
        bytes[6] = self.flags;
        bytes[7..9].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    ///
    /// Magic bytes are checked one at a time, so a short buffer whose
    /// available prefix already mismatches reports `FormatInvalid` rather
    /// than `Truncated`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        for (index, &expected) in RAWGD_MAGIC.iter().enumerate() {
            let Some(&found) = bytes.get(index) else {
                return Err(truncated("magic", index, RAWGD_MAGIC.len() - index, bytes));
            };
            if found != expected {
                return Err(RawgdError::FormatInvalid {
                    index,
                    found,
                    expected,
                });
            }
        }

        if bytes.len() < Self::SIZE {
            let offset = RAWGD_MAGIC.len();
            return Err(truncated("header", offset, Self::SIZE - offset, bytes));
        }

        Ok(Self {
            version: FormatVersion::from_byte(bytes[5]),
            flags: bytes[6],
            vertex_count: u16::from_le_bytes([bytes[7], bytes[8]]),
        })
    }

    /// Bytes of per-vertex data implied by the header
    ///
    /// Excludes the index section, whose length is stored in the body.
    pub fn vertex_payload_len(&self) -> usize {
        let vertex_count = self.vertex_count as usize;
        let mut stride = POSITION_STRIDE;

        if self.has(FLAG_NORMALS) {
            stride += NORMAL_STRIDE;
        }
        if self.has(FLAG_UVS) {
            stride += UV_STRIDE;
        }
        if self.has(FLAG_RGBA5551) || self.has(FLAG_RGB565) {
            stride += COLOR_STRIDE;
        }

        vertex_count * stride
    }
}

fn truncated(section: &'static str, offset: usize, needed: usize, bytes: &[u8]) -> RawgdError {
    RawgdError::Truncated {
        section,
        offset,
        needed,
        available: bytes.len().saturating_sub(offset),
    }
}
