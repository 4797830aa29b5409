//! RAWGD decoder

use crate::error::{RawgdError, Result};
use crate::format::{
    FLAG_INDICES, FLAG_NORMALS, FLAG_RGB565, FLAG_RGBA5551, FLAG_UVS,
    NORMAL_STRIDE, POSITION_STRIDE, RawgdHeader, UV_STRIDE,
};
use crate::geometry::{DecodedGeometry, Geometry, VertexColors};
use crate::packing::{
    f16_to_f32, unpack_normal_oct8, unpack_rgb565, unpack_rgba5551, unpack_uv_snorm16,
};

/// Bounds-checked little-endian cursor over the input buffer
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// Borrow the next `len` bytes of `section`, or fail with `Truncated`
    fn take(&mut self, section: &'static str, len: usize) -> Result<&'a [u8]> {
        let available = self.data.len().saturating_sub(self.offset);
        if len > available {
            return Err(RawgdError::Truncated {
                section,
                offset: self.offset,
                needed: len,
                available,
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_u16(&mut self, section: &'static str) -> Result<u16> {
        let bytes = self.take(section, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read `count` little-endian u16 values
    fn u16_section(
        &mut self,
        section: &'static str,
        count: usize,
    ) -> Result<impl Iterator<Item = u16>> {
        let bytes = self.take(section, count * 2)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]])))
    }
}

/// Read and validate only the fixed header
pub fn read_header(bytes: &[u8]) -> Result<RawgdHeader> {
    RawgdHeader::from_bytes(bytes)
}

/// Decode a RAWGD buffer
///
/// The version byte is reported but does not change how the body is parsed.
/// Bytes after the last section are ignored. Fails with
/// [`RawgdError::FormatInvalid`] on a bad magic prefix and with
/// [`RawgdError::Truncated`] if any section runs past the end of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<DecodedGeometry> {
    let header = RawgdHeader::from_bytes(bytes)?;
    let vertex_count = header.vertex_count as usize;
    let mut reader = ByteReader::new(bytes, RawgdHeader::SIZE);

    let vertices: Vec<f32> = reader
        .take("positions", vertex_count * POSITION_STRIDE)?
        .chunks_exact(2)
        .map(|chunk| f16_to_f32(u16::from_le_bytes([chunk[0], chunk[1]])))
        .collect();

    let indices = if header.has(FLAG_INDICES) {
        let index_count = reader.read_u16("index count")? as usize;
        Some(reader.u16_section("indices", index_count)?.collect::<Vec<_>>())
    } else {
        None
    };

    let normals = if header.has(FLAG_NORMALS) {
        let packed = reader.take("normals", vertex_count * NORMAL_STRIDE)?;
        let mut normals = Vec::with_capacity(vertex_count * 3);
        for pair in packed.chunks_exact(2) {
            let n = unpack_normal_oct8([pair[0], pair[1]]);
            normals.extend_from_slice(&n.to_array());
        }
        Some(normals)
    } else {
        None
    };

    let uvs = if header.has(FLAG_UVS) {
        let uvs = reader
            .take("uvs", vertex_count * UV_STRIDE)?
            .chunks_exact(2)
            .map(|chunk| unpack_uv_snorm16(i16::from_le_bytes([chunk[0], chunk[1]])))
            .collect();
        Some(uvs)
    } else {
        None
    };

    // RGBA5551 takes precedence if a foreign encoder set both flags
    let colors = if header.has(FLAG_RGBA5551) {
        let colors = reader
            .u16_section("colors", vertex_count)?
            .flat_map(unpack_rgba5551)
            .collect();
        Some(VertexColors::Rgba(colors))
    } else if header.has(FLAG_RGB565) {
        let colors = reader
            .u16_section("colors", vertex_count)?
            .flat_map(unpack_rgb565)
            .collect();
        Some(VertexColors::Rgb(colors))
    } else {
        None
    };

    Ok(DecodedGeometry {
        version: header.version,
        geometry: Geometry::from_parts(vertices, indices, normals, uvs, colors),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::format::RAWGD_VERSION;

    fn quad() -> Geometry {
        Geometry::builder(vec![
            -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0,
        ])
        .indices(vec![0, 1, 2, 0, 2, 3])
        .build()
        .unwrap()
    }

    #[test]
    fn test_decode_positions_and_indices() {
        let decoded = decode(&encode(&quad())).unwrap();
        assert_eq!(decoded.version, RAWGD_VERSION);
        assert_eq!(decoded.geometry, quad());
        assert!(decoded.colors_rgb().is_none());
        assert!(decoded.colors_rgba().is_none());
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut bytes = encode(&quad());
        bytes[0] = b'X';
        assert!(matches!(
            decode(&bytes),
            Err(RawgdError::FormatInvalid { index: 0, .. })
        ));
    }

    #[test]
    fn test_decode_truncated_sections() {
        let bytes = encode(&quad());
        // Cut inside positions, the index count and the index data
        for (len, section) in [(12, "positions"), (34, "index count"), (40, "indices")] {
            match decode(&bytes[..len]) {
                Err(RawgdError::Truncated { section: s, .. }) => assert_eq!(s, section),
                other => panic!("expected truncation in {section}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_ignores_version_value() {
        let mut bytes = encode(&quad());
        bytes[5] = 0x37;
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.version.major, 3);
        assert_eq!(decoded.version.minor, 7);
        assert_eq!(decoded.geometry, quad());
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = encode(&quad());
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(decode(&bytes).unwrap().geometry, quad());
    }

    #[test]
    fn test_decode_both_color_flags_reads_rgba() {
        let geometry = Geometry::builder(quad().vertices().to_vec())
            .indices(vec![0, 1, 2, 0, 2, 3])
            .colors_rgba([1.0, 0.0, 0.0, 1.0].repeat(4))
            .build()
            .unwrap();
        let mut bytes = encode(&geometry);
        bytes[6] |= FLAG_RGB565;
        assert!(bytes[6] & FLAG_RGBA5551 != 0);

        // Only one color section follows the indices
        let color_section = 4 * 2;
        assert_eq!(bytes.len(), RawgdHeader::SIZE + 4 * POSITION_STRIDE + 2 + 12 + color_section);

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.colors_rgba().is_some());
        assert!(decoded.colors_rgb().is_none());
        assert_eq!(&decoded.colors_rgba().unwrap()[..4], &[1.0, 0.0, 0.0, 1.0]);

        // Dropping the last color still fails in the single section
        assert!(matches!(
            decode(&bytes[..bytes.len() - 2]),
            Err(RawgdError::Truncated { section: "colors", .. })
        ));
    }

    #[test]
    fn test_decode_empty_geometry() {
        let geometry = Geometry::builder(Vec::new()).build().unwrap();
        let decoded = decode(&encode(&geometry)).unwrap();
        assert_eq!(decoded.geometry.vertex_count(), 0);
    }
}
