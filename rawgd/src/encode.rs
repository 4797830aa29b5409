//! RAWGD encoder

use crate::format::{
    COLOR_STRIDE, FLAG_INDICES, FLAG_NORMALS, FLAG_RGB565, FLAG_RGBA5551, FLAG_UVS,
    NORMAL_STRIDE, POSITION_STRIDE, RawgdHeader, UV_STRIDE,
};
use crate::geometry::{Geometry, VertexColors};
use crate::packing::{f32_to_f16, pack_normal_oct8, pack_rgb565, pack_rgba5551, pack_uv_snorm16};

/// Flags byte describing which optional sections `geometry` carries
pub fn flags_for(geometry: &Geometry) -> u8 {
    let mut flags = 0u8;

    if geometry.indices().is_some() {
        flags |= FLAG_INDICES;
    }
    if geometry.normals().is_some() {
        flags |= FLAG_NORMALS;
    }
    if geometry.uvs().is_some() {
        flags |= FLAG_UVS;
    }
    match geometry.colors() {
        Some(VertexColors::Rgba(_)) => flags |= FLAG_RGBA5551,
        Some(VertexColors::Rgb(_)) => flags |= FLAG_RGB565,
        None => {}
    }

    flags
}

/// Exact size in bytes of the encoded buffer
pub fn encoded_len(geometry: &Geometry) -> usize {
    let vertex_count = geometry.vertex_count();
    let mut size = RawgdHeader::SIZE + vertex_count * POSITION_STRIDE;

    if let Some(indices) = geometry.indices() {
        size += 2 + indices.len() * 2;
    }
    if geometry.normals().is_some() {
        size += vertex_count * NORMAL_STRIDE;
    }
    if geometry.uvs().is_some() {
        size += vertex_count * UV_STRIDE;
    }
    if geometry.colors().is_some() {
        size += vertex_count * COLOR_STRIDE;
    }

    size
}

/// Encode geometry into a RAWGD buffer
///
/// Section order: header → positions → indices → normals → uvs → colors.
pub fn encode(geometry: &Geometry) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(geometry));

    // The builder caps the vertex count at u16::MAX
    let header = RawgdHeader::new(flags_for(geometry), geometry.vertex_count() as u16);
    out.extend_from_slice(&header.to_bytes());

    // Positions: f32 → f16
    for &component in geometry.vertices() {
        out.extend_from_slice(&f32_to_f16(component).to_le_bytes());
    }

    if let Some(indices) = geometry.indices() {
        out.extend_from_slice(&(indices.len() as u16).to_le_bytes());
        for &index in indices {
            out.extend_from_slice(&index.to_le_bytes());
        }
    }

    // Normals: f32x3 → octahedral u8x2
    if let Some(normals) = geometry.normals() {
        for n in normals.chunks_exact(3) {
            out.extend_from_slice(&pack_normal_oct8(n[0], n[1], n[2]));
        }
    }

    // UVs: f32 → snorm16
    if let Some(uvs) = geometry.uvs() {
        for &component in uvs {
            out.extend_from_slice(&pack_uv_snorm16(component).to_le_bytes());
        }
    }

    match geometry.colors() {
        Some(VertexColors::Rgba(colors)) => {
            for c in colors.chunks_exact(4) {
                out.extend_from_slice(&pack_rgba5551(c[0], c[1], c[2], c[3]).to_le_bytes());
            }
        }
        Some(VertexColors::Rgb(colors)) => {
            for c in colors.chunks_exact(3) {
                out.extend_from_slice(&pack_rgb565(c[0], c[1], c[2]).to_le_bytes());
            }
        }
        None => {}
    }

    debug_assert_eq!(out.len(), encoded_len(geometry));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::RAWGD_MAGIC;

    fn triangle() -> Vec<f32> {
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
    }

    #[test]
    fn test_positions_only_layout() {
        let geometry = Geometry::builder(triangle()).build().unwrap();
        let bytes = encode(&geometry);

        assert_eq!(bytes.len(), RawgdHeader::SIZE + 3 * 6);
        assert_eq!(&bytes[0..5], &RAWGD_MAGIC);
        assert_eq!(bytes[5], 0x10);
        assert_eq!(bytes[6], 0);
        assert_eq!(&bytes[7..9], &[3, 0]);
        // Second vertex x = 1.0 → 0x3C00 little-endian
        assert_eq!(&bytes[15..17], &[0x00, 0x3C]);
    }

    #[test]
    fn test_flags_and_sizes() {
        let geometry = Geometry::builder(triangle())
            .indices(vec![0, 1, 2])
            .normals(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0])
            .uvs(vec![0.0; 6])
            .colors(vec![1.0; 12])
            .build()
            .unwrap();

        assert_eq!(
            flags_for(&geometry),
            FLAG_INDICES | FLAG_NORMALS | FLAG_UVS | FLAG_RGBA5551
        );
        // 9 + 18 + (2 + 6) + 6 + 12 + 6
        assert_eq!(encoded_len(&geometry), 59);
        assert_eq!(encode(&geometry).len(), 59);
    }

    #[test]
    fn test_never_sets_both_color_flags() {
        for colors in [vec![0.2; 9], vec![0.2; 12]] {
            let geometry = Geometry::builder(triangle())
                .colors(colors)
                .build()
                .unwrap();
            let flags = encode(&geometry)[6];
            assert_ne!(
                flags & (FLAG_RGB565 | FLAG_RGBA5551),
                FLAG_RGB565 | FLAG_RGBA5551
            );
            assert_ne!(flags & (FLAG_RGB565 | FLAG_RGBA5551), 0);
        }
    }

    #[test]
    fn test_index_section_layout() {
        let geometry = Geometry::builder(triangle())
            .indices(vec![2, 1, 0x0300])
            .build()
            .unwrap();
        let bytes = encode(&geometry);
        let start = RawgdHeader::SIZE + 18;
        assert_eq!(&bytes[start..], &[3, 0, 2, 0, 1, 0, 0x00, 0x03]);
    }

    #[test]
    fn test_uv_section_uses_floor() {
        let geometry = Geometry::builder(vec![0.0; 3])
            .uvs(vec![0.5, -0.5])
            .build()
            .unwrap();
        let bytes = encode(&geometry);
        let start = RawgdHeader::SIZE + 6;
        let u = i16::from_le_bytes([bytes[start], bytes[start + 1]]);
        let v = i16::from_le_bytes([bytes[start + 2], bytes[start + 3]]);
        assert_eq!(u, 16383);
        assert_eq!(v, -16384);
    }
}
