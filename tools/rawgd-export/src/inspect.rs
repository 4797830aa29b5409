//! Inspection of encoded .rawgd files

use anyhow::{Context, Result};
use rawgd::{
    FLAG_INDICES, FLAG_NORMALS, FLAG_RGB565, FLAG_RGBA5551, FLAG_UVS, FormatVersion, RawgdError,
    RawgdHeader,
};
use std::fmt;
use std::path::Path;

use crate::mesh::GeometryDocument;

/// Summary of a .rawgd buffer
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInfo {
    pub version: FormatVersion,
    pub flags: u8,
    pub vertex_count: usize,
    pub index_count: Option<usize>,
    /// Size of the encoded buffer
    pub encoded_size: usize,
    /// Size the same attributes would take as f32/u16 arrays
    pub raw_size: usize,
}

impl MeshInfo {
    /// Fully decode `bytes` and summarize them
    ///
    /// A body shorter than the per-vertex sections the header implies is
    /// rejected before any section is decoded.
    pub fn from_bytes(bytes: &[u8]) -> rawgd::Result<Self> {
        let header = rawgd::read_header(bytes)?;
        let body_len = bytes.len() - RawgdHeader::SIZE;
        let payload_len = header.vertex_payload_len();
        if body_len < payload_len {
            return Err(RawgdError::Truncated {
                section: "vertex data",
                offset: RawgdHeader::SIZE,
                needed: payload_len,
                available: body_len,
            });
        }

        let decoded = rawgd::decode(bytes)?;
        let geometry = &decoded.geometry;

        let raw_size = geometry.vertices().len() * 4
            + geometry.indices().map_or(0, |i| i.len() * 2)
            + geometry.normals().map_or(0, |n| n.len() * 4)
            + geometry.uvs().map_or(0, |uv| uv.len() * 4)
            + geometry.colors().map_or(0, |c| c.as_slice().len() * 4);

        Ok(Self {
            version: header.version,
            flags: header.flags,
            vertex_count: geometry.vertex_count(),
            index_count: geometry.indices().map(<[u16]>::len),
            encoded_size: rawgd::encoded_len(geometry),
            raw_size,
        })
    }

    /// Names of the optional attributes present
    pub fn attributes(&self) -> Vec<&'static str> {
        [
            (FLAG_INDICES, "indices"),
            (FLAG_NORMALS, "normals"),
            (FLAG_UVS, "uvs"),
            (FLAG_RGBA5551, "rgba5551"),
            (FLAG_RGB565, "rgb565"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.flags & flag != 0)
        .map(|(_, name)| name)
        .collect()
    }
}

impl fmt::Display for MeshInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version:    {}", self.version)?;
        writeln!(f, "flags:      {:#04x} [{}]", self.flags, self.attributes().join(", "))?;
        writeln!(f, "vertices:   {}", self.vertex_count)?;
        if let Some(index_count) = self.index_count {
            writeln!(f, "indices:    {}", index_count)?;
        }
        let ratio = if self.raw_size == 0 {
            1.0
        } else {
            self.encoded_size as f64 / self.raw_size as f64
        };
        write!(
            f,
            "size:       {} bytes ({} bytes as f32, {:.1}%)",
            self.encoded_size,
            self.raw_size,
            ratio * 100.0
        )
    }
}

/// Read a .rawgd file and summarize it
pub fn inspect_file(path: &Path) -> Result<MeshInfo> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read: {:?}", path))?;
    let info = MeshInfo::from_bytes(&bytes)
        .with_context(|| format!("Failed to decode RAWGD file: {:?}", path))?;
    if bytes.len() > info.encoded_size {
        tracing::warn!(
            "{:?} has {} trailing bytes after the last section",
            path,
            bytes.len() - info.encoded_size
        );
    }
    Ok(info)
}

/// Decode a .rawgd file to a JSON document
pub fn dump_file(path: &Path, pretty: bool) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read: {:?}", path))?;
    let decoded = rawgd::decode(&bytes)
        .with_context(|| format!("Failed to decode RAWGD file: {:?}", path))?;
    let document = GeometryDocument::from_decoded(&decoded);

    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}
