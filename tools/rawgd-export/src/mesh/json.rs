//! JSON geometry documents
//!
//! Mirrors the flat arrays of the geometry record:
//! ```json
//! { "vertices": [0, 0, 0, 1, 0, 0, 0, 1, 0], "indices": [0, 1, 2] }
//! ```

use anyhow::{Context, Result};
use rawgd::{DecodedGeometry, Geometry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable geometry: flat attribute arrays plus optional version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryDocument {
    /// Format version of the buffer this was decoded from ("major.minor")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub vertices: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvs: Option<Vec<f32>>,
    /// RGB or RGBA, inferred from length like the geometry builder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<f32>>,
}

impl GeometryDocument {
    pub fn from_decoded(decoded: &DecodedGeometry) -> Self {
        let geometry = &decoded.geometry;
        Self {
            version: Some(decoded.version.to_string()),
            vertices: geometry.vertices().to_vec(),
            indices: geometry.indices().map(<[u16]>::to_vec),
            normals: geometry.normals().map(<[f32]>::to_vec),
            uvs: geometry.uvs().map(<[f32]>::to_vec),
            colors: geometry.colors().map(|c| c.as_slice().to_vec()),
        }
    }

    /// Validate into a geometry record; `version` is ignored
    pub fn into_geometry(self) -> rawgd::Result<Geometry> {
        let mut builder = Geometry::builder(self.vertices);
        if let Some(indices) = self.indices {
            builder = builder.indices(indices);
        }
        if let Some(normals) = self.normals {
            builder = builder.normals(normals);
        }
        if let Some(uvs) = self.uvs {
            builder = builder.uvs(uvs);
        }
        if let Some(colors) = self.colors {
            builder = builder.colors(colors);
        }
        builder.build()
    }
}

/// Load a JSON geometry document as RAWGD geometry
pub fn load_json(input: &Path) -> Result<Geometry> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read JSON: {:?}", input))?;
    let document: GeometryDocument = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON geometry: {:?}", input))?;
    document
        .into_geometry()
        .with_context(|| format!("Invalid geometry in {:?}", input))
}
