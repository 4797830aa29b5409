//! Mesh converter (OBJ/JSON -> .rawgd)

mod json;
mod obj;

use anyhow::{Context, Result, bail};
use rawgd::Geometry;
use std::path::Path;

// Re-export public API
pub use json::{GeometryDocument, load_json};
pub use obj::{load_obj, parse_obj};

/// RAWGD vertex and index counts are stored as u16
pub(crate) const MAX_VERTEX_COUNT: usize = u16::MAX as usize;

/// Load geometry from an OBJ or JSON file, detected by extension
pub fn load_geometry(input: &Path) -> Result<Geometry> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "obj" => load_obj(input),
        "json" => load_json(input),
        _ => bail!("Unsupported mesh format: {:?} (use .obj or .json)", input),
    }
}

/// Convert a mesh file to a .rawgd file, returning the encoded size
pub fn convert_mesh(input: &Path, output: &Path) -> Result<usize> {
    let geometry = load_geometry(input)?;
    let bytes = rawgd::encode(&geometry);

    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!(
        "Converted mesh: {} vertices, {} indices, flags={:#04x}, {} bytes",
        geometry.vertex_count(),
        geometry.indices().map_or(0, <[u16]>::len),
        rawgd::flags_for(&geometry),
        bytes.len()
    );

    Ok(bytes.len())
}
