//! Geometry record encoded by RAWGD
//!
//! All attribute arrays are flat and component-major (`[x0, y0, z0, x1, ...]`).
//! A [`Geometry`] can only be obtained through [`GeometryBuilder::build`] or
//! the decoder, so attribute lengths always agree with the vertex count.

use crate::error::{RawgdError, Result};
use crate::packing::FormatVersion;

/// Per-vertex colors; RGB and RGBA are mutually exclusive
#[derive(Debug, Clone, PartialEq)]
pub enum VertexColors {
    /// 3 floats per vertex, stored as RGB565
    Rgb(Vec<f32>),
    /// 4 floats per vertex, stored as RGBA5551
    Rgba(Vec<f32>),
}

impl VertexColors {
    pub fn components(&self) -> usize {
        match self {
            VertexColors::Rgb(_) => 3,
            VertexColors::Rgba(_) => 4,
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        match self {
            VertexColors::Rgb(data) | VertexColors::Rgba(data) => data,
        }
    }
}

/// Mesh geometry: positions plus optional indices, normals, UVs and colors
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<f32>,
    indices: Option<Vec<u16>>,
    normals: Option<Vec<f32>>,
    uvs: Option<Vec<f32>>,
    colors: Option<VertexColors>,
}

impl Geometry {
    /// Start building a geometry record from flat `xyz` positions
    pub fn builder(vertices: Vec<f32>) -> GeometryBuilder {
        GeometryBuilder {
            vertices,
            indices: None,
            normals: None,
            uvs: None,
            colors: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    pub fn uvs(&self) -> Option<&[f32]> {
        self.uvs.as_deref()
    }

    pub fn colors(&self) -> Option<&VertexColors> {
        self.colors.as_ref()
    }

    /// Assemble a record the decoder has already sized from the header
    pub(crate) fn from_parts(
        vertices: Vec<f32>,
        indices: Option<Vec<u16>>,
        normals: Option<Vec<f32>>,
        uvs: Option<Vec<f32>>,
        colors: Option<VertexColors>,
    ) -> Self {
        Self {
            vertices,
            indices,
            normals,
            uvs,
            colors,
        }
    }
}

/// Color input before the RGB/RGBA variant is resolved
#[derive(Debug, Clone)]
enum ColorInput {
    Inferred(Vec<f32>),
    Explicit(VertexColors),
}

/// Validating builder for [`Geometry`]
#[derive(Debug, Clone)]
pub struct GeometryBuilder {
    vertices: Vec<f32>,
    indices: Option<Vec<u16>>,
    normals: Option<Vec<f32>>,
    uvs: Option<Vec<f32>>,
    colors: Option<ColorInput>,
}

impl GeometryBuilder {
    pub fn indices(mut self, indices: Vec<u16>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Unit normals, 3 floats per vertex. Not renormalized.
    pub fn normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn uvs(mut self, uvs: Vec<f32>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Flat colors; RGBA iff `len == vertex_count * 4`, RGB otherwise
    pub fn colors(mut self, colors: Vec<f32>) -> Self {
        self.colors = Some(ColorInput::Inferred(colors));
        self
    }

    pub fn colors_rgb(mut self, colors: Vec<f32>) -> Self {
        self.colors = Some(ColorInput::Explicit(VertexColors::Rgb(colors)));
        self
    }

    pub fn colors_rgba(mut self, colors: Vec<f32>) -> Self {
        self.colors = Some(ColorInput::Explicit(VertexColors::Rgba(colors)));
        self
    }

    /// Validate attribute lengths against the vertex count
    pub fn build(self) -> Result<Geometry> {
        if self.vertices.len() % 3 != 0 {
            return Err(violated(format!(
                "vertex array length {} is not a multiple of 3",
                self.vertices.len()
            )));
        }

        let vertex_count = self.vertices.len() / 3;
        if vertex_count > u16::MAX as usize {
            return Err(violated(format!(
                "{} vertices exceeds the maximum of {}",
                vertex_count,
                u16::MAX
            )));
        }

        let index_count = self.indices.as_ref().map_or(0, Vec::len);
        if index_count > u16::MAX as usize {
            return Err(violated(format!(
                "{} indices exceeds the maximum of {}",
                index_count,
                u16::MAX
            )));
        }

        if let Some(normals) = &self.normals {
            check_len("normal", normals.len(), vertex_count, 3)?;
        }
        if let Some(uvs) = &self.uvs {
            check_len("uv", uvs.len(), vertex_count, 2)?;
        }

        let colors = match self.colors {
            None => None,
            Some(ColorInput::Inferred(data)) => {
                // Tie-break on length alone: exactly 4 per vertex is RGBA
                let colors = if data.len() == vertex_count * 4 {
                    VertexColors::Rgba(data)
                } else {
                    VertexColors::Rgb(data)
                };
                Some(colors)
            }
            Some(ColorInput::Explicit(colors)) => Some(colors),
        };

        if let Some(colors) = &colors {
            check_len(
                "color",
                colors.as_slice().len(),
                vertex_count,
                colors.components(),
            )?;
        }

        Ok(Geometry {
            vertices: self.vertices,
            indices: self.indices,
            normals: self.normals,
            uvs: self.uvs,
            colors,
        })
    }
}

fn check_len(attribute: &str, len: usize, vertex_count: usize, components: usize) -> Result<()> {
    if len != vertex_count * components {
        return Err(violated(format!(
            "{attribute} array length {len} does not match {vertex_count} vertices x {components}"
        )));
    }
    Ok(())
}

fn violated(message: String) -> RawgdError {
    RawgdError::PreconditionViolated(message)
}

/// Decoder output: the geometry plus the version byte it was stored with
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGeometry {
    pub version: FormatVersion,
    pub geometry: Geometry,
}

impl DecodedGeometry {
    /// RGB colors, if the buffer stored RGB565
    pub fn colors_rgb(&self) -> Option<&[f32]> {
        match self.geometry.colors() {
            Some(VertexColors::Rgb(data)) => Some(data),
            _ => None,
        }
    }

    /// RGBA colors, if the buffer stored RGBA5551
    pub fn colors_rgba(&self) -> Option<&[f32]> {
        match self.geometry.colors() {
            Some(VertexColors::Rgba(data)) => Some(data),
            _ => None,
        }
    }
}
