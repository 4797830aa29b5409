//! OBJ mesh conversion

use anyhow::{Context, Result, bail};
use rawgd::Geometry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::MAX_VERTEX_COUNT;

/// Corner of a face: position, optional texcoord, optional normal (0-based)
type FaceVertex = (usize, Option<usize>, Option<usize>);

/// Load an OBJ file as RAWGD geometry
pub fn load_obj(input: &Path) -> Result<Geometry> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    parse_obj(BufReader::new(file)).with_context(|| format!("Failed to parse OBJ: {:?}", input))
}

/// Parse OBJ text into geometry
///
/// Faces are fan-triangulated and expanded so every corner becomes its own
/// vertex, with a sequential index list. Supports `v x y z [r g b]`, `vt`,
/// `vn` and `f` with `v`, `v/vt`, `v/vt/vn`, `v//vn` references, including
/// negative (relative) indices. UVs, normals and colors are only emitted when
/// every corner has them.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<Geometry> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut position_colors: Vec<Option<[f32; 3]>> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals_raw: Vec<[f32; 3]> = Vec::new();

    // Final vertex data (expanded from faces)
    let mut final_positions: Vec<f32> = Vec::new();
    let mut final_uvs: Vec<f32> = Vec::new();
    let mut final_normals: Vec<f32> = Vec::new();
    let mut final_colors: Vec<f32> = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    let mut corners = 0usize;
    let mut corners_with_uv = 0usize;
    let mut corners_with_normal = 0usize;
    let mut corners_with_color = 0usize;

    for (line_idx, line) in reader.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "v" if parts.len() >= 4 => {
                let p = parse_floats::<3>(&parts[1..4], line_no)?;
                positions.push(p);
                // Vertex color extension: v x y z r g b
                let color = if parts.len() >= 7 {
                    Some(parse_floats::<3>(&parts[4..7], line_no)?)
                } else {
                    None
                };
                position_colors.push(color);
            }
            "vt" if parts.len() >= 3 => {
                tex_coords.push(parse_floats::<2>(&parts[1..3], line_no)?);
            }
            "vn" if parts.len() >= 4 => {
                normals_raw.push(parse_floats::<3>(&parts[1..4], line_no)?);
            }
            "f" if parts.len() >= 4 => {
                let face_verts = parts[1..]
                    .iter()
                    .map(|v| {
                        parse_obj_vertex(v, positions.len(), tex_coords.len(), normals_raw.len())
                            .with_context(|| format!("line {line_no}: invalid face vertex '{v}'"))
                    })
                    .collect::<Result<Vec<FaceVertex>>>()?;

                // Fan triangulation for convex polygons
                for i in 1..face_verts.len() - 1 {
                    for &idx in &[0, i, i + 1] {
                        let (vi, vti, vni) = face_verts[idx];

                        if corners >= MAX_VERTEX_COUNT {
                            bail!(
                                "OBJ mesh expands to more than {} vertices. \
                                Split the mesh into smaller parts.",
                                MAX_VERTEX_COUNT
                            );
                        }
                        indices.push(corners as u16);
                        corners += 1;

                        final_positions.extend_from_slice(&positions[vi]);

                        if let Some(ti) = vti {
                            final_uvs.extend_from_slice(&tex_coords[ti]);
                            corners_with_uv += 1;
                        }
                        if let Some(ni) = vni {
                            final_normals.extend_from_slice(&normalize(normals_raw[ni]));
                            corners_with_normal += 1;
                        }
                        if let Some(color) = position_colors[vi] {
                            final_colors.extend_from_slice(&color);
                            corners_with_color += 1;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if corners == 0 {
        bail!("No faces found in OBJ file");
    }

    let mut builder = Geometry::builder(final_positions).indices(indices);
    if corners_with_uv == corners {
        builder = builder.uvs(final_uvs);
    } else if corners_with_uv > 0 {
        tracing::warn!("Dropping UVs: only {corners_with_uv} of {corners} face corners have one");
    }
    if corners_with_normal == corners {
        builder = builder.normals(final_normals);
    } else if corners_with_normal > 0 {
        tracing::warn!(
            "Dropping normals: only {corners_with_normal} of {corners} face corners have one"
        );
    }
    if corners_with_color == corners {
        builder = builder.colors_rgb(final_colors);
    } else if corners_with_color > 0 {
        tracing::warn!(
            "Dropping colors: only {corners_with_color} of {corners} face corners have one"
        );
    }

    Ok(builder.build()?)
}

fn parse_floats<const N: usize>(parts: &[&str], line_no: usize) -> Result<[f32; N]> {
    let mut out = [0.0f32; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .with_context(|| format!("line {line_no}: invalid number '{part}'"))?;
    }
    Ok(out)
}

/// Resolve a 1-based or negative (relative) OBJ index against `count` elements
fn resolve_index(s: &str, count: usize) -> Option<usize> {
    let raw: i64 = s.parse().ok()?;
    let index = if raw > 0 {
        raw as usize - 1
    } else if raw < 0 {
        count.checked_sub(raw.unsigned_abs() as usize)?
    } else {
        return None;
    };
    (index < count).then_some(index)
}

/// Parse OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
fn parse_obj_vertex(
    s: &str,
    position_count: usize,
    tex_count: usize,
    normal_count: usize,
) -> Option<FaceVertex> {
    let parts: Vec<&str> = s.split('/').collect();

    let vi = resolve_index(parts.first()?, position_count)?;

    let vti = match parts.get(1).filter(|s| !s.is_empty()) {
        Some(s) => Some(resolve_index(s, tex_count)?),
        None => None,
    };

    let vni = match parts.get(2).filter(|s| !s.is_empty()) {
        Some(s) => Some(resolve_index(s, normal_count)?),
        None => None,
    };

    Some((vi, vti, vni))
}

fn normalize(n: [f32; 3]) -> [f32; 3] {
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len == 0.0 {
        return [0.0, 0.0, 1.0];
    }
    [n[0] / len, n[1] / len, n[2] / len]
}
