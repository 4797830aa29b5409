//! rawgd-export library
//!
//! Provides mesh conversion and inspection functions for use by other tools.

pub mod inspect;
pub mod mesh;

// Re-export key types for mesh conversion
pub use inspect::{MeshInfo, dump_file, inspect_file};
pub use mesh::{GeometryDocument, convert_mesh, load_geometry};
