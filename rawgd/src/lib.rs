//! RAWGD: compact binary container for mesh geometry
//!
//! Trades precision for size by storing every vertex attribute in 16 or 8 bits:
//!
//! | Attribute | Input | Stored as |
//! |-----------|-------|-----------|
//! | Position | f32x3 | 3 × f16 (truncated) |
//! | Index | u16 | u16, verbatim |
//! | Normal | f32x3 (unit) | 2 × u8 octahedral |
//! | UV | f32x2 | 2 × i16, `floor(v * 32767)` |
//! | Color | f32x3 / f32x4 | RGB565 / RGBA5551 |
//!
//! Encoding and decoding are pure functions over in-memory buffers: no I/O,
//! no global state, safe to call from any number of threads.
//!
//! # Modules
//!
//! - [`packing`] - Attribute quantization (f16, octahedral, snorm16, 565/5551, version byte)
//! - [`format`] - Magic, flags and the fixed 9-byte header
//! - [`geometry`] - Validated geometry record and builder
//!
//! # Usage
//!
//! ```
//! use rawgd::{Geometry, decode, encode};
//!
//! let geometry = Geometry::builder(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
//!     .indices(vec![0, 1, 2])
//!     .colors(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
//!     .build()
//!     .unwrap();
//!
//! let bytes = encode(&geometry);
//! let decoded = decode(&bytes).unwrap();
//! assert_eq!(decoded.geometry.indices(), Some(&[0, 1, 2][..]));
//! assert!(decoded.colors_rgb().is_some());
//! ```

mod decode;
mod encode;
mod error;
pub mod format;
pub mod geometry;
pub mod packing;

pub use decode::{decode, read_header};
pub use encode::{encode, encoded_len, flags_for};
pub use error::{RawgdError, Result};

// Re-export commonly used format items
pub use format::{
    FLAG_INDICES, FLAG_NORMALS, FLAG_RGB565, FLAG_RGBA5551, FLAG_UVS, RAWGD_EXT, RAWGD_MAGIC,
    RAWGD_VERSION, RawgdHeader,
};
pub use geometry::{DecodedGeometry, Geometry, GeometryBuilder, VertexColors};
pub use packing::{
    FormatVersion, f16_to_f32, f32_to_f16, pack_normal_oct8, pack_rgb565, pack_rgba5551,
    unpack_normal_oct8, unpack_rgb565, unpack_rgba5551,
};
