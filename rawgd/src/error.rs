//! Error type for RAWGD encoding and decoding

use thiserror::Error;

/// Errors produced by the RAWGD codec.
///
/// The codec never logs and never returns partial output: every failure is
/// reported to the immediate caller before a geometry record exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawgdError {
    /// The buffer does not start with the `RAWGD` magic bytes.
    #[error("not a RAWGD buffer: magic byte {index} is {found:#04x}, expected {expected:#04x}")]
    FormatInvalid { index: usize, found: u8, expected: u8 },

    /// A read ran past the end of the buffer.
    #[error(
        "truncated RAWGD buffer: {section} needs {needed} bytes at offset {offset}, only {available} available"
    )]
    Truncated {
        section: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Geometry attribute lengths do not fit the vertex count or the u16 count fields.
    #[error("invalid geometry: {0}")]
    PreconditionViolated(String),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, RawgdError>;
