//! Attribute quantization for the RAWGD container
//!
//! Every vertex attribute is stored in 16 or 8 bits:
//! - f32 → f16 (IEEE 754 half-float, truncating)
//! - unit vector → 2 × u8 (octahedral)
//! - f32 → snorm16 (UV, `floor(v * 32767)`)
//! - RGB → RGB565, RGBA → RGBA5551
//!
//! All functions are pure and allocation-free.

use glam::Vec3;
use half::f16;
use std::fmt;

// ============================================================================
// Half-Float (f16) Conversion
// ============================================================================

/// Convert f32 to f16 bits, truncating the low mantissa bits
///
/// Unlike `half::f16::from_f32` this never rounds: the 13 low mantissa bits
/// are dropped. Any rebiased exponent of 31 or more saturates to ±infinity,
/// which includes NaN input. Values below the smallest half subnormal flush
/// to signed zero.
#[inline]
pub fn f32_to_f16(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let raw_exponent = ((bits >> 23) & 0xFF) as i32;
    let mantissa = bits & 0x007F_FFFF;

    // Rebias from 8-bit/127 to 5-bit/15
    let exponent = raw_exponent - 127 + 15;

    if exponent >= 0x1F {
        return sign | 0x7C00;
    }

    if exponent <= 0 {
        // Subnormal half: shift the mantissa (with its implicit 1) into place
        let shift = (1 - exponent) as u32;
        if shift > 24 {
            return sign;
        }
        let subnormal = (mantissa | 0x0080_0000) >> shift;
        return sign | (subnormal >> 13) as u16;
    }

    sign | ((exponent as u16) << 10) | (mantissa >> 13) as u16
}

/// Convert f16 bits to f32
///
/// Exact widening: every half value (subnormals included) is representable as f32.
#[inline]
pub fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

// ============================================================================
// Normal Packing (octahedral, 2 × u8)
// ============================================================================

#[inline]
fn sign_not_zero(v: f32) -> f32 {
    if v >= 0.0 { 1.0 } else { -1.0 }
}

/// Encode a direction to octahedral coordinates in [-1, 1]²
///
/// The input is L1-normalized only; callers are expected to pass unit vectors.
/// A zero vector maps to the centre of the octahedron.
#[inline]
pub fn encode_octahedral(dir: Vec3) -> (f32, f32) {
    let l1_norm = dir.x.abs() + dir.y.abs() + dir.z.abs();
    if l1_norm == 0.0 {
        return (0.0, 0.0);
    }

    let mut u = dir.x / l1_norm;
    let mut v = dir.y / l1_norm;

    // Fold the lower hemisphere over the diagonals
    if dir.z < 0.0 {
        let u_abs = u.abs();
        let v_abs = v.abs();
        u = (1.0 - v_abs) * sign_not_zero(u);
        v = (1.0 - u_abs) * sign_not_zero(v);
    }

    (u, v)
}

/// Decode octahedral coordinates in [-1, 1]² back to a unit direction
///
/// Lower-hemisphere coordinates unfold to a direction with negative z.
#[inline]
pub fn decode_octahedral(u: f32, v: f32) -> Vec3 {
    let mut dir = Vec3::new(u, v, 1.0 - u.abs() - v.abs());

    if dir.z < 0.0 {
        let old_x = dir.x;
        dir.x = (1.0 - dir.y.abs()) * sign_not_zero(old_x);
        dir.y = (1.0 - old_x.abs()) * sign_not_zero(dir.y);
    }

    dir.normalize_or_zero()
}

#[inline]
fn snorm_to_u8(v: f32) -> u8 {
    ((v * 0.5 + 0.5) * 255.0).round() as u8
}

#[inline]
fn u8_to_snorm(v: u8) -> f32 {
    v as f32 / 255.0 * 2.0 - 1.0
}

/// Pack a unit normal into two bytes using octahedral encoding
#[inline]
pub fn pack_normal_oct8(nx: f32, ny: f32, nz: f32) -> [u8; 2] {
    let (u, v) = encode_octahedral(Vec3::new(nx, ny, nz));
    [snorm_to_u8(u), snorm_to_u8(v)]
}

/// Unpack two octahedral bytes to a unit normal
#[inline]
pub fn unpack_normal_oct8(packed: [u8; 2]) -> Vec3 {
    decode_octahedral(u8_to_snorm(packed[0]), u8_to_snorm(packed[1]))
}

// ============================================================================
// UV Packing
// ============================================================================

/// Scale shared by UV packing and unpacking
pub const UV_SCALE: f32 = 32767.0;

/// Pack a UV component to snorm16 with `floor(v * 32767)`
///
/// Truncates toward negative infinity; values outside [-1, 1] saturate.
#[inline]
pub fn pack_uv_snorm16(value: f32) -> i16 {
    (value * UV_SCALE).floor() as i16
}

/// Unpack a snorm16 UV component
#[inline]
pub fn unpack_uv_snorm16(value: i16) -> f32 {
    value as f32 / UV_SCALE
}

// ============================================================================
// Color Packing
// ============================================================================

#[inline]
fn quantize_channel(value: f32, max: u16) -> u16 {
    (value.clamp(0.0, 1.0) * max as f32).round() as u16
}

/// Pack an RGB color (f32x3) to RGB565
#[inline]
pub fn pack_rgb565(r: f32, g: f32, b: f32) -> u16 {
    (quantize_channel(r, 31) << 11) | (quantize_channel(g, 63) << 5) | quantize_channel(b, 31)
}

/// Unpack RGB565 to an RGB color (f32x3)
#[inline]
pub fn unpack_rgb565(packed: u16) -> [f32; 3] {
    [
        ((packed >> 11) & 0x1F) as f32 / 31.0,
        ((packed >> 5) & 0x3F) as f32 / 63.0,
        (packed & 0x1F) as f32 / 31.0,
    ]
}

/// Pack an RGBA color (f32x4) to RGBA5551
///
/// Alpha is a hard threshold: only values strictly above 0.5 are opaque.
#[inline]
pub fn pack_rgba5551(r: f32, g: f32, b: f32, a: f32) -> u16 {
    (quantize_channel(r, 31) << 11)
        | (quantize_channel(g, 31) << 6)
        | (quantize_channel(b, 31) << 1)
        | u16::from(a > 0.5)
}

/// Unpack RGBA5551 to an RGBA color (f32x4), alpha is exactly 0.0 or 1.0
#[inline]
pub fn unpack_rgba5551(packed: u16) -> [f32; 4] {
    [
        ((packed >> 11) & 0x1F) as f32 / 31.0,
        ((packed >> 6) & 0x1F) as f32 / 31.0,
        ((packed >> 1) & 0x1F) as f32 / 31.0,
        (packed & 0x1) as f32,
    ]
}

// ============================================================================
// Version Byte
// ============================================================================

/// Format version stored as two nibbles: `(major << 4) | minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatVersion {
    pub major: u8,
    pub minor: u8,
}

impl FormatVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Pack into a single byte. Fields above 15 are not checked.
    pub const fn to_byte(self) -> u8 {
        (self.major << 4) | (self.minor & 0x0F)
    }

    pub const fn from_byte(byte: u8) -> Self {
        Self {
            major: byte >> 4,
            minor: byte & 0x0F,
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f16_special_values() {
        assert_eq!(f32_to_f16(0.0), 0x0000);
        assert_eq!(f32_to_f16(-0.0), 0x8000);
        assert_eq!(f32_to_f16(1.0), 0x3C00);
        assert_eq!(f32_to_f16(-2.0), 0xC000);
        assert_eq!(f32_to_f16(f32::INFINITY), 0x7C00);
        assert_eq!(f32_to_f16(f32::NEG_INFINITY), 0xFC00);
    }

    #[test]
    fn test_f16_known_value() {
        let value = f16_to_f32(15923);
        assert_eq!(value, 1.5498046875);
        assert_eq!(f32_to_f16(value), 15923);
    }

    #[test]
    fn test_f16_overflow_saturates_to_infinity() {
        assert_eq!(f32_to_f16(65536.0), 0x7C00);
        assert_eq!(f32_to_f16(-1.0e10), 0xFC00);
        assert_eq!(f32_to_f16(f32::MAX), 0x7C00);
    }

    #[test]
    fn test_f16_underflow_flushes_to_signed_zero() {
        assert_eq!(f32_to_f16(1.0e-10), 0x0000);
        assert_eq!(f32_to_f16(-1.0e-10), 0x8000);
        assert_eq!(f32_to_f16(f32::MIN_POSITIVE), 0x0000);
    }

    #[test]
    fn test_f16_subnormals() {
        // Smallest and largest half subnormals
        assert_eq!(f32_to_f16(2.0f32.powi(-24)), 0x0001);
        assert_eq!(f32_to_f16(1023.0 * 2.0f32.powi(-24)), 0x03FF);
        assert_eq!(f16_to_f32(0x0001), 2.0f32.powi(-24));
    }

    #[test]
    fn test_f16_truncates_instead_of_rounding() {
        // 1 + 2^-10 - 2^-12 is closer to 1 + 2^-10, but truncation keeps 1.0
        let value = 1.0 + 2.0f32.powi(-10) - 2.0f32.powi(-12);
        assert_eq!(f32_to_f16(value), 0x3C00);
        assert_eq!(f16::from_f32(value).to_bits(), 0x3C01);
    }

    #[test]
    fn test_f16_nan_encodes_as_infinity() {
        assert_eq!(f32_to_f16(f32::NAN), 0x7C00);
        assert_eq!(f32_to_f16(-f32::NAN), 0xFC00);
        assert_eq!(f32_to_f16(f32::from_bits(0x7F80_0001)), 0x7C00);
        // Decoding still widens half NaN patterns from other encoders
        assert!(f16_to_f32(0x7E00).is_nan());
        assert_eq!(f16_to_f32(0x7C00), f32::INFINITY);
    }

    #[test]
    fn test_f16_roundtrip_all_representable_values() {
        for bits in 0..=u16::MAX {
            let value = f16_to_f32(bits);
            if value.is_nan() {
                continue;
            }
            assert_eq!(value, f16::from_bits(bits).to_f32());
            assert_eq!(f32_to_f16(value), bits, "roundtrip failed for {bits:#06x}");
        }
    }

    #[test]
    fn test_oct8_axis_encodings() {
        assert_eq!(pack_normal_oct8(0.0, 1.0, 0.0), [128, 255]);
        assert_eq!(pack_normal_oct8(0.0, -1.0, 0.0), [128, 0]);
        assert_eq!(pack_normal_oct8(0.0, 0.0, -1.0), [255, 255]);
        assert_eq!(pack_normal_oct8(0.0, 0.0, 0.0), [128, 128]);
    }

    #[test]
    fn test_oct8_roundtrip() {
        let test_dirs = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.577, 0.577, 0.577),
            Vec3::new(-0.3, 0.4, -0.8),
        ];

        for dir in test_dirs {
            let normalized = dir.normalize();
            let packed = pack_normal_oct8(normalized.x, normalized.y, normalized.z);
            let decoded = unpack_normal_oct8(packed);
            assert!(
                (decoded - normalized).abs().max_element() < 0.02,
                "Roundtrip failed for {:?}: got {:?}",
                normalized,
                decoded
            );
            assert!((decoded.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_octahedral_lower_hemisphere_keeps_negative_z() {
        assert_eq!(decode_octahedral(1.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let dir = decode_octahedral(0.9, 0.5);
        assert!(dir.z < 0.0, "expected negative z, got {dir:?}");
    }

    #[test]
    fn test_oct8_diagonal_within_tolerance() {
        let v = Vec3::new(0.577, 0.577, 0.577).normalize();
        let decoded = unpack_normal_oct8(pack_normal_oct8(v.x, v.y, v.z));
        assert!((decoded.x - v.x).abs() < 0.01);
        assert!((decoded.y - v.y).abs() < 0.01);
        assert!((decoded.z - v.z).abs() < 0.01);
    }

    #[test]
    fn test_uv_snorm16_floor() {
        assert_eq!(pack_uv_snorm16(0.0), 0);
        assert_eq!(pack_uv_snorm16(1.0), 32767);
        assert_eq!(pack_uv_snorm16(-1.0), -32767);
        // floor, not round
        assert_eq!(pack_uv_snorm16(0.99999), 32766);
        assert_eq!(pack_uv_snorm16(-0.00001), -1);
        assert_eq!(unpack_uv_snorm16(32767), 1.0);
    }

    #[test]
    fn test_rgb565_exact() {
        assert_eq!(pack_rgb565(1.0, 0.0, 0.0), 0xF800);
        assert_eq!(pack_rgb565(0.0, 1.0, 0.0), 0x07E0);
        assert_eq!(pack_rgb565(0.0, 0.0, 1.0), 0x001F);
        assert_eq!(unpack_rgb565(0xFFFF), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rgba5551_exact() {
        assert_eq!(pack_rgba5551(1.0, 0.0, 0.0, 1.0), 0xF801);
        assert_eq!(pack_rgba5551(0.0, 1.0, 0.0, 0.0), 0x07C0);
        assert_eq!(pack_rgba5551(0.0, 0.0, 1.0, 0.0), 0x003E);
    }

    #[test]
    fn test_rgba5551_alpha_threshold() {
        assert_eq!(pack_rgba5551(0.0, 0.0, 0.0, 0.5) & 1, 0);
        assert_eq!(pack_rgba5551(0.0, 0.0, 0.0, 0.51) & 1, 1);
        assert_eq!(unpack_rgba5551(0x0001)[3], 1.0);
        assert_eq!(unpack_rgba5551(0x0000)[3], 0.0);
    }

    #[test]
    fn test_color_roundtrip() {
        let [r, g, b] = unpack_rgb565(pack_rgb565(0.5, 0.7, 0.9));
        assert!((r - 0.5).abs() < 0.05);
        assert!((g - 0.7).abs() < 0.05);
        assert!((b - 0.9).abs() < 0.05);

        let [r, g, b, a] = unpack_rgba5551(pack_rgba5551(0.5, 0.7, 0.9, 0.8));
        assert!((r - 0.5).abs() < 0.05);
        assert!((g - 0.7).abs() < 0.05);
        assert!((b - 0.9).abs() < 0.05);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn test_color_channels_clamped() {
        assert_eq!(pack_rgb565(2.0, -1.0, 0.0), 0xF800);
    }

    #[test]
    fn test_version_byte() {
        let version = FormatVersion::new(1, 2);
        assert_eq!(version.to_byte(), 0x12);
        assert_eq!(FormatVersion::from_byte(0x12), version);
        assert_eq!(FormatVersion::from_byte(0xF0), FormatVersion::new(15, 0));
        assert_eq!(version.to_string(), "1.2");
    }
}
