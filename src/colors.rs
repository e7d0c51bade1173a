//! Packed ARGB8888 color helpers.
//!
//! Pixels are stored as `0xAARRGGBB` words. Shading math works in linear
//! `[0, 1]` floats held in a [`Vec3`] and is packed at the very end.

use crate::math::Vec3;

/// Default clear color of the back buffer.
pub const BACKGROUND: u32 = 0xFF1E_1E1E;
/// Wireframe overlay color.
pub const WIREFRAME: u32 = 0xFFFF_0000;
pub const WHITE: u32 = 0xFFFF_FFFF;
pub const BLACK: u32 = 0xFF00_0000;

/// Packs `[0, 1]` channels into an opaque ARGB word. Out-of-range input is
/// clamped.
#[inline]
pub fn pack_color(color: Vec3) -> u32 {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
    0xFF00_0000 | (to_byte(color.x) << 16) | (to_byte(color.y) << 8) | to_byte(color.z)
}

/// Unpacks the RGB channels of an ARGB word into `[0, 1]` floats.
#[inline]
pub fn unpack_color(color: u32) -> Vec3 {
    let [_, r, g, b] = color.to_be_bytes();
    Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

/// Builds an opaque ARGB word from 8-bit channels.
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_clamps_and_rounds() {
        assert_eq!(pack_color(Vec3::new(2.0, -1.0, 0.5)), 0xFFFF_0080);
    }

    #[test]
    fn unpack_inverts_pack_for_bytes() {
        let c = rgb(12, 200, 255);
        assert_eq!(pack_color(unpack_color(c)), c);
    }
}
