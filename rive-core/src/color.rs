//! Packed `0xAARRGGBB` colors.

#![allow(clippy::cast_possible_truncation)]

/// A color packed as `0xAARRGGBB`.
pub type ColorInt = u32;

/// Pack the four channels.
#[must_use]
pub fn color_argb(a: u8, r: u8, g: u8, b: u8) -> ColorInt {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Alpha channel.
#[must_use]
pub fn color_alpha(color: ColorInt) -> u8 {
    (color >> 24) as u8
}

/// Red channel.
#[must_use]
pub fn color_red(color: ColorInt) -> u8 {
    (color >> 16) as u8
}

/// Green channel.
#[must_use]
pub fn color_green(color: ColorInt) -> u8 {
    (color >> 8) as u8
}

/// Blue channel.
#[must_use]
pub fn color_blue(color: ColorInt) -> u8 {
    color as u8
}

/// Multiply the alpha channel by `opacity` (clamped to `0..=1`).
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn color_modulate_opacity(color: ColorInt, opacity: f32) -> ColorInt {
    let alpha = f32::from(color_alpha(color)) * opacity.clamp(0.0, 1.0);
    let alpha = alpha.round().clamp(0.0, 255.0) as u8;
    color_argb(alpha, color_red(color), color_green(color), color_blue(color))
}

/// Channels as normalized `[r, g, b, a]`.
#[must_use]
pub fn color_to_rgba_f32(color: ColorInt) -> [f32; 4] {
    [
        f32::from(color_red(color)) / 255.0,
        f32::from(color_green(color)) / 255.0,
        f32::from(color_blue(color)) / 255.0,
        f32::from(color_alpha(color)) / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let c = color_argb(0x80, 0x10, 0x20, 0x30);
        assert_eq!(c, 0x8010_2030);
        assert_eq!(color_alpha(c), 0x80);
        assert_eq!(color_red(c), 0x10);
        assert_eq!(color_green(c), 0x20);
        assert_eq!(color_blue(c), 0x30);
    }

    #[test]
    fn test_modulate_keeps_rgb() {
        let c = color_modulate_opacity(0xFF33_6699, 0.5);
        assert_eq!(color_alpha(c), 128);
        assert_eq!(c & 0x00FF_FFFF, 0x0033_6699);
    }
}
