pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Convert a `[0, 1]` alpha into an 8-bit channel, clamping out-of-range input.
pub(crate) fn alpha_to_u8(alpha: f32) -> u8 {
    if !alpha.is_finite() {
        return 0;
    }
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}
