pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Round a time value to hundredths, the precision caption edits are stored at.
pub(crate) fn round_centis(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
