pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u8, y: u8) -> u8 {
    mul_div255_u16(u16::from(x), u16::from(y)) as u8
}

/// Rounded `x / 255`, saturated to `u8`.
pub(crate) fn div255(x: u32) -> u8 {
    ((x + 127) / 255).min(255) as u8
}

pub(crate) fn premul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    [
        mul_div255_u8(r, a),
        mul_div255_u8(g, a),
        mul_div255_u8(b, a),
        a,
    ]
}

pub(crate) fn unpremul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return rgba;
    }
    let a32 = u32::from(a);
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a32 / 2) / a32).min(255) as u8 };
    [un(r), un(g), un(b), a]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
