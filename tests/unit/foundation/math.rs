use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn premul_then_unpremul_is_stable_for_opaque_and_clear() {
    assert_eq!(premul_rgba8([10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(unpremul_rgba8([10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(unpremul_rgba8([10, 20, 30, 0]), [0, 0, 0, 0]);
}

#[test]
fn unpremul_recovers_half_alpha_color() {
    let p = premul_rgba8([200, 100, 0, 128]);
    let u = unpremul_rgba8(p);
    assert!((i32::from(u[0]) - 200).abs() <= 1);
    assert!((i32::from(u[1]) - 100).abs() <= 1);
    assert_eq!(u[3], 128);
}

#[test]
fn div255_saturates() {
    assert_eq!(div255(255 * 255), 255);
    assert_eq!(div255(255 * 300), 255);
    assert_eq!(div255(0), 0);
}
