use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];
const WHITE: [u8; 4] = [255, 255, 255, 255];

#[test]
fn src_over_opaque_replaces() {
    assert_eq!(blend(BlendMode::SrcOver, RED, BLUE), RED);
    assert_eq!(blend(BlendMode::SrcOver, CLEAR, BLUE), BLUE);
}

#[test]
fn src_over_half_alpha_mixes() {
    let half_red = [128, 0, 0, 128];
    let out = blend(BlendMode::SrcOver, half_red, BLUE);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[2], 127);
}

#[test]
fn dst_out_with_opaque_source_clears() {
    assert_eq!(blend(BlendMode::DstOut, WHITE, BLUE), CLEAR);
    assert_eq!(blend(BlendMode::DstOut, CLEAR, BLUE), BLUE);
}

#[test]
fn src_out_keeps_source_only_over_clear() {
    assert_eq!(blend(BlendMode::SrcOut, RED, CLEAR), RED);
    assert_eq!(blend(BlendMode::SrcOut, RED, BLUE), CLEAR);
}

#[test]
fn multiply_with_white_is_identity() {
    let c = [40, 80, 120, 255];
    assert_eq!(blend(BlendMode::Multiply, WHITE, c), c);
    assert_eq!(blend(BlendMode::Multiply, c, WHITE), c);
}

#[test]
fn difference_with_white_inverts_opaque_colors() {
    let c = [40, 80, 120, 255];
    assert_eq!(blend(BlendMode::Difference, WHITE, c), [215, 175, 135, 255]);
    let twice = blend(
        BlendMode::Difference,
        WHITE,
        blend(BlendMode::Difference, WHITE, c),
    );
    assert_eq!(twice, c);
}

#[test]
fn composite_respects_coverage() {
    assert_eq!(composite(BlendMode::Src, RED, BLUE, 0), BLUE);
    assert_eq!(composite(BlendMode::Src, RED, BLUE, 255), RED);
    let mid = composite(BlendMode::Src, RED, BLUE, 128);
    assert_eq!(mid[0], 128);
    assert_eq!(mid[2], 127);
    assert_eq!(mid[3], 255);
}
