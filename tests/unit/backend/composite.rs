use super::*;
use crate::render::bitmap::Bitmap;

const GREEN: RenderColor = RenderColor::rgba(0, 200, 0, 255);

#[test]
fn opaque_alpha_keeps_source() {
    let src = Bitmap::solid(2, 2, GREEN);
    let alpha = Bitmap::from_gray8(2, 2, &[0, 0, 0, 0]).unwrap();
    let out = with_alpha(&src, Some(&alpha)).unwrap();
    assert_eq!(out.premul(1, 1), [0, 200, 0, 255]);
}

#[test]
fn transparent_alpha_clears_source() {
    let src = Bitmap::solid(2, 2, GREEN);
    let alpha = Bitmap::from_gray8(2, 2, &[255, 255, 0, 255]).unwrap();
    let out = with_alpha(&src, Some(&alpha)).unwrap();
    assert_eq!(out.premul(0, 0), [0, 0, 0, 0]);
    assert_eq!(out.premul(0, 1), [0, 200, 0, 255]);
}

#[test]
fn missing_alpha_is_plain_copy() {
    let src = Bitmap::solid(1, 1, GREEN);
    assert_eq!(with_alpha(&src, None).unwrap().premul(0, 0), [0, 200, 0, 255]);
}

#[test]
fn mask_color_fills_where_mask_is_black() {
    let mask = Bitmap::from_gray8(2, 1, &[0, 255]).unwrap();
    let out = colorized_mask(&mask, RenderColor::rgba(9, 9, 9, 255)).unwrap();
    assert_eq!(out.premul(0, 0), [9, 9, 9, 255]);
    assert_eq!(out.premul(1, 0), [0, 0, 0, 0]);
}

#[test]
fn mask_and_alpha_combination() {
    let src = Bitmap::solid(2, 1, GREEN);
    // mask opaque-black first pixel (keeps source), fully transparent second pixel.
    let mask = Bitmap::from_gray8(2, 1, &[0, 255]).unwrap();
    let alpha = Bitmap::from_gray8(2, 1, &[0, 0]).unwrap();
    let out = with_mask_and_alpha(&src, &mask, &alpha).unwrap();
    assert_eq!(out.premul(0, 0), [0, 200, 0, 255]);
    assert_eq!(out.premul(1, 0), [0, 0, 0, 0]);
}
