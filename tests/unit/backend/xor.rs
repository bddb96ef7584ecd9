use super::*;
use crate::paint::color::RenderColor;

fn surface() -> RasterCanvas {
    let mut c = RasterCanvas::new(16, 16).unwrap();
    c.clear(RenderColor::rgba(10, 20, 30, 255));
    c.save();
    c
}

fn full_region() -> Region {
    Region::from_rect(IntRect::new(0, 0, 16, 16))
}

fn draw_red_square(xor: &mut XorEmulator) {
    let canvas = xor.session_canvas(16, 16, &full_region()).unwrap();
    canvas.draw_rect(
        Rect::new(4.0, 4.0, 8.0, 8.0),
        &Paint::fill(RenderColor::rgba(255, 0, 0, 255)).with_anti_alias(false),
    );
    xor.extend(Rect::new(4.0, 4.0, 8.0, 8.0));
}

#[test]
fn xor_twice_restores_pixels() {
    let mut target = surface();
    let before = target.pixels().clone();
    let mut xor = XorEmulator::default();
    xor.set_enabled(true);

    draw_red_square(&mut xor);
    xor.apply(&mut target);
    assert_eq!(target.pixels().premul(5, 5), [255 ^ 10, 20, 30, 255]);
    assert_eq!(target.pixels().premul(0, 0), [10, 20, 30, 255]);
    assert!(xor.is_idle());
    assert!(!xor.has_session());

    draw_red_square(&mut xor);
    xor.apply(&mut target);
    assert_eq!(target.pixels(), &before);
}

#[test]
fn extents_only_grow_while_enabled() {
    let mut xor = XorEmulator::default();
    xor.extend(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert!(xor.is_idle());

    xor.set_enabled(true);
    xor.extend(Rect::new(0.0, 0.0, 1.0, 1.0));
    xor.extend(Rect::new(5.0, 5.0, 3.0, 3.0));
    assert_eq!(xor.extents, Some(Rect::new(0.0, 0.0, 5.0, 5.0)));

    xor.set_enabled(false);
    assert!(xor.is_idle());
}

#[test]
fn session_respects_clip_region() {
    let mut target = surface();
    let mut xor = XorEmulator::default();
    xor.set_enabled(true);
    let region = Region::from_rect(IntRect::new(0, 0, 6, 16));
    let canvas = xor.session_canvas(16, 16, &region).unwrap();
    canvas.draw_rect(
        Rect::new(4.0, 4.0, 8.0, 8.0),
        &Paint::fill(RenderColor::rgba(255, 0, 0, 255)),
    );
    xor.apply(&mut target);
    assert_eq!(target.pixels().premul(5, 5), [255 ^ 10, 20, 30, 255]);
    assert_eq!(target.pixels().premul(7, 7), [10, 20, 30, 255]);
}
