use super::*;
use crate::backend::headless::{HeadlessPlatform, HeadlessWindow, ManualEventLoop};

const RED: Color = Color::rgb(255, 0, 0);

fn backend_for(window: Rc<HeadlessWindow>, opts: GraphicsOpts) -> GraphicsBackend {
    let env = BackendEnv {
        config: Arc::new(RenderConfig::new(RenderMethod::Raster)),
        platform: Rc::new(HeadlessPlatform::new()),
        event_loop: Rc::new(ManualEventLoop::new()),
    };
    GraphicsBackend::new(&env, window, opts)
}

fn offscreen(width: u32, height: u32) -> GraphicsBackend {
    backend_for(HeadlessWindow::offscreen(width, height), GraphicsOpts::default())
}

fn paint_background(gfx: &mut GraphicsBackend, color: Color) {
    let (w, h) = (gfx.graphics_width() as i32, gfx.geometry.height() as i32);
    gfx.set_line_color(None);
    gfx.set_fill_color(Some(color));
    gfx.draw_rect(0, 0, w, h);
}

#[test]
fn stroke_offset_depends_on_surface_tier() {
    assert_eq!(stroke_offset(RenderMethod::Raster), 0.25);
    assert_eq!(stroke_offset(RenderMethod::Gpu), 0.5);
}

#[test]
fn checker_tile_alternates_two_by_two_cells() {
    let tile = checker_tile();
    let white = [255, 255, 255, 255];
    let black = [0, 0, 0, 255];
    assert_eq!(tile.premul(0, 0), white);
    assert_eq!(tile.premul(1, 1), white);
    assert_eq!(tile.premul(2, 0), black);
    assert_eq!(tile.premul(0, 2), black);
    assert_eq!(tile.premul(3, 3), white);
}

#[test]
fn surface_is_created_lazily() {
    let mut gfx = offscreen(8, 8);
    assert!(gfx.surface_stats().is_none());
    gfx.init();
    assert_eq!(gfx.surface_size(), Some((8, 8)));
    assert_eq!(gfx.surface_save_count(), Some(2));
}

#[test]
fn fresh_backend_has_no_colors_and_draws_nothing() {
    let mut gfx = offscreen(12, 12);
    assert_eq!((gfx.line_color, gfx.fill_color), (None, None));
    gfx.init();
    let stats = gfx.surface_stats();

    gfx.draw_rect(2, 2, 8, 8);
    gfx.draw_line(0, 0, 11, 11);
    gfx.draw_pixel(3, 3);
    gfx.draw_polygon(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)]);

    assert_eq!(gfx.surface_stats(), stats);
    assert_eq!(gfx.get_pixel(5, 5), gfx.get_pixel(0, 0));
}

#[test]
fn draw_rect_fills_then_outlines() {
    let mut gfx = offscreen(12, 12);
    paint_background(&mut gfx, Color::WHITE);
    gfx.set_fill_color(Some(RED));
    gfx.set_line_color(Some(Color::BLACK));
    gfx.draw_rect(2, 2, 6, 6);

    assert_eq!(gfx.get_pixel(2, 2), Color::BLACK);
    assert_eq!(gfx.get_pixel(7, 7), Color::BLACK);
    assert_eq!(gfx.get_pixel(4, 4), RED);
    assert_eq!(gfx.get_pixel(8, 8), Color::WHITE);
    assert_eq!(gfx.get_pixel(1, 4), Color::WHITE);
}

#[test]
fn draw_pixel_color_copies_alpha() {
    let mut gfx = offscreen(4, 4);
    paint_background(&mut gfx, Color::WHITE);
    gfx.draw_pixel_color(1, 1, RED.with_transparency(128));
    let px = gfx.get_pixel(1, 1);
    assert_eq!(px.transparency, 128);
    assert_eq!((px.r, px.g, px.b), (255, 0, 0));
    assert_eq!(gfx.get_pixel(2, 1), Color::WHITE);
}

#[test]
fn no_line_color_skips_line_and_pixel() {
    let mut gfx = offscreen(4, 4);
    gfx.set_line_color(None);
    gfx.draw_line(0, 0, 3, 3);
    gfx.draw_pixel(1, 1);
    assert!(gfx.surface_stats().is_none());
}

#[test]
fn unjoined_fat_line_is_declined_before_drawing() {
    let mut gfx = offscreen(16, 16);
    let line = Polygon::open(vec![Point::new(1.0, 1.0), Point::new(10.0, 10.0)]);
    let handled = gfx.draw_poly_line_b2d(
        Affine::IDENTITY,
        &line,
        0.0,
        Vec2::new(2.0, 2.0),
        LineJoin::None,
        LineCap::Butt,
        15f64.to_radians(),
        false,
    );
    assert!(!handled);
    assert!(gfx.surface_stats().is_none());

    let thin = gfx.draw_poly_line_b2d(
        Affine::IDENTITY,
        &line,
        0.0,
        Vec2::new(1.0, 1.0),
        LineJoin::None,
        LineCap::Butt,
        15f64.to_radians(),
        false,
    );
    assert!(thin);
}

#[test]
fn shrinking_transform_keeps_logical_width() {
    let mut gfx = offscreen(16, 16);
    let line = Polygon::open(vec![Point::new(1.0, 1.0), Point::new(20.0, 20.0)]);
    // 1.5 units scaled by 0.5 would be 0.75 device units; the logical width wins.
    let handled = gfx.draw_poly_line_b2d(
        Affine::scale(0.5),
        &line,
        0.0,
        Vec2::new(1.5, 1.5),
        LineJoin::None,
        LineCap::Butt,
        15f64.to_radians(),
        false,
    );
    assert!(!handled);
}

#[test]
fn skipped_polygon_draws_still_report_handled() {
    let mut gfx = offscreen(8, 8);
    gfx.set_fill_color(Some(RED));
    let square = PolyPolygon::from(Polygon::from_rect(Rect::new(1.0, 1.0, 5.0, 5.0)));
    assert!(gfx.draw_poly_polygon_b2d(Affine::IDENTITY, &square, 1.0));
    assert!(gfx.draw_poly_polygon_b2d(Affine::IDENTITY, &square, -0.5));
    assert!(gfx.draw_poly_polygon_b2d(Affine::IDENTITY, &PolyPolygon::default(), 0.0));
    gfx.set_line_color(None);
    gfx.set_fill_color(None);
    assert!(gfx.draw_poly_polygon_b2d(Affine::IDENTITY, &square, 0.0));
    assert!(gfx.surface_stats().is_none());
}

#[test]
fn transformed_bitmap_leaves_save_stack_balanced() {
    let mut gfx = offscreen(16, 16);
    let src = Bitmap::solid(4, 4, RenderColor::rgba(0, 0, 255, 255));
    let handled = gfx.draw_transformed_bitmap(
        Point::new(2.0, 2.0),
        Point::new(10.0, 2.0),
        Point::new(2.0, 10.0),
        &src,
        None,
    );
    assert!(handled);
    assert_eq!(gfx.surface_save_count(), Some(2));
    assert_eq!(gfx.get_pixel(5, 5), Color::rgb(0, 0, 255));
    assert_eq!(gfx.get_pixel(12, 12).transparency, 255);
}

#[test]
fn transformed_bitmap_declines_empty_source() {
    let mut gfx = offscreen(8, 8);
    let empty = Bitmap::from_image(Arc::new(PixelBuffer::new(0, 0, AlphaType::Premul)));
    assert!(!gfx.draw_transformed_bitmap(
        Point::ZERO,
        Point::new(4.0, 0.0),
        Point::new(0.0, 4.0),
        &empty,
        None,
    ));
}

#[test]
fn resize_recreates_surface_with_full_clip() {
    let window = HeadlessWindow::offscreen(8, 8);
    let mut gfx = backend_for(window.clone(), GraphicsOpts::default());
    gfx.set_clip_region(&Region::from_rect(IntRect::new(0, 0, 2, 2)));
    gfx.set_line_color(Some(RED));

    window.resize(12, 6);
    gfx.draw_pixel(0, 0);
    assert_eq!(gfx.surface_size(), Some((12, 6)));
    assert_eq!(gfx.clip_region(), &Region::from_rect(IntRect::from_size(12, 6)));
    assert_eq!(gfx.surface_save_count(), Some(2));
}

#[test]
fn resize_recreation_can_be_avoided() {
    let window = HeadlessWindow::offscreen(8, 8);
    let opts = GraphicsOpts {
        avoid_resize_recreation: true,
        ..GraphicsOpts::default()
    };
    let mut gfx = backend_for(window.clone(), opts);
    gfx.set_line_color(Some(RED));
    gfx.init();
    window.resize(12, 6);
    gfx.draw_pixel(0, 0);
    assert_eq!(gfx.surface_size(), Some((8, 8)));
}

#[test]
fn xor_mode_toggle_is_idempotent() {
    let mut gfx = offscreen(4, 4);
    gfx.set_xor_mode(true);
    gfx.set_xor_mode(true);
    assert!(gfx.is_xor_mode());
    gfx.set_xor_mode(false);
    assert!(!gfx.is_xor_mode());
}

#[test]
fn xor_line_round_trips() {
    let mut gfx = offscreen(16, 16);
    paint_background(&mut gfx, Color::rgb(10, 20, 30));
    let before = gfx.get_bitmap(0, 0, 16, 16);

    gfx.set_line_color(Some(RED));
    gfx.set_antialias(false);
    gfx.set_xor_mode(true);
    gfx.draw_line(2, 3, 12, 3);
    assert_ne!(gfx.get_bitmap(0, 0, 16, 16), before);
    gfx.draw_line(2, 3, 12, 3);
    gfx.set_xor_mode(false);

    assert_eq!(gfx.get_bitmap(0, 0, 16, 16), before);
}

#[test]
fn rop_colors_set_line_and_fill() {
    let mut gfx = offscreen(4, 4);
    gfx.set_rop_fill_color(RopColor::Zero);
    gfx.set_rop_line_color(RopColor::One);
    gfx.draw_rect(0, 0, 4, 4);
    assert_eq!(gfx.get_pixel(0, 0), Color::WHITE);
    assert_eq!(gfx.get_pixel(1, 1), Color::BLACK);
}

#[test]
fn draw_pixels_counts_toward_pressure() {
    let mut gfx = offscreen(8, 8);
    let pixels: Image = Arc::new(PixelBuffer::new(4, 4, AlphaType::Premul));
    let pos = TwoRect::identity(IntRect::new(0, 0, 4, 4));
    gfx.draw_pixels(&pos, pixels, BlendMode::SrcOver);
    assert_eq!(gfx.pending_pixels(), 16);
}

#[test]
fn degenerate_bitmap_draw_runs_no_draw_cycle() {
    let mut gfx = offscreen(8, 8);
    let bmp = Bitmap::solid(4, 4, RenderColor::rgba(0, 0, 255, 255));
    let empty = TwoRect::new(IntRect::new(0, 0, 4, 4), IntRect::new(0, 0, 0, 4));
    gfx.draw_bitmap(&empty, &bmp);
    assert!(gfx.surface_stats().is_none());

    gfx.draw_bitmap(&TwoRect::identity(IntRect::new(0, 0, 4, 4)), &bmp);
    assert_eq!(gfx.get_pixel(1, 1), Color::rgb(0, 0, 255));
}

#[test]
fn oversized_polygon_fills_its_visible_part() {
    let mut gfx = offscreen(16, 16);
    paint_background(&mut gfx, Color::WHITE);
    gfx.set_fill_color(Some(RED));
    gfx.draw_polygon(&[Point::new(-1.2e9, 0.0), Point::new(1.2e9, 0.0), Point::new(0.0, 10.0)]);
    assert_eq!(gfx.get_pixel(8, 2), RED);
    assert_eq!(gfx.get_pixel(8, 14), Color::WHITE);
}
