use super::*;
use kurbo::{PathEl, Point};

#[test]
fn empty_region_has_empty_path() {
    assert!(Region::empty().is_empty());
    assert!(region_to_path(&Region::empty()).elements().is_empty());
    assert!(Region::from_rect(IntRect::new(0, 0, 0, 5)).is_empty());
}

#[test]
fn rect_band_adds_one_subpath_per_rectangle() {
    let region = Region::from_rects([IntRect::new(0, 0, 10, 10), IntRect::new(20, 0, 5, 5)]);
    let path = region_to_path(&region);
    let moves = path
        .elements()
        .iter()
        .filter(|el| matches!(el, PathEl::MoveTo(_)))
        .count();
    assert_eq!(moves, 2);
    assert_eq!(region.bounds(), Rect::new(0.0, 0.0, 25.0, 10.0));
}

#[test]
fn polygon_region_uses_converter() {
    let tri = Polygon::closed(vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(0.0, 100.0),
    ]);
    let region = Region::from_poly_polygon(tri.clone().into());
    assert!(!region.is_empty());
    assert!(region.rectangles().is_none());
    assert_eq!(
        region_to_path(&region),
        crate::geometry::polygon::polygon_to_path(&tri)
    );
}

#[test]
fn rects_convert_to_poly_polygon() {
    let region = Region::from_rect(IntRect::new(1, 2, 3, 4));
    let pp = region.to_poly_polygon();
    assert_eq!(pp.len(), 1);
    assert_eq!(pp.polygons()[0].bounds(), Rect::new(1.0, 2.0, 4.0, 6.0));
}

#[test]
fn equality_distinguishes_regions() {
    let a = Region::from_rect(IntRect::new(0, 0, 10, 10));
    let b = Region::from_rect(IntRect::new(0, 0, 10, 11));
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}
