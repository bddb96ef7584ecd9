use super::*;
use kurbo::PathEl;

fn square() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ]
}

fn count(path: &BezPath) -> (usize, usize, usize, usize) {
    let mut moves = 0;
    let mut lines = 0;
    let mut curves = 0;
    let mut closes = 0;
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => moves += 1,
            PathEl::LineTo(_) => lines += 1,
            PathEl::CurveTo(..) => curves += 1,
            PathEl::ClosePath => closes += 1,
            PathEl::QuadTo(..) => panic!("no quads expected"),
        }
    }
    (moves, lines, curves, closes)
}

#[test]
fn closed_polygon_yields_n_lines_and_close() {
    let path = polygon_to_path(&Polygon::closed(square()));
    assert_eq!(count(&path), (1, 4, 0, 1));
}

#[test]
fn open_polyline_yields_n_minus_one_lines() {
    let path = polygon_to_path(&Polygon::open(square()));
    assert_eq!(count(&path), (1, 3, 0, 0));
}

#[test]
fn degenerate_polygons_add_nothing() {
    assert!(polygon_to_path(&Polygon::closed(vec![])).elements().is_empty());
    assert!(
        polygon_to_path(&Polygon::closed(vec![Point::new(3.0, 3.0)]))
            .elements()
            .is_empty()
    );
}

#[test]
fn coincident_controls_are_nudged_off_their_anchor() {
    let pts = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
    let controls = vec![ControlPoints::at(pts[0]), ControlPoints::at(pts[1])];
    let poly = Polygon::open(pts.clone()).with_controls(controls).unwrap();
    let path = polygon_to_path(&poly);

    let (c1, c2, end) = path
        .elements()
        .iter()
        .find_map(|el| match el {
            PathEl::CurveTo(a, b, c) => Some((*a, *b, *c)),
            _ => None,
        })
        .expect("curve segment");
    assert_eq!(end, pts[1]);
    assert_ne!(c1, pts[0]);
    assert_ne!(c2, pts[1]);
    // Offsets are 0.05% of the 100 unit chord.
    assert!((c1 - pts[0]).hypot() > 0.0 && (c1 - pts[0]).hypot() < 0.1);
    assert!((c2 - pts[1]).hypot() > 0.0 && (c2 - pts[1]).hypot() < 0.1);
}

#[test]
fn distinct_controls_are_kept() {
    let pts = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
    let controls = vec![
        ControlPoints {
            prev: pts[0],
            next: Point::new(2.0, 5.0),
        },
        ControlPoints {
            prev: Point::new(8.0, 5.0),
            next: pts[1],
        },
    ];
    let poly = Polygon::open(pts).with_controls(controls).unwrap();
    let path = polygon_to_path(&poly);
    assert!(path.elements().contains(&PathEl::CurveTo(
        Point::new(2.0, 5.0),
        Point::new(8.0, 5.0),
        Point::new(10.0, 0.0)
    )));
}

#[test]
fn control_count_must_match_points() {
    let err = Polygon::open(square())
        .with_controls(vec![ControlPoints::at(Point::ZERO)])
        .unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

#[test]
fn poly_polygon_emits_one_subpath_per_member() {
    let inner = vec![
        Point::new(3.0, 3.0),
        Point::new(7.0, 3.0),
        Point::new(7.0, 7.0),
        Point::new(3.0, 7.0),
    ];
    let pp = PolyPolygon::new(vec![Polygon::closed(square()), Polygon::closed(inner)]);
    let path = poly_polygon_to_path(&pp);
    assert_eq!(count(&path), (2, 8, 0, 2));
}

#[test]
fn snapping_rounds_axis_aligned_vertices() {
    let poly = Polygon::open(vec![
        Point::new(0.4, 5.2),
        Point::new(10.3, 5.4),
        Point::new(20.6, 17.7),
    ]);
    let snapped = snap_hairline_edges(&poly);
    let pts = snapped.points();
    // first edge is horizontal after rounding
    assert_eq!(pts[0].y, 5.0);
    assert_eq!(pts[1].y, 5.0);
    // last vertex is on a diagonal edge only
    assert_eq!(pts[2], Point::new(20.6, 17.7));
}

#[test]
fn snapping_wraps_ends_of_open_polylines() {
    let poly = Polygon::open(vec![
        Point::new(0.4, 0.3),
        Point::new(10.2, 7.6),
        Point::new(0.3, 20.1),
    ]);
    let snapped = snap_hairline_edges(&poly);
    let pts = snapped.points();
    // first and last vertex share a column once rounded
    assert_eq!(pts[0], Point::new(0.0, 0.3));
    assert_eq!(pts[1], Point::new(10.2, 7.6));
    assert_eq!(pts[2], Point::new(0.0, 20.1));
    assert!(!snapped.is_closed());
}

#[test]
fn from_rect_traces_corners() {
    let poly = Polygon::from_rect(Rect::new(1.0, 2.0, 3.0, 4.0));
    assert!(poly.is_closed());
    assert_eq!(poly.len(), 4);
    assert_eq!(poly.bounds(), Rect::new(1.0, 2.0, 3.0, 4.0));
}
