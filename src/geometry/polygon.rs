use kurbo::{Affine, BezPath, Point, Rect};

use crate::foundation::error::{RasterError, RasterResult};

/// Fraction of the opposite-endpoint vector used to move a degenerate control point off its
/// anchor, so the curve keeps a defined tangent direction.
const CONTROL_NUDGE: f64 = 0.0005;

/// Bezier control points attached to one vertex.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ControlPoints {
    /// Control point of the segment arriving at the vertex.
    pub prev: Point,
    /// Control point of the segment leaving the vertex.
    pub next: Point,
}

impl ControlPoints {
    /// Controls that coincide with `p` (a straight segment on both sides).
    pub fn at(p: Point) -> Self {
        Self { prev: p, next: p }
    }
}

/// Ordered vertex sequence, optionally closed, with optional per-vertex control points.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
    controls: Option<Vec<ControlPoints>>,
    closed: bool,
}

impl Polygon {
    /// Polygon without curves.
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self {
            points,
            controls: None,
            closed,
        }
    }

    /// Closed polygon without curves.
    pub fn closed(points: Vec<Point>) -> Self {
        Self::new(points, true)
    }

    /// Open polyline without curves.
    pub fn open(points: Vec<Point>) -> Self {
        Self::new(points, false)
    }

    /// Closed four-vertex polygon tracing `rect` clockwise from its top-left corner.
    pub fn from_rect(rect: Rect) -> Self {
        Self::closed(vec![
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ])
    }

    /// Attach one set of control points per vertex.
    pub fn with_controls(mut self, controls: Vec<ControlPoints>) -> RasterResult<Self> {
        if controls.len() != self.points.len() {
            return Err(RasterError::validation(format!(
                "polygon has {} points but {} control point pairs",
                self.points.len(),
                controls.len()
            )));
        }
        self.controls = Some(controls);
        Ok(self)
    }

    /// Vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// No vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the last vertex connects back to the first.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Change the closed flag.
    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Whether any vertex carries control points.
    pub fn has_curves(&self) -> bool {
        self.controls.is_some()
    }

    fn prev_control(&self, index: usize) -> Point {
        self.controls
            .as_ref()
            .map_or(self.points[index], |c| c[index].prev)
    }

    fn next_control(&self, index: usize) -> Point {
        self.controls
            .as_ref()
            .map_or(self.points[index], |c| c[index].next)
    }

    /// Polygon with every vertex and control point mapped through `affine`.
    pub fn transformed(&self, affine: Affine) -> Self {
        Self {
            points: self.points.iter().map(|p| affine * *p).collect(),
            controls: self.controls.as_ref().map(|cs| {
                cs.iter()
                    .map(|c| ControlPoints {
                        prev: affine * c.prev,
                        next: affine * c.next,
                    })
                    .collect()
            }),
            closed: self.closed,
        }
    }

    /// Bounding box of the vertices (control points excluded).
    pub fn bounds(&self) -> Rect {
        let mut it = self.points.iter();
        let Some(first) = it.next() else {
            return Rect::ZERO;
        };
        it.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
    }
}

/// Collection of polygons filled together under the even-odd rule.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PolyPolygon {
    polygons: Vec<Polygon>,
}

impl PolyPolygon {
    /// Wrap a list of polygons.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Append a polygon.
    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Member polygons.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Number of member polygons.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// No member polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Copy with `affine` applied to every member.
    pub fn transformed(&self, affine: Affine) -> Self {
        Self::new(self.polygons.iter().map(|p| p.transformed(affine)).collect())
    }
}

impl From<Polygon> for PolyPolygon {
    fn from(polygon: Polygon) -> Self {
        Self::new(vec![polygon])
    }
}

/// Append `polygon` to `path` as one subpath.
///
/// Polygons with fewer than two vertices add nothing. Curved segments whose control point
/// coincides with its anchor get the control point nudged so the segment is never degenerate.
pub fn add_polygon_to_path(polygon: &Polygon, path: &mut BezPath) {
    let count = polygon.len();
    if count <= 1 {
        return;
    }
    let points = polygon.points();
    let has_curves = polygon.has_curves();

    path.move_to(points[0]);
    let steps = if polygon.is_closed() { count } else { count - 1 };
    for step in 1..=steps {
        let prev_index = step - 1;
        let index = step % count;
        let prev = points[prev_index];
        let current = points[index];

        if !has_curves {
            path.line_to(current);
            continue;
        }

        let mut prev_ctrl = polygon.next_control(prev_index);
        let mut cur_ctrl = polygon.prev_control(index);
        if prev_ctrl == prev {
            prev_ctrl = prev + (prev_ctrl - current) * CONTROL_NUDGE;
        }
        if cur_ctrl == current {
            cur_ctrl = current + (cur_ctrl - prev) * CONTROL_NUDGE;
        }
        path.curve_to(prev_ctrl, cur_ctrl, current);
    }

    if polygon.is_closed() {
        path.close_path();
    }
}

/// Path for a single polygon.
pub fn polygon_to_path(polygon: &Polygon) -> BezPath {
    let mut path = BezPath::new();
    add_polygon_to_path(polygon, &mut path);
    path
}

/// One path holding every member polygon as its own subpath.
pub fn poly_polygon_to_path(poly: &PolyPolygon) -> BezPath {
    let mut path = BezPath::new();
    for polygon in poly.polygons() {
        add_polygon_to_path(polygon, &mut path);
    }
    path
}

/// Round vertices that lie on horizontal or vertical edges to whole device units, so that
/// axis-aligned hairlines land on pixel boundaries. Curved polygons are returned unchanged.
pub fn snap_hairline_edges(polygon: &Polygon) -> Polygon {
    let count = polygon.len();
    if count < 2 || polygon.has_curves() {
        return polygon.clone();
    }
    let closed = polygon.is_closed();
    let src = polygon.points();
    let rounded: Vec<(f64, f64)> = src.iter().map(|p| (p.x.round(), p.y.round())).collect();

    // Neighbors wrap around even for open polylines.
    let mut out = Vec::with_capacity(count);
    for (i, p) in src.iter().enumerate() {
        let prev = rounded[(i + count - 1) % count];
        let next = rounded[(i + 1) % count];
        let cur = rounded[i];

        let snap_x = prev.0 == cur.0 || next.0 == cur.0;
        let snap_y = prev.1 == cur.1 || next.1 == cur.1;

        out.push(Point::new(
            if snap_x { cur.0 } else { p.x },
            if snap_y { cur.1 } else { p.y },
        ));
    }
    Polygon::new(out, closed)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/polygon.rs"]
mod tests;
