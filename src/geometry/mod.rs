/// Polygons with optional Bezier control points, and their conversion to paths.
pub mod polygon;
/// Clip regions.
pub mod region;
