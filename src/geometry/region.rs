use kurbo::{BezPath, Rect, Shape};

use crate::foundation::core::IntRect;
use crate::geometry::polygon::{PolyPolygon, Polygon, poly_polygon_to_path};

/// Device-space clip region.
///
/// A region is either a band of integer rectangles or an arbitrary poly-polygon. The empty
/// rectangle list is the empty region.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Region {
    /// Union of integer rectangles.
    Rects(Vec<IntRect>),
    /// Even-odd poly-polygon.
    Polygons(PolyPolygon),
}

impl Default for Region {
    fn default() -> Self {
        Self::empty()
    }
}

impl Region {
    /// Region covering nothing.
    pub fn empty() -> Self {
        Self::Rects(Vec::new())
    }

    /// Single rectangle.
    pub fn from_rect(rect: IntRect) -> Self {
        Self::Rects(vec![rect])
    }

    /// Union of rectangles.
    pub fn from_rects(rects: impl IntoIterator<Item = IntRect>) -> Self {
        Self::Rects(rects.into_iter().collect())
    }

    /// Arbitrary polygonal region.
    pub fn from_poly_polygon(poly: PolyPolygon) -> Self {
        Self::Polygons(poly)
    }

    /// Whether the region covers no area.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Rects(rects) => rects.iter().all(IntRect::is_empty),
            Self::Polygons(poly) => poly.polygons().iter().all(|p| p.len() < 3),
        }
    }

    /// Rectangle band, if this is a rectangle region.
    pub fn rectangles(&self) -> Option<&[IntRect]> {
        match self {
            Self::Rects(rects) => Some(rects),
            Self::Polygons(_) => None,
        }
    }

    /// Poly-polygon form; rectangles become closed four-vertex polygons.
    pub fn to_poly_polygon(&self) -> PolyPolygon {
        match self {
            Self::Rects(rects) => PolyPolygon::new(
                rects
                    .iter()
                    .filter(|r| !r.is_empty())
                    .map(|r| Polygon::from_rect(r.to_rect()))
                    .collect(),
            ),
            Self::Polygons(poly) => poly.clone(),
        }
    }

    /// Bounding box in device units.
    pub fn bounds(&self) -> Rect {
        region_to_path(self).bounding_box()
    }
}

/// Path to clip with, meant to be used under the even-odd rule.
///
/// Rectangle regions add one rectangle subpath per member. Polygon regions go through the
/// polygon converter. Empty regions yield an empty path, which clips everything away.
pub fn region_to_path(region: &Region) -> BezPath {
    match region {
        Region::Rects(rects) => {
            let mut path = BezPath::new();
            for r in rects.iter().filter(|r| !r.is_empty()) {
                path.extend(r.to_rect().path_elements(0.1));
            }
            path
        }
        Region::Polygons(_) if region.is_empty() => BezPath::new(),
        Region::Polygons(poly) => poly_polygon_to_path(poly),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/region.rs"]
mod tests;
