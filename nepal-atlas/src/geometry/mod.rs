//! Measurements and spatial operations over lon/lat geometries.

use geo_types::{Geometry, MultiPolygon};

mod buffer;
mod measure;
mod ops;

pub use buffer::{buffer, EARTH_RADIUS_KM, QUADRANT_SEGMENTS};
pub use measure::Measurement;
pub use ops::{centroid, union};

/// Returns the polygons of a polygonal geometry, or `None` if the geometry has parts without area.
pub fn polygonal(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
        Geometry::MultiPolygon(polygons) => Some(polygons.clone()),
        Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::Triangle(triangle) => Some(MultiPolygon::new(vec![triangle.to_polygon()])),
        Geometry::GeometryCollection(collection) if !collection.0.is_empty() => {
            let mut polygons = vec![];
            for member in collection.iter() {
                polygons.extend(polygonal(member)?.0);
            }
            Some(MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

/// Converts a multi-polygon into a geometry: `Polygon` for one part, `MultiPolygon` for several,
/// `None` for none.
pub fn into_geometry(mut polygons: MultiPolygon<f64>) -> Option<Geometry<f64>> {
    match polygons.0.len() {
        0 => None,
        1 => polygons.0.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(polygons)),
    }
}
