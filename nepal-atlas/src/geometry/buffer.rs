//! Buffering of lon/lat geometries by a distance in kilometres.
//!
//! The geometry is projected into a local equirectangular frame measured in kilometres around the
//! centre of its bounding box, grown there by unioning circles around the vertices with rectangles
//! along the segments, and projected back to lon/lat.

use std::f64::consts::PI;

use geo::{BooleanOps, BoundingRect, MapCoords};
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};

use crate::error::ToolError;
use crate::geometry::{into_geometry, polygonal};

/// Mean Earth radius used for the distance frame.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Number of segments a quarter of a circle is approximated with.
pub const QUADRANT_SEGMENTS: usize = 8;

/// Buffers a geometry by `distance_km` kilometres.
///
/// With zero distance polygons are returned as they are, while points and lines have no area and
/// produce nothing. Negative and non-finite distances are rejected.
pub fn buffer(geometry: &Geometry<f64>, distance_km: f64) -> Result<Option<Geometry<f64>>, ToolError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(ToolError::InvalidDistance(distance_km));
    }

    if distance_km == 0.0 {
        return Ok(match geometry {
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Some(geometry.clone()),
            other => polygonal(other).and_then(into_geometry),
        });
    }

    let Some(frame) = LocalFrame::around(geometry) else {
        return Ok(None);
    };

    let projected = geometry.map_coords(|c| frame.forward(c));
    let grown = grow(&projected, distance_km);
    let unprojected = grown.map_coords(|c| frame.inverse(c));

    Ok(into_geometry(unprojected))
}

/// Equirectangular projection into kilometres around an origin.
#[derive(Debug, Copy, Clone)]
struct LocalFrame {
    origin: Coord<f64>,
    cos_lat: f64,
}

impl LocalFrame {
    fn around(geometry: &Geometry<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        let origin = rect.center();
        let cos_lat = origin.y.to_radians().cos();
        if cos_lat <= f64::EPSILON {
            return None;
        }

        Some(Self { origin, cos_lat })
    }

    fn km_per_degree() -> f64 {
        EARTH_RADIUS_KM * PI / 180.0
    }

    fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x) * Self::km_per_degree() * self.cos_lat,
            y: (c.y - self.origin.y) * Self::km_per_degree(),
        }
    }

    fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.origin.x + c.x / (Self::km_per_degree() * self.cos_lat),
            y: self.origin.y + c.y / Self::km_per_degree(),
        }
    }
}

fn grow(geometry: &Geometry<f64>, radius: f64) -> MultiPolygon<f64> {
    match geometry {
        Geometry::Point(point) => MultiPolygon::new(vec![circle(point.0, radius)]),
        Geometry::MultiPoint(points) => points
            .iter()
            .map(|point| MultiPolygon::new(vec![circle(point.0, radius)]))
            .fold(empty(), |acc, next| acc.union(&next)),
        Geometry::Line(line) => grow_line(&[line.start, line.end], radius),
        Geometry::LineString(line) => grow_line(&line.0, radius),
        Geometry::MultiLineString(lines) => lines
            .iter()
            .map(|line| grow_line(&line.0, radius))
            .fold(empty(), |acc, next| acc.union(&next)),
        Geometry::Polygon(polygon) => grow_polygon(polygon, radius),
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .map(|polygon| grow_polygon(polygon, radius))
            .fold(empty(), |acc, next| acc.union(&next)),
        Geometry::Rect(rect) => grow_polygon(&rect.to_polygon(), radius),
        Geometry::Triangle(triangle) => grow_polygon(&triangle.to_polygon(), radius),
        Geometry::GeometryCollection(collection) => collection
            .iter()
            .map(|member| grow(member, radius))
            .fold(empty(), |acc, next| acc.union(&next)),
    }
}

fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![])
}

fn grow_polygon(polygon: &Polygon<f64>, radius: f64) -> MultiPolygon<f64> {
    let mut grown = MultiPolygon::new(vec![polygon.clone()]);
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        grown = grown.union(&grow_line(&ring.0, radius));
    }

    grown
}

fn grow_line(coords: &[Coord<f64>], radius: f64) -> MultiPolygon<f64> {
    let mut pieces: Vec<Polygon<f64>> = coords.iter().map(|c| circle(*c, radius)).collect();
    for pair in coords.windows(2) {
        if let Some(rect) = segment_rect(pair[0], pair[1], radius) {
            pieces.push(rect);
        }
    }

    pieces
        .into_iter()
        .map(|piece| MultiPolygon::new(vec![piece]))
        .fold(empty(), |acc, next| acc.union(&next))
}

fn circle(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let count = QUADRANT_SEGMENTS * 4;
    let ring: Vec<Coord<f64>> = (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect();

    Polygon::new(LineString::new(ring), vec![])
}

/// Rectangle of half-width `radius` around the segment. `None` for degenerate segments.
fn segment_rect(a: Coord<f64>, b: Coord<f64>, radius: f64) -> Option<Polygon<f64>> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    if length <= f64::EPSILON {
        return None;
    }

    let offset = Coord {
        x: -dy / length * radius,
        y: dx / length * radius,
    };

    Some(Polygon::new(
        LineString::new(vec![a + offset, b + offset, b - offset, a - offset]),
        vec![],
    ))
}
