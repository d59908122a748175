use geo::BooleanOps;
use geo_types::{Coord, Geometry, LineString, Point, Polygon};

use crate::error::ToolError;
use crate::geometry::{into_geometry, polygonal};

/// Mean of all vertices of the geometries, treated as one combined feature.
///
/// The closing vertex of polygon rings repeats the first one and is not counted. Returns `None`
/// when there are no vertices.
pub fn centroid<'a>(geometries: impl IntoIterator<Item = &'a Geometry<f64>>) -> Option<Point<f64>> {
    let mut sum = Coord { x: 0.0, y: 0.0 };
    let mut count = 0usize;
    for geometry in geometries {
        each_vertex(geometry, &mut |c| {
            sum = sum + c;
            count += 1;
        });
    }

    if count == 0 {
        return None;
    }

    Some(Point::from(sum / count as f64))
}

fn each_vertex(geometry: &Geometry<f64>, f: &mut impl FnMut(Coord<f64>)) {
    match geometry {
        Geometry::Point(point) => f(point.0),
        Geometry::MultiPoint(points) => points.iter().for_each(|p| f(p.0)),
        Geometry::Line(line) => {
            f(line.start);
            f(line.end);
        }
        Geometry::LineString(line) => line.coords().for_each(|c| f(*c)),
        Geometry::MultiLineString(lines) => lines
            .iter()
            .flat_map(|line| line.coords())
            .for_each(|c| f(*c)),
        Geometry::Polygon(polygon) => polygon_vertices(polygon, f),
        Geometry::MultiPolygon(polygons) => {
            polygons.iter().for_each(|polygon| polygon_vertices(polygon, f))
        }
        Geometry::Rect(rect) => polygon_vertices(&rect.to_polygon(), f),
        Geometry::Triangle(triangle) => polygon_vertices(&triangle.to_polygon(), f),
        Geometry::GeometryCollection(collection) => {
            collection.iter().for_each(|member| each_vertex(member, f))
        }
    }
}

fn polygon_vertices(polygon: &Polygon<f64>, f: &mut impl FnMut(Coord<f64>)) {
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        open_ring(ring).iter().for_each(|c| f(*c));
    }
}

fn open_ring(ring: &LineString<f64>) -> &[Coord<f64>] {
    match ring.0.split_last() {
        Some((last, rest)) if ring.is_closed() && !rest.is_empty() && *last == rest[0] => rest,
        _ => &ring.0,
    }
}

/// Union of two polygonal geometries.
///
/// A result consisting of a single polygon is returned as `Polygon`, otherwise as `MultiPolygon`.
pub fn union(first: &Geometry<f64>, second: &Geometry<f64>) -> Result<Geometry<f64>, ToolError> {
    let (Some(first), Some(second)) = (polygonal(first), polygonal(second)) else {
        return Err(ToolError::NotPolygonal);
    };

    into_geometry(first.union(&second)).ok_or(ToolError::NotPolygonal)
}
