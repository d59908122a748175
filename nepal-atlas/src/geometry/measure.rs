use std::fmt::{Display, Formatter};

use geo::{ChamberlainDuquetteArea, HaversineLength};
use geo_types::Geometry;

/// Measurement of a drawn shape shown in the measurement panel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Measurement {
    /// Length of a line in kilometres.
    Length(f64),
    /// Area of a polygon in square kilometres.
    Area(f64),
}

impl Measurement {
    /// Measures the geometry.
    ///
    /// Lines (`LineString`, `MultiLineString`) get their great-circle length, polygons (`Polygon`,
    /// `MultiPolygon`) get their area on the sphere. Other geometries have nothing to measure.
    pub fn of(geometry: &Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::LineString(line) => Some(Self::Length(line.haversine_length() / 1000.0)),
            Geometry::MultiLineString(lines) => {
                Some(Self::Length(lines.haversine_length() / 1000.0))
            }
            Geometry::Polygon(polygon) => Some(Self::Area(
                polygon.chamberlain_duquette_unsigned_area() / 1e6,
            )),
            Geometry::MultiPolygon(polygons) => Some(Self::Area(
                polygons.chamberlain_duquette_unsigned_area() / 1e6,
            )),
            _ => None,
        }
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length(km) => write!(f, "Length: {km:.3} km"),
            Self::Area(sq_km) => write!(f, "Area: {sq_km:.3} km²"),
        }
    }
}
