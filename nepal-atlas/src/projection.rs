//! Conversion between geographic coordinates and the Web Mercator plane used by the map view.

use geo_types::Coord;

/// Semi-major axis of the WGS84 ellipsoid in meters.
pub const WGS84_SEMIMAJOR: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Spherical Web Mercator projection (EPSG:3857).
///
/// Geographic coordinates are `Coord { x: lon, y: lat }` in degrees, projected coordinates are
/// meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WebMercator {
    semimajor: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            semimajor: WGS84_SEMIMAJOR,
        }
    }
}

impl WebMercator {
    /// Half of the projected world width in meters.
    pub fn half_extent(&self) -> f64 {
        std::f64::consts::PI * self.semimajor
    }

    /// Projects a lon/lat coordinate. Latitudes beyond the projection limits are clamped.
    pub fn project(&self, lonlat: Coord<f64>) -> Option<Coord<f64>> {
        let lat = lonlat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = self.semimajor * lonlat.x.to_radians();
        let y = self.semimajor
            * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Coord { x, y })
        } else {
            None
        }
    }

    /// Converts projected meters back into a lon/lat coordinate.
    pub fn unproject(&self, projected: Coord<f64>) -> Coord<f64> {
        let lat = 2.0 * (projected.y / self.semimajor).exp().atan() - std::f64::consts::FRAC_PI_2;
        let lon = projected.x / self.semimajor;

        Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_projects_to_origin() {
        let projected = WebMercator::default()
            .project(Coord { x: 0.0, y: 0.0 })
            .unwrap();
        assert_abs_diff_eq!(projected.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn antimeridian_is_half_extent() {
        let projection = WebMercator::default();
        let projected = projection.project(Coord { x: 180.0, y: 0.0 }).unwrap();
        assert_abs_diff_eq!(projected.x, 20_037_508.342_789_244, epsilon = 1e-6);
        assert_abs_diff_eq!(projection.half_extent(), projected.x, epsilon = 1e-6);
    }

    #[test]
    fn unproject_inverts_project() {
        let projection = WebMercator::default();
        let kathmandu = Coord {
            x: 85.324,
            y: 27.7172,
        };
        let back = projection.unproject(projection.project(kathmandu).unwrap());
        assert_abs_diff_eq!(back.x, kathmandu.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, kathmandu.y, epsilon = 1e-9);
    }

    #[test]
    fn poles_are_clamped() {
        let projection = WebMercator::default();
        let north = projection.project(Coord { x: 0.0, y: 90.0 }).unwrap();
        assert_abs_diff_eq!(north.y, projection.half_extent(), epsilon = 1e-3);
    }
}
