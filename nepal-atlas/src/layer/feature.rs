//! Geographic objects shown by the vector layers.

use geo::BoundingRect;
use geo_types::{Geometry, Rect};
use geojson::JsonObject;

use crate::error::AtlasError;

/// A feature is a geographic object with lon/lat geometry.
pub trait Feature {
    /// Returns the geometry of the feature.
    fn geometry(&self) -> &Geometry<f64>;

    /// Attributes of the feature in their original order.
    fn properties(&self) -> Option<&JsonObject> {
        None
    }
}

/// Feature of a boundary layer loaded from GeoJSON.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    geometry: Geometry<f64>,
    properties: JsonObject,
    bbox: Option<Rect<f64>>,
}

impl BoundaryFeature {
    /// Creates a feature with the given geometry and attributes.
    pub fn new(geometry: Geometry<f64>, properties: JsonObject) -> Self {
        let bbox = geometry.bounding_rect();
        Self {
            geometry,
            properties,
            bbox,
        }
    }

    /// Converts a GeoJSON feature.
    ///
    /// Features without geometry have nothing to display and are returned as `None`. Geometry
    /// that cannot be represented (e.g. a ring with too few points) is an error.
    pub fn from_geojson(feature: geojson::Feature) -> Result<Option<Self>, AtlasError> {
        let Some(geometry) = feature.geometry else {
            return Ok(None);
        };

        let geometry = Geometry::<f64>::try_from(geometry)?;
        Ok(Some(Self::new(geometry, feature.properties.unwrap_or_default())))
    }

    /// Bounding rectangle of the geometry. `None` for empty geometries.
    pub fn bbox(&self) -> Option<Rect<f64>> {
        self.bbox
    }
}

impl Feature for BoundaryFeature {
    fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    fn properties(&self) -> Option<&JsonObject> {
        Some(&self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn converts_geojson_feature() {
        let feature: geojson::Feature = r#"{
            "type": "Feature",
            "properties": {"DISTRICT": "KATHMANDU", "PROVINCE": 3},
            "geometry": {"type": "Polygon", "coordinates": [[[85.2, 27.6], [85.5, 27.6], [85.5, 27.8], [85.2, 27.6]]]}
        }"#
        .parse()
        .unwrap();

        let converted = BoundaryFeature::from_geojson(feature).unwrap().unwrap();
        assert_matches!(converted.geometry(), Geometry::Polygon(_));
        let keys: Vec<_> = converted.properties().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["DISTRICT", "PROVINCE"]);
        let bbox = converted.bbox().unwrap();
        assert_eq!(bbox.min().x, 85.2);
        assert_eq!(bbox.max().y, 27.8);
    }

    #[test]
    fn feature_without_geometry_is_skipped() {
        let feature: geojson::Feature = r#"{"type": "Feature", "properties": null, "geometry": null}"#
            .parse()
            .unwrap();
        assert_matches!(BoundaryFeature::from_geojson(feature), Ok(None));
    }
}
