//! Administrative boundary overlays loaded from GeoJSON.

use geo::Intersects;
use geo_types::{Coord, Geometry, Point, Rect};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::error::AtlasError;
use crate::layer::feature::{BoundaryFeature, Feature};
use crate::layer::feature_store::FeatureStore;
use crate::layer::LayerStyle;

/// One of the three administrative boundary layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Districts.
    District,
    /// Municipalities.
    Municipality,
    /// Wards.
    Ward,
}

impl OverlayKind {
    /// All overlays in the order they are drawn and listed.
    pub const ALL: [OverlayKind; 3] = [Self::District, Self::Municipality, Self::Ward];

    /// Name of a single feature of the layer, used in the query mode message.
    pub fn feature_name(&self) -> &'static str {
        match self {
            Self::District => "District",
            Self::Municipality => "Municipality",
            Self::Ward => "Ward",
        }
    }

    /// Name of the layer in the layer control.
    pub fn layer_name(&self) -> &'static str {
        match self {
            Self::District => "Districts",
            Self::Municipality => "Municipalities",
            Self::Ward => "Wards",
        }
    }

    fn position(&self) -> usize {
        match self {
            Self::District => 0,
            Self::Municipality => 1,
            Self::Ward => 2,
        }
    }
}

/// Vector layer with administrative boundary features.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    kind: OverlayKind,
    style: LayerStyle,
    features: FeatureStore<BoundaryFeature>,
    bounds: Option<Rect<f64>>,
    visible: bool,
}

impl BoundaryLayer {
    /// Creates an empty visible layer.
    pub fn new(kind: OverlayKind, style: LayerStyle) -> Self {
        Self {
            kind,
            style,
            features: FeatureStore::default(),
            bounds: None,
            visible: true,
        }
    }

    /// Which boundary layer this is.
    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Display style of the features.
    pub fn style(&self) -> LayerStyle {
        self.style
    }

    /// Whether the layer is shown on the map.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Features of the layer in insertion order.
    pub fn features(&self) -> &FeatureStore<BoundaryFeature> {
        &self.features
    }

    /// Bounding rectangle of all features. `None` while the layer is empty.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    /// Appends already converted features to the layer and returns their number.
    pub fn add_features(&mut self, converted: Vec<BoundaryFeature>) -> usize {
        let added = converted.len();
        for feature in &converted {
            if let Some(bbox) = feature.bbox() {
                self.bounds = Some(match self.bounds {
                    Some(bounds) => merge_rects(bounds, bbox),
                    None => bbox,
                });
            }
        }
        self.features.extend(converted);

        added
    }

    /// Returns the feature at the given lon/lat point.
    ///
    /// Polygon features match when the point is inside or on their boundary, point features
    /// match only on exact coordinate equality, other geometries never match. Features are
    /// checked in insertion order and the first match is returned, so of two overlapping
    /// polygons the one added first wins.
    pub fn feature_at(&self, point: Point<f64>) -> Option<&BoundaryFeature> {
        self.features
            .features()
            .find(|feature| feature_contains(feature, point))
    }
}

/// Converts every feature of the collection into a feature of the given layer.
///
/// Features without geometry are skipped with a warning. Fails on the first feature whose
/// geometry cannot be converted.
pub fn convert_collection(
    kind: OverlayKind,
    collection: FeatureCollection,
) -> Result<Vec<BoundaryFeature>, AtlasError> {
    let mut converted = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        match BoundaryFeature::from_geojson(feature)? {
            Some(feature) => converted.push(feature),
            None => log::warn!("Skipping {} feature without geometry", kind.feature_name()),
        }
    }

    Ok(converted)
}

fn feature_contains(feature: &BoundaryFeature, point: Point<f64>) -> bool {
    let outside_bbox = feature
        .bbox()
        .is_some_and(|bbox| !bbox.intersects(&point.0));

    match feature.geometry() {
        Geometry::Polygon(polygon) => !outside_bbox && polygon.intersects(&point.0),
        Geometry::MultiPolygon(polygons) => !outside_bbox && polygons.intersects(&point.0),
        Geometry::Point(feature_point) => *feature_point == point,
        _ => false,
    }
}

fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// The three boundary layers of the atlas.
#[derive(Debug, Clone)]
pub struct Overlays {
    layers: [BoundaryLayer; 3],
}

impl Overlays {
    /// Creates empty layers with the given styles.
    pub fn new(styles: impl Fn(OverlayKind) -> LayerStyle) -> Self {
        Self {
            layers: OverlayKind::ALL.map(|kind| BoundaryLayer::new(kind, styles(kind))),
        }
    }

    /// Returns the layer of the given kind.
    pub fn get(&self, kind: OverlayKind) -> &BoundaryLayer {
        &self.layers[kind.position()]
    }

    /// Returns the layer of the given kind.
    pub fn get_mut(&mut self, kind: OverlayKind) -> &mut BoundaryLayer {
        &mut self.layers[kind.position()]
    }

    /// Iterates over the layers in drawing order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundaryLayer> {
        self.layers.iter()
    }

    /// Number of layers that have at least one feature.
    pub fn populated_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|layer| !layer.features().is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use geo::polygon;
    use geojson::JsonObject;
    use serde_json::json;

    fn props(name: &str) -> JsonObject {
        let mut properties = JsonObject::new();
        properties.insert("name".into(), json!(name));
        properties
    }

    fn square(x: f64, y: f64, side: f64, name: &str) -> BoundaryFeature {
        BoundaryFeature::new(
            polygon![
                (x: x, y: y),
                (x: x + side, y: y),
                (x: x + side, y: y + side),
                (x: x, y: y + side),
                (x: x, y: y),
            ]
            .into(),
            props(name),
        )
    }

    fn layer_with(features: Vec<BoundaryFeature>) -> BoundaryLayer {
        let mut layer =
            BoundaryLayer::new(OverlayKind::District, LayerStyle::new(Color::DARK_RED, 1.0));
        layer.features.extend(features);
        layer
    }

    fn name_of(feature: Option<&BoundaryFeature>) -> Option<String> {
        feature.and_then(|f| f.properties()?.get("name")?.as_str().map(str::to_owned))
    }

    #[test]
    fn point_inside_polygon_is_found() {
        let layer = layer_with(vec![square(0.0, 0.0, 1.0, "a"), square(2.0, 0.0, 1.0, "b")]);
        assert_eq!(name_of(layer.feature_at(Point::new(2.5, 0.5))), Some("b".into()));
        assert_eq!(name_of(layer.feature_at(Point::new(1.5, 0.5))), None);
    }

    #[test]
    fn boundary_counts_as_inside() {
        let layer = layer_with(vec![square(0.0, 0.0, 1.0, "a")]);
        assert_eq!(name_of(layer.feature_at(Point::new(1.0, 0.5))), Some("a".into()));
    }

    #[test]
    fn first_added_overlapping_polygon_wins() {
        let layer = layer_with(vec![square(0.0, 0.0, 2.0, "first"), square(1.0, 1.0, 2.0, "second")]);
        assert_eq!(name_of(layer.feature_at(Point::new(1.5, 1.5))), Some("first".into()));
    }

    #[test]
    fn point_features_need_exact_match() {
        let layer = layer_with(vec![BoundaryFeature::new(
            Point::new(85.3, 27.7).into(),
            props("office"),
        )]);
        assert_eq!(name_of(layer.feature_at(Point::new(85.3, 27.7))), Some("office".into()));
        assert_eq!(name_of(layer.feature_at(Point::new(85.3, 27.700001))), None);
    }

    #[test]
    fn converted_features_extend_bounds_and_skip_empty_geometries() {
        let collection: FeatureCollection = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "a"},
                 "geometry": {"type": "Point", "coordinates": [80.0, 26.5]}},
                {"type": "Feature", "properties": {"name": "none"}, "geometry": null},
                {"type": "Feature", "properties": {"name": "b"},
                 "geometry": {"type": "Point", "coordinates": [88.0, 30.4]}}
            ]
        }"#
        .parse()
        .unwrap();

        let converted = convert_collection(OverlayKind::District, collection).unwrap();
        let mut layer = layer_with(vec![]);
        assert_eq!(layer.add_features(converted), 2);
        assert_eq!(layer.features().len(), 2);

        let bounds = layer.bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 80.0, y: 26.5 });
        assert_eq!(bounds.max(), Coord { x: 88.0, y: 30.4 });
    }

    #[test]
    fn overlays_are_addressed_by_kind() {
        let mut overlays = Overlays::new(|_| LayerStyle::new(Color::BLACK, 1.0));
        overlays
            .get_mut(OverlayKind::Ward)
            .features
            .insert(square(0.0, 0.0, 1.0, "w"));

        assert_eq!(overlays.get(OverlayKind::Ward).features().len(), 1);
        assert_eq!(overlays.get(OverlayKind::District).features().len(), 0);
        assert_eq!(overlays.populated_count(), 1);
        let kinds: Vec<_> = overlays.iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, OverlayKind::ALL.to_vec());
    }
}
