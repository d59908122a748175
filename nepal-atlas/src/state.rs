//! State of the atlas application and the operations the user can perform on it.

use geo_types::{Point, Rect};
use log::{error, info};

use crate::config::AtlasConfig;
use crate::control::DrawSession;
use crate::error::{AtlasError, ToolError};
use crate::geometry::{self, Measurement};
use crate::info::{query_mode_message, AttributeTable, InfoPanel, NOT_FOUND_MESSAGE};
use crate::layer::{
    Basemaps, DrawnItems, DrawnShape, Feature, OverlayKind, Overlays, ResultKind, ResultLayer,
    ShapeKind,
};
use crate::loader::BoundaryData;
use crate::view::{MapView, Size};

/// Progress of the boundary data load.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    /// Load was not started.
    #[default]
    NotStarted,
    /// Data is being loaded.
    Loading,
    /// All layers are populated.
    Loaded,
    /// Load failed with the given error message. No layer was populated.
    Failed(String),
}

/// Everything the atlas displays and every operation the user can perform.
///
/// The state is owned by the UI and passed to the event handlers explicitly.
#[derive(Debug)]
pub struct AppState {
    config: AtlasConfig,
    view: MapView,
    pending_fit: Option<Rect<f64>>,
    basemaps: Basemaps,
    overlays: Overlays,
    drawn: DrawnItems,
    draw_session: DrawSession,
    results: Vec<ResultLayer>,
    query_layer: Option<OverlayKind>,
    info: InfoPanel,
    measurement: Option<Measurement>,
    buffer_distance_km: f64,
    alert: Option<ToolError>,
    load_status: LoadStatus,
}

impl AppState {
    /// Creates the state from the configuration. Fails if no basemap is configured.
    pub fn new(config: AtlasConfig) -> Result<Self, AtlasError> {
        let basemaps = Basemaps::new(config.basemaps.clone())
            .ok_or_else(|| AtlasError::Config("at least one basemap is required".into()))?;
        let overlays = Overlays::new(|kind| config.overlays.get(kind).style);
        let view = MapView::new(config.initial_view.center(), config.initial_view.zoom);

        Ok(Self {
            view,
            pending_fit: None,
            basemaps,
            overlays,
            drawn: DrawnItems::default(),
            draw_session: DrawSession::default(),
            results: vec![],
            query_layer: None,
            info: InfoPanel::Empty,
            measurement: None,
            buffer_distance_km: config.buffer.default_km,
            alert: None,
            load_status: LoadStatus::NotStarted,
            config,
        })
    }

    /// Configuration the state was created with.
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Current map view.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Sets the map view, limiting the zoom to the range of the active basemap.
    pub fn set_view(&mut self, view: MapView) {
        let max_zoom = self.basemaps.active().max_zoom() as f64;
        self.view = view.clamp_zoom(0.0, max_zoom);
    }

    /// Updates the size of the map area. Applies a fit that was waiting for the view to get a size.
    pub fn set_view_size(&mut self, size: Size) {
        self.view = self.view.with_size(size);
        if !size.is_zero() {
            if let Some(bounds) = self.pending_fit.take() {
                self.fit_bounds(bounds);
            }
        }
    }

    /// Shows the whole lon/lat rectangle.
    ///
    /// If the map area has no size yet, the fit is applied once it gets one.
    pub fn fit_bounds(&mut self, bounds: Rect<f64>) {
        if self.view.size().is_zero() {
            self.pending_fit = Some(bounds);
            self.view = self.view.fit_bounds(bounds);
        } else {
            self.set_view(self.view.fit_bounds(bounds));
        }
    }

    /// Available basemaps.
    pub fn basemaps(&self) -> &Basemaps {
        &self.basemaps
    }

    /// Switches the basemap, adjusting the zoom to its range.
    pub fn select_basemap(&mut self, index: usize) {
        self.basemaps.select(index);
        self.set_view(self.view);
    }

    /// Boundary layers.
    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    /// Shows or hides a boundary layer.
    pub fn set_overlay_visible(&mut self, kind: OverlayKind, visible: bool) {
        self.overlays.get_mut(kind).set_visible(visible);
    }

    /// Layer queried by map clicks.
    pub fn query_layer(&self) -> Option<OverlayKind> {
        self.query_layer
    }

    /// Makes the layer the target of map clicks and tells the user how to query it.
    pub fn select_query_layer(&mut self, kind: OverlayKind) {
        self.query_layer = Some(kind);
        self.info = InfoPanel::Message(query_mode_message(kind));
    }

    /// Shows the attributes of the feature of the active query layer at the lon/lat point.
    ///
    /// Does nothing if no query layer is selected.
    pub fn handle_click(&mut self, point: Point<f64>) {
        let Some(kind) = self.query_layer else {
            return;
        };

        self.info = match self.overlays.get(kind).feature_at(point) {
            Some(feature) => InfoPanel::Attributes(AttributeTable::from_properties(
                feature.properties().unwrap_or(&Default::default()),
            )),
            None => InfoPanel::Message(NOT_FOUND_MESSAGE.to_string()),
        };
    }

    /// Contents of the attribute panel.
    pub fn info(&self) -> &InfoPanel {
        &self.info
    }

    /// Shapes drawn by the user.
    pub fn drawn(&self) -> &DrawnItems {
        &self.drawn
    }

    /// Shape being drawn.
    pub fn draw_session(&self) -> &DrawSession {
        &self.draw_session
    }

    /// Shape being drawn.
    pub fn draw_session_mut(&mut self) -> &mut DrawSession {
        &mut self.draw_session
    }

    /// Activates a drawing tool.
    pub fn start_drawing(&mut self, tool: ShapeKind) {
        self.draw_session.start(tool);
    }

    /// Discards the shape being drawn.
    pub fn cancel_drawing(&mut self) {
        self.draw_session.cancel();
    }

    /// Completes the shape being drawn. Errors are shown as an alert.
    pub fn finish_drawing(&mut self) -> Result<(), ToolError> {
        match self.draw_session.finish() {
            Ok(Some(shape)) => {
                self.on_shape_created(shape);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => Err(self.raise(err)),
        }
    }

    /// Adds the shape to the drawn collection and measures it.
    pub fn on_shape_created(&mut self, shape: DrawnShape) {
        self.measurement = Measurement::of(shape.geometry());
        info!("Created {} shape", shape.kind().name());
        self.drawn.add(shape);
    }

    /// Measurement of the last created shape.
    pub fn measurement(&self) -> Option<Measurement> {
        self.measurement
    }

    /// Removes the drawn shape at the given position.
    pub fn remove_drawn(&mut self, index: usize) -> Option<DrawnShape> {
        self.drawn.remove(index)
    }

    /// Removes all drawn shapes.
    pub fn clear_drawn(&mut self) {
        self.drawn.clear();
        self.measurement = None;
    }

    /// Buffer distance in kilometres.
    pub fn buffer_distance(&self) -> f64 {
        self.buffer_distance_km
    }

    /// Sets the buffer distance.
    pub fn set_buffer_distance(&mut self, km: f64) {
        self.buffer_distance_km = km;
    }

    /// Adds a layer with the buffers of all drawn shapes.
    pub fn buffer(&mut self) -> Result<(), ToolError> {
        if self.drawn.is_empty() {
            return Err(self.raise(ToolError::NothingToBuffer));
        }

        let distance = self.buffer_distance_km;
        let buffers: Result<Vec<_>, ToolError> = self
            .drawn
            .geometries()
            .map(|shape| geometry::buffer(shape, distance))
            .collect();
        let buffers = match buffers {
            Ok(buffers) => buffers.into_iter().flatten().collect(),
            Err(err) => return Err(self.raise(err)),
        };

        self.results.push(ResultLayer::new(ResultKind::Buffer, buffers));
        Ok(())
    }

    /// Adds a marker at the centroid of all drawn shapes.
    pub fn centroid(&mut self) -> Result<(), ToolError> {
        let Some(centroid) = geometry::centroid(&self.drawn.combined()) else {
            return Err(self.raise(ToolError::NothingForCentroid));
        };

        self.results
            .push(ResultLayer::new(ResultKind::Centroid, vec![centroid.into()]));
        Ok(())
    }

    /// Adds a layer with the union of the first two drawn shapes. Other shapes are ignored.
    pub fn union(&mut self) -> Result<(), ToolError> {
        let merged = match (self.drawn.get(0), self.drawn.get(1)) {
            (Some(first), Some(second)) => geometry::union(first.geometry(), second.geometry()),
            _ => Err(ToolError::NotEnoughShapes {
                drawn: self.drawn.len(),
            }),
        };

        match merged {
            Ok(merged) => {
                self.results
                    .push(ResultLayer::new(ResultKind::Union, vec![merged]));
                Ok(())
            }
            Err(err) => Err(self.raise(err)),
        }
    }

    /// Layers produced by the spatial operations, oldest first.
    pub fn results(&self) -> &[ResultLayer] {
        &self.results
    }

    /// Removes all result layers.
    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    fn raise(&mut self, err: ToolError) -> ToolError {
        self.alert = Some(err.clone());
        err
    }

    /// Alert waiting to be shown to the user.
    pub fn alert(&self) -> Option<&ToolError> {
        self.alert.as_ref()
    }

    /// Closes the alert.
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Progress of the boundary load.
    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Marks the boundary load as started.
    pub fn begin_load(&mut self) {
        self.load_status = LoadStatus::Loading;
    }

    /// Populates the boundary layers with the loaded data and fits the view to the districts.
    ///
    /// On failure the error is logged and no layer is changed.
    pub fn apply_boundaries(&mut self, result: Result<BoundaryData, AtlasError>) {
        let data = match result {
            Ok(data) => data,
            Err(err) => {
                error!("Boundary layers were not loaded: {err}");
                self.load_status = LoadStatus::Failed(err.to_string());
                return;
            }
        };

        for (kind, features) in data.into_layers() {
            let added = self.overlays.get_mut(kind).add_features(features);
            info!("{} layer populated with {added} features", kind.layer_name());
        }

        self.load_status = LoadStatus::Loaded;
        if let Some(bounds) = self.overlays.get(OverlayKind::District).bounds() {
            self.fit_bounds(bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::BoundaryFeature;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use geo::{line_string, point, polygon, Area};
    use geo_types::{Coord, Geometry};
    use geojson::JsonObject;
    use serde_json::json;

    fn square(x: f64, y: f64, size: f64) -> Geometry<f64> {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]
        .into()
    }

    fn feature(name: &str, geometry: Geometry<f64>) -> BoundaryFeature {
        let mut properties = JsonObject::new();
        properties.insert("DISTRICT".into(), json!(name));
        properties.insert("PROVINCE".into(), json!(3));
        BoundaryFeature::new(geometry, properties)
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        state.apply_boundaries(Ok(BoundaryData {
            districts: vec![
                feature("KATHMANDU", square(85.2, 27.6, 0.2)),
                feature("LALITPUR", square(85.2, 27.4, 0.2)),
            ],
            municipalities: vec![feature("M", square(85.2, 27.6, 0.1))],
            wards: vec![],
        }));
        state
    }

    fn shape(kind: ShapeKind, geometry: Geometry<f64>) -> DrawnShape {
        DrawnShape::new(kind, geometry)
    }

    #[test]
    fn query_selection_shows_mode_message() {
        let mut state = loaded_state();
        state.select_query_layer(OverlayKind::Ward);
        assert_eq!(
            state.info().to_text(),
            "Query mode: Ward. Click on the map to get attribute information."
        );
    }

    #[test]
    fn click_without_query_layer_does_nothing() {
        let mut state = loaded_state();
        state.handle_click(point!(x: 85.3, y: 27.7));
        assert_eq!(state.info(), &InfoPanel::Empty);
    }

    #[test]
    fn click_inside_polygon_shows_its_attributes() {
        let mut state = loaded_state();
        state.select_query_layer(OverlayKind::District);
        state.handle_click(point!(x: 85.3, y: 27.7));

        let table = assert_matches!(state.info(), InfoPanel::Attributes(table) => table.clone());
        assert_eq!(
            table.rows(),
            &[
                ("DISTRICT".to_string(), "KATHMANDU".to_string()),
                ("PROVINCE".to_string(), "3".to_string())
            ]
        );
    }

    #[test]
    fn click_outside_shows_not_found() {
        let mut state = loaded_state();
        state.select_query_layer(OverlayKind::District);
        state.handle_click(point!(x: 80.0, y: 29.0));
        assert_eq!(state.info().to_text(), "No feature found at this location.");
    }

    #[test]
    fn line_length_is_measured() {
        let mut state = loaded_state();
        state.on_shape_created(shape(
            ShapeKind::Polyline,
            line_string![(x: 0.0, y: 0.0), (x: 0.01, y: 0.0)].into(),
        ));

        assert_eq!(state.measurement().unwrap().to_string(), "Length: 1.112 km");
        assert_eq!(state.drawn().len(), 1);
    }

    #[test]
    fn marker_clears_measurement() {
        let mut state = loaded_state();
        state.on_shape_created(shape(ShapeKind::Polygon, square(0.0, 0.0, 0.01)));
        assert_matches!(state.measurement(), Some(Measurement::Area(_)));

        state.on_shape_created(shape(ShapeKind::Marker, point!(x: 0.0, y: 0.0).into()));
        assert_eq!(state.measurement(), None);
    }

    #[test]
    fn buffer_needs_a_shape() {
        let mut state = loaded_state();
        assert_eq!(state.buffer(), Err(ToolError::NothingToBuffer));
        assert_eq!(state.alert().map(ToString::to_string), Some("Draw a feature first.".into()));
        assert!(state.results().is_empty());
    }

    #[test]
    fn zero_buffer_returns_polygon() {
        let mut state = loaded_state();
        state.on_shape_created(shape(ShapeKind::Polygon, square(85.0, 27.0, 0.1)));
        state.set_buffer_distance(0.0);

        state.buffer().unwrap();
        let layer = &state.results()[0];
        assert_eq!(layer.kind(), ResultKind::Buffer);
        assert_eq!(layer.geometries(), &[square(85.0, 27.0, 0.1)]);
    }

    #[test]
    fn negative_buffer_is_rejected() {
        let mut state = loaded_state();
        state.on_shape_created(shape(ShapeKind::Marker, point!(x: 85.0, y: 27.0).into()));
        state.set_buffer_distance(-2.0);

        assert_matches!(state.buffer(), Err(ToolError::InvalidDistance(_)));
        assert!(state.results().is_empty());
    }

    #[test]
    fn centroid_of_drawn_collection() {
        let mut state = loaded_state();
        assert_eq!(state.centroid(), Err(ToolError::NothingForCentroid));

        state.on_shape_created(shape(ShapeKind::Polygon, square(0.0, 0.0, 2.0)));
        state.on_shape_created(shape(ShapeKind::Marker, point!(x: 6.0, y: 1.0).into()));
        state.centroid().unwrap();

        let layer = &state.results()[0];
        assert_eq!(layer.kind().title(), "Centroid");
        let centroid = assert_matches!(&layer.geometries()[0], Geometry::Point(p) => *p);
        assert_abs_diff_eq!(centroid.x(), 2.0);
        assert_abs_diff_eq!(centroid.y(), 1.0);
    }

    #[test]
    fn union_with_one_shape_is_rejected() {
        let mut state = loaded_state();
        state.on_shape_created(shape(ShapeKind::Polygon, square(0.0, 0.0, 2.0)));

        assert_eq!(state.union(), Err(ToolError::NotEnoughShapes { drawn: 1 }));
        assert_eq!(
            state.alert().map(ToString::to_string),
            Some("Draw at least two polygons to union.".into())
        );
        assert!(state.results().is_empty());
    }

    #[test]
    fn union_of_first_two_shapes() {
        let mut state = loaded_state();
        state.on_shape_created(shape(ShapeKind::Polygon, square(0.0, 0.0, 2.0)));
        state.on_shape_created(shape(ShapeKind::Polygon, square(1.0, 1.0, 2.0)));
        state.on_shape_created(shape(ShapeKind::Polygon, square(10.0, 10.0, 2.0)));

        state.union().unwrap();
        let merged = &state.results()[0].geometries()[0];
        assert_matches!(merged, Geometry::Polygon(_));
        assert_abs_diff_eq!(merged.unsigned_area(), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn union_requires_polygons() {
        let mut state = loaded_state();
        state.on_shape_created(shape(ShapeKind::Polygon, square(0.0, 0.0, 2.0)));
        state.on_shape_created(shape(ShapeKind::Marker, point!(x: 1.0, y: 1.0).into()));

        assert_eq!(state.union(), Err(ToolError::NotPolygonal));
        assert!(state.results().is_empty());
    }

    #[test]
    fn load_fits_view_to_districts() {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        state.set_view_size(Size::new(800.0, 600.0));
        state.apply_boundaries(Ok(BoundaryData {
            districts: vec![feature("A", square(80.0, 26.0, 8.0))],
            ..Default::default()
        }));

        assert_eq!(state.load_status(), &LoadStatus::Loaded);
        let visible = state.view().visible_bounds().unwrap();
        assert!(visible.min().x <= 80.0 + 1e-6 && visible.max().x >= 88.0 - 1e-6);
        assert!(visible.min().y <= 26.0 + 1e-6 && visible.max().y >= 34.0 - 1e-6);
        assert_abs_diff_eq!(state.view().center_lonlat().x, 84.0, epsilon = 1e-6);
    }

    #[test]
    fn fit_waits_for_view_size() {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        state.apply_boundaries(Ok(BoundaryData {
            districts: vec![feature("A", square(80.0, 26.0, 8.0))],
            ..Default::default()
        }));

        state.set_view_size(Size::new(400.0, 400.0));
        let visible = state.view().visible_bounds().unwrap();
        assert!(visible.min().x <= 80.0 + 1e-6 && visible.max().x >= 88.0 - 1e-6);
    }

    #[test]
    fn failed_load_populates_nothing() {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        let view = *state.view();
        state.apply_boundaries(Err(AtlasError::HttpStatus {
            url: "https://example.org/wards.geojson".into(),
            status: 500,
        }));

        assert_eq!(state.overlays().populated_count(), 0);
        assert_matches!(state.load_status(), LoadStatus::Failed(_));
        assert_eq!(state.view(), &view);
    }

    #[test]
    fn zoom_is_clamped_to_active_basemap() {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        state.set_view(state.view().with_zoom(19.0));
        state.select_basemap(1);
        assert_abs_diff_eq!(state.view().zoom(), 17.0, epsilon = 1e-9);

        let center = Coord { x: 85.0, y: 27.0 };
        state.set_view(MapView::new(center, 25.0));
        assert_abs_diff_eq!(state.view().zoom(), 17.0, epsilon = 1e-9);
    }
}
