use std::sync::Arc;

use egui::{Color32, Event, Pos2, Rect, Sense, Shape, Stroke, Ui};
use nepal_atlas::control::{
    DrawController, EventProcessor, MapController, MouseButton, QueryController, RawUserEvent,
};
use nepal_atlas::geo_types::{Coord, Geometry, LineString, Polygon, Rect as GeoRect};
use nepal_atlas::layer::{Feature, LayerStyle};
use nepal_atlas::loader::{DataProvider, TileLoader};
use nepal_atlas::{AppState, Color, MapView, Messenger, Size};

use crate::tiles::TileTextures;

const BACKGROUND: Color32 = Color32::from_rgb(221, 221, 221);
const MARKER_RADIUS: f32 = 6.0;
const PREVIEW_WEIGHT: f32 = 2.0;
const PREVIEW_ALPHA: u8 = 160;

/// Map area of the viewer: paints the basemap and the vector layers and feeds the pointer input
/// into the event handlers.
pub struct MapWidget {
    event_processor: EventProcessor,
    tile_loader: TileLoader,
    textures: TileTextures,
    shown_basemap: Option<String>,
}

impl MapWidget {
    pub fn new(provider: Arc<dyn DataProvider>, messenger: Arc<dyn Messenger>) -> Self {
        let mut event_processor = EventProcessor::default();
        event_processor.add_handler(DrawController);
        event_processor.add_handler(QueryController);
        event_processor.add_handler(MapController::default());

        Self {
            event_processor,
            tile_loader: TileLoader::new(provider, Some(messenger)),
            textures: TileTextures::default(),
            shown_basemap: None,
        }
    }

    pub fn render(&mut self, ui: &mut Ui, state: &mut AppState) {
        let available_size = ui.available_size().floor();
        let (rect, response) = ui.allocate_exact_size(available_size, Sense::click_and_drag());

        let size = Size::new(available_size.x as f64, available_size.y as f64);
        if state.view().size() != size {
            log::trace!("Resizing map to size: {size:?}");
            state.set_view_size(size);
        }

        if self.event_processor.is_dragging() || response.contains_pointer() {
            let events = ui.input(|input_state| input_state.events.clone());
            self.process_events(&events, rect.min, state);
        }

        self.update_tiles(ui.ctx(), state);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let view = *state.view();
        let canvas = Canvas {
            painter: &painter,
            view: &view,
            origin: rect.min,
        };

        self.paint_tiles(&canvas, state);

        let visible = view.visible_bounds();
        for layer in state.overlays().iter().filter(|layer| layer.is_visible()) {
            for feature in layer.features().features() {
                let in_view = match (visible, feature.bbox()) {
                    (Some(visible), Some(bbox)) => intersects(visible, bbox),
                    _ => true,
                };
                if in_view {
                    canvas.geometry(feature.geometry(), layer.style());
                }
            }
        }

        let drawn_style = LayerStyle::new(Color::DRAW_BLUE, 3.0);
        for shape in state.drawn().geometries() {
            canvas.geometry(shape, drawn_style);
        }

        if let Some(preview) = state.draw_session().preview() {
            let color = Color::DRAW_BLUE.with_alpha(PREVIEW_ALPHA);
            canvas.geometry(&preview, LayerStyle::new(color, PREVIEW_WEIGHT));
        }

        for result in state.results() {
            for geometry in result.geometries() {
                canvas.geometry(geometry, result.style());
            }
        }
    }

    fn update_tiles(&mut self, ctx: &egui::Context, state: &AppState) {
        let basemap = state.basemaps().active();
        if self.shown_basemap.as_deref() != Some(basemap.name()) {
            self.textures
                .retain_basemap(basemap.name(), &self.tile_loader);
            self.shown_basemap = Some(basemap.name().to_string());
        }

        self.tile_loader.prepare(basemap, state.view());
        self.textures.update(ctx, &self.tile_loader);
    }

    fn paint_tiles(&self, canvas: &Canvas<'_>, state: &AppState) {
        let basemap = state.basemaps().active();
        let schema = basemap.tile_schema();

        for key in TileLoader::tiles_for_view(basemap, canvas.view) {
            let Some(texture) = self.textures.get(&key) else {
                continue;
            };

            let bounds = schema.tile_bounds(key.index);
            let tile_rect = Rect::from_two_pos(
                canvas.to_pos(canvas.view.map_to_screen(bounds.min())),
                canvas.to_pos(canvas.view.map_to_screen(bounds.max())),
            );

            canvas.painter.image(
                texture.id(),
                tile_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }

    fn process_events(&mut self, events: &[Event], origin: Pos2, state: &mut AppState) {
        for event in events {
            if let Some(raw_event) = Self::convert_event(event, origin) {
                self.event_processor.handle(raw_event, state);
            }
        }
    }

    fn convert_event(event: &Event, origin: Pos2) -> Option<RawUserEvent> {
        match event {
            Event::PointerButton {
                button, pressed, ..
            } => {
                let button = match button {
                    egui::PointerButton::Primary => MouseButton::Left,
                    egui::PointerButton::Secondary => MouseButton::Right,
                    egui::PointerButton::Middle => MouseButton::Middle,
                    _ => MouseButton::Other,
                };

                Some(match pressed {
                    true => RawUserEvent::ButtonPressed(button),
                    false => RawUserEvent::ButtonReleased(button),
                })
            }
            Event::PointerMoved(position) => Some(RawUserEvent::PointerMoved(Coord {
                x: (position.x - origin.x) as f64,
                y: (position.y - origin.y) as f64,
            })),
            Event::MouseWheel { delta, .. } => {
                let zoom = delta[1] as f64;

                if zoom.abs() < 0.0001 {
                    return None;
                }

                Some(RawUserEvent::Scroll(zoom))
            }
            _ => None,
        }
    }
}

/// Paints lon/lat geometries onto the map area.
struct Canvas<'a> {
    painter: &'a egui::Painter,
    view: &'a MapView,
    origin: Pos2,
}

impl Canvas<'_> {
    fn to_pos(&self, screen: Coord<f64>) -> Pos2 {
        Pos2::new(
            self.origin.x + screen.x as f32,
            self.origin.y + screen.y as f32,
        )
    }

    fn project(&self, lonlat: Coord<f64>) -> Option<Pos2> {
        self.view
            .lonlat_to_screen(lonlat)
            .map(|screen| self.to_pos(screen))
    }

    fn geometry(&self, geometry: &Geometry<f64>, style: LayerStyle) {
        let stroke = Stroke::new(style.weight, color32(style.color));

        match geometry {
            Geometry::Point(point) => self.marker(point.0, style.color),
            Geometry::MultiPoint(points) => {
                for point in points {
                    self.marker(point.0, style.color);
                }
            }
            Geometry::Line(line) => self.line_string(&LineString::from(*line), stroke),
            Geometry::LineString(line) => self.line_string(line, stroke),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.line_string(line, stroke);
                }
            }
            Geometry::Polygon(polygon) => self.polygon(polygon, stroke),
            Geometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    self.polygon(polygon, stroke);
                }
            }
            Geometry::Rect(rect) => self.polygon(&rect.to_polygon(), stroke),
            Geometry::Triangle(triangle) => self.polygon(&triangle.to_polygon(), stroke),
            Geometry::GeometryCollection(collection) => {
                for geometry in collection {
                    self.geometry(geometry, style);
                }
            }
        }
    }

    fn marker(&self, lonlat: Coord<f64>, color: Color) {
        if let Some(center) = self.project(lonlat) {
            self.painter
                .circle_filled(center, MARKER_RADIUS, color32(color));
            self.painter
                .circle_stroke(center, MARKER_RADIUS, Stroke::new(1.5, Color32::WHITE));
        }
    }

    fn points(&self, line: &LineString<f64>) -> Vec<Pos2> {
        line.coords()
            .filter_map(|coord| self.project(*coord))
            .collect()
    }

    fn line_string(&self, line: &LineString<f64>, stroke: Stroke) {
        let points = self.points(line);
        if points.len() > 1 {
            self.painter.add(Shape::line(points, stroke));
        }
    }

    fn polygon(&self, polygon: &Polygon<f64>, stroke: Stroke) {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut points = self.points(ring);
            // Rings are closed, the closed line adds the last segment itself.
            points.pop();
            if points.len() > 1 {
                self.painter.add(Shape::closed_line(points, stroke));
            }
        }
    }
}

fn color32(color: Color) -> Color32 {
    let [r, g, b, a] = color.to_u8_array();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn intersects(a: GeoRect<f64>, b: GeoRect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}
