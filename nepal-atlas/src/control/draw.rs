use geo_types::{Coord, Geometry, LineString, Point, Polygon, Rect};

use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::error::ToolError;
use crate::layer::{DrawnShape, ShapeKind};
use crate::state::AppState;

/// Shape being drawn with one of the drawing tools.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawSession {
    tool: Option<ShapeKind>,
    vertices: Vec<Coord<f64>>,
    cursor: Option<Coord<f64>>,
}

impl DrawSession {
    /// Activates the tool, discarding any unfinished shape.
    pub fn start(&mut self, tool: ShapeKind) {
        self.tool = Some(tool);
        self.vertices.clear();
    }

    /// Deactivates the tool and discards the unfinished shape.
    pub fn cancel(&mut self) {
        self.tool = None;
        self.vertices.clear();
    }

    /// Active tool.
    pub fn tool(&self) -> Option<ShapeKind> {
        self.tool
    }

    /// True while a tool is active.
    pub fn is_active(&self) -> bool {
        self.tool.is_some()
    }

    /// Vertices placed so far, in lon/lat.
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Remembers the pointer position for the preview.
    pub fn set_cursor(&mut self, cursor: Option<Coord<f64>>) {
        self.cursor = cursor;
    }

    /// Places a vertex. Returns the shape if the vertex completes it.
    ///
    /// A marker is complete after one vertex and a rectangle after two. Lines and polygons are
    /// completed with [`DrawSession::finish`]. A vertex equal to the previous one is ignored, so
    /// the clicks of a double click add a single vertex.
    pub fn add_vertex(&mut self, vertex: Coord<f64>) -> Option<DrawnShape> {
        let tool = self.tool?;
        if self.vertices.last() == Some(&vertex) {
            return None;
        }

        self.vertices.push(vertex);
        match tool {
            ShapeKind::Marker => self.finish().ok().flatten(),
            ShapeKind::Rectangle if self.vertices.len() == 2 => self.finish().ok().flatten(),
            _ => None,
        }
    }

    /// Completes the shape and deactivates the tool.
    ///
    /// Returns `Ok(None)` if no tool is active. If there are not enough vertices the session is
    /// left as it is.
    pub fn finish(&mut self) -> Result<Option<DrawnShape>, ToolError> {
        let Some(tool) = self.tool else {
            return Ok(None);
        };

        let required = required_vertices(tool);
        if self.vertices.len() < required {
            return Err(ToolError::TooFewVertices {
                shape: tool.name(),
                required,
            });
        }

        let geometry = build_geometry(tool, &self.vertices);
        self.cancel();

        Ok(Some(DrawnShape::new(tool, geometry)))
    }

    /// Geometry of the unfinished shape with the pointer as its next vertex.
    pub fn preview(&self) -> Option<Geometry<f64>> {
        let tool = self.tool?;
        let mut vertices = self.vertices.clone();
        vertices.extend(self.cursor);

        match (tool, vertices.len()) {
            (_, 0) => None,
            (ShapeKind::Marker, _) | (_, 1) => Some(Point::from(vertices[0]).into()),
            (ShapeKind::Polygon, 2) => Some(LineString::new(vertices).into()),
            _ => Some(build_geometry(tool, &vertices)),
        }
    }
}

fn required_vertices(tool: ShapeKind) -> usize {
    match tool {
        ShapeKind::Polyline => 2,
        ShapeKind::Polygon => 3,
        ShapeKind::Rectangle => 2,
        ShapeKind::Marker => 1,
    }
}

fn build_geometry(tool: ShapeKind, vertices: &[Coord<f64>]) -> Geometry<f64> {
    match tool {
        ShapeKind::Polyline => LineString::new(vertices.to_vec()).into(),
        ShapeKind::Polygon => Polygon::new(LineString::new(vertices.to_vec()), vec![]).into(),
        ShapeKind::Rectangle => Rect::new(vertices[0], vertices[vertices.len() - 1])
            .to_polygon()
            .into(),
        ShapeKind::Marker => Point::from(vertices[0]).into(),
    }
}

/// Handles map clicks while a drawing tool is active.
///
/// Clicks place vertices and a double click finishes lines and polygons. While a tool is active
/// clicks do not reach the handlers after this one, so no feature query is made.
#[derive(Debug, Default, Copy, Clone)]
pub struct DrawController;

impl UserEventHandler for DrawController {
    fn handle(&self, event: &UserEvent, state: &mut AppState) -> EventPropagation {
        if !state.draw_session().is_active() {
            return EventPropagation::Propagate;
        }

        match event {
            UserEvent::Click(MouseButton::Left, e) => {
                if let Some(shape) = state.draw_session_mut().add_vertex(e.lonlat) {
                    state.on_shape_created(shape);
                }
                EventPropagation::Stop
            }
            UserEvent::DoubleClick(MouseButton::Left, _) => {
                if let Err(err) = state.finish_drawing() {
                    log::debug!("Shape was not finished on double click: {err}");
                }
                EventPropagation::Stop
            }
            UserEvent::PointerMoved(e) => {
                state.draw_session_mut().set_cursor(Some(e.lonlat));
                EventPropagation::Propagate
            }
            _ => EventPropagation::Propagate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtlasConfig;
    use crate::control::{MouseButtonState, MouseButtonsState, MouseEvent};
    use assert_matches::assert_matches;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn mouse_at(lonlat: Coord<f64>) -> MouseEvent {
        MouseEvent {
            screen_pointer_position: c(0.0, 0.0),
            lonlat,
            buttons: MouseButtonsState {
                left: MouseButtonState::Released,
                middle: MouseButtonState::Released,
                right: MouseButtonState::Released,
            },
        }
    }

    #[test]
    fn double_click_with_too_few_vertices_raises_alert() {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        state.start_drawing(ShapeKind::Polygon);
        for vertex in [c(85.0, 27.0), c(85.1, 27.0)] {
            DrawController.handle(&UserEvent::Click(MouseButton::Left, mouse_at(vertex)), &mut state);
        }

        let propagation = DrawController.handle(
            &UserEvent::DoubleClick(MouseButton::Left, mouse_at(c(85.1, 27.0))),
            &mut state,
        );

        assert_eq!(propagation, EventPropagation::Stop);
        assert_eq!(
            state.alert(),
            Some(&ToolError::TooFewVertices {
                shape: "polygon",
                required: 3
            })
        );
        assert!(state.draw_session().is_active());
        assert!(state.drawn().is_empty());
    }

    #[test]
    fn double_click_finishes_polyline() {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        state.start_drawing(ShapeKind::Polyline);
        for vertex in [c(85.0, 27.0), c(85.1, 27.0)] {
            DrawController.handle(&UserEvent::Click(MouseButton::Left, mouse_at(vertex)), &mut state);
        }

        DrawController.handle(
            &UserEvent::DoubleClick(MouseButton::Left, mouse_at(c(85.1, 27.0))),
            &mut state,
        );

        assert_eq!(state.drawn().len(), 1);
        assert_eq!(state.alert(), None);
        assert!(!state.draw_session().is_active());
    }

    #[test]
    fn marker_finishes_on_first_click() {
        let mut session = DrawSession::default();
        session.start(ShapeKind::Marker);

        let shape = session.add_vertex(c(85.0, 27.0)).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Marker);
        assert!(!session.is_active());
    }

    #[test]
    fn rectangle_takes_two_corners() {
        let mut session = DrawSession::default();
        session.start(ShapeKind::Rectangle);

        assert!(session.add_vertex(c(85.0, 27.0)).is_none());
        let shape = session.add_vertex(c(85.2, 27.1)).unwrap();
        let polygon = assert_matches!(crate::layer::Feature::geometry(&shape), Geometry::Polygon(p) => p.clone());
        assert_eq!(polygon.exterior().0.len(), 5);
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let mut session = DrawSession::default();
        session.start(ShapeKind::Polygon);
        session.add_vertex(c(0.0, 0.0));
        session.add_vertex(c(1.0, 0.0));
        session.add_vertex(c(1.0, 0.0));

        assert_eq!(
            session.finish(),
            Err(ToolError::TooFewVertices {
                shape: "polygon",
                required: 3
            })
        );
        assert!(session.is_active());

        session.add_vertex(c(1.0, 1.0));
        let shape = session.finish().unwrap().unwrap();
        assert_matches!(crate::layer::Feature::geometry(&shape), Geometry::Polygon(_));
    }

    #[test]
    fn polyline_preview_follows_cursor() {
        let mut session = DrawSession::default();
        session.start(ShapeKind::Polyline);
        session.add_vertex(c(0.0, 0.0));
        session.set_cursor(Some(c(2.0, 2.0)));

        assert_eq!(
            session.preview(),
            Some(LineString::new(vec![c(0.0, 0.0), c(2.0, 2.0)]).into())
        );

        session.cancel();
        assert_eq!(session.preview(), None);
    }
}
