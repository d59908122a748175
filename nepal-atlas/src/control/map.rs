use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::state::AppState;

/// Configuration of a [`MapController`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MapControllerConfiguration {
    zoom_speed: f64,
}

impl Default for MapControllerConfiguration {
    fn default() -> Self {
        Self { zoom_speed: 0.2 }
    }
}

impl MapControllerConfiguration {
    /// Magnitude of the zoom on every mouse wheel turn.
    ///
    /// For example, the value of `0.2` means, that every time the mouse wheel is turned, the map
    /// will be zoomed by 0.2 times.
    pub fn zoom_speed(&self) -> f64 {
        self.zoom_speed
    }
}

/// Event handler of a map, providing panning and zooming.
///
/// Zoom is kept within the range of the active basemap by [`AppState::set_view`].
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct MapController {
    config: MapControllerConfiguration,
}

impl MapController {
    /// Creates a new instance of `MapController` with the given configuration.
    pub fn new(config: MapControllerConfiguration) -> Self {
        Self { config }
    }

    /// Returns the current configuration of the controller.
    pub fn config(&self) -> MapControllerConfiguration {
        self.config
    }

    fn get_zoom(&self, delta: f64) -> f64 {
        (self.config.zoom_speed + 1.0).powf(-delta)
    }
}

impl UserEventHandler for MapController {
    fn handle(&self, event: &UserEvent, state: &mut AppState) -> EventPropagation {
        match event {
            UserEvent::DragStarted(button, _)
                if *button == MouseButton::Left || *button == MouseButton::Middle =>
            {
                EventPropagation::Consume
            }
            UserEvent::Drag(_, delta, e) => {
                let current_position = e.screen_pointer_position;
                let prev_position = current_position - *delta;
                let target = state
                    .view()
                    .translate_by_pixels(prev_position, current_position);
                state.set_view(target);

                EventPropagation::Stop
            }
            UserEvent::Scroll(delta, mouse_event) => {
                let zoom = self.get_zoom(*delta);
                let target = state
                    .view()
                    .zoom_around(zoom, mouse_event.screen_pointer_position);
                state.set_view(target);

                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtlasConfig;
    use crate::control::{MouseButtonsState, MouseEvent};
    use crate::view::Size;
    use approx::assert_relative_eq;
    use geo_types::Coord;

    fn mouse_at(x: f64, y: f64) -> MouseEvent {
        MouseEvent {
            screen_pointer_position: Coord { x, y },
            lonlat: Coord { x: 0.0, y: 0.0 },
            buttons: MouseButtonsState::default(),
        }
    }

    fn state() -> AppState {
        let mut state = AppState::new(AtlasConfig::default()).unwrap();
        state.set_view_size(Size::new(800.0, 600.0));
        state
    }

    #[test]
    fn scroll_up_zooms_in() {
        let mut state = state();
        let before = state.view().resolution();

        let propagation =
            MapController::default().handle(&UserEvent::Scroll(1.0, mouse_at(400.0, 300.0)), &mut state);

        assert_eq!(propagation, EventPropagation::Stop);
        assert_relative_eq!(state.view().resolution(), before / 1.2, max_relative = 1e-9);
    }

    #[test]
    fn zoom_is_limited_by_basemap() {
        let mut state = state();
        let controller = MapController::default();
        for _ in 0..200 {
            controller.handle(&UserEvent::Scroll(5.0, mouse_at(400.0, 300.0)), &mut state);
        }

        assert!(state.view().zoom() <= 19.0 + 1e-9);
    }

    #[test]
    fn drag_moves_map_with_pointer() {
        let mut state = state();
        let controller = MapController::default();
        let under_pointer = state.view().screen_to_lonlat(Coord { x: 100.0, y: 100.0 });

        controller.handle(
            &UserEvent::Drag(MouseButton::Left, Coord { x: 50.0, y: 20.0 }, mouse_at(150.0, 120.0)),
            &mut state,
        );

        let moved = state.view().screen_to_lonlat(Coord { x: 150.0, y: 120.0 });
        assert_relative_eq!(moved.x, under_pointer.x, epsilon = 1e-9);
        assert_relative_eq!(moved.y, under_pointer.y, epsilon = 1e-9);
    }
}
