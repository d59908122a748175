use geo_types::Point;

use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::state::AppState;

/// Queries the active boundary layer at the clicked location.
#[derive(Debug, Default, Copy, Clone)]
pub struct QueryController;

impl UserEventHandler for QueryController {
    fn handle(&self, event: &UserEvent, state: &mut AppState) -> EventPropagation {
        match event {
            UserEvent::Click(MouseButton::Left, e) if state.query_layer().is_some() => {
                state.handle_click(Point::from(e.lonlat));
                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}
