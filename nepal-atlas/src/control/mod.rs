//! Interactivity of the atlas map.
//!
//! User interaction handling is done in several steps:
//! 1. The UI toolkit event is converted to a common [`RawUserEvent`] enum.
//! 2. `RawUserEvent` is given to the [`EventProcessor`], that converts it into a [`UserEvent`].
//!    `EventProcessor` keeps track of input state (pointer position and pressed mouse buttons) and
//!    recognizes clicks, double clicks and drags.
//! 3. `EventProcessor` has a list of [`UserEventHandler`]s, which change the [`AppState`] based on
//!    the events. Handlers are called in the order they were added until one of them stops the
//!    event.

use geo_types::Coord;

use crate::state::AppState;

mod draw;
mod event_processor;
mod map;
mod query;

pub use draw::{DrawController, DrawSession};
pub use event_processor::EventProcessor;
pub use map::{MapController, MapControllerConfiguration};
pub use query::QueryController;

/// User input handler.
pub trait UserEventHandler {
    /// Handle the event.
    fn handle(&self, event: &UserEvent, state: &mut AppState) -> EventPropagation;
}

impl<T: Fn(&UserEvent, &mut AppState) -> EventPropagation> UserEventHandler for T {
    fn handle(&self, event: &UserEvent, state: &mut AppState) -> EventPropagation {
        self(event, state)
    }
}

/// Raw user interaction event, without any input state information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawUserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton),
    /// A mouse button was released.
    ButtonReleased(MouseButton),
    /// Mouse pointer was moved to the given screen pixel position.
    PointerMoved(Coord<f64>),
    /// Scroll by the given number of text lines. Positive values scroll up.
    Scroll(f64),
}

/// User interaction event given to the [`UserEventHandler`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton, MouseEvent),
    /// A mouse button was released.
    ButtonReleased(MouseButton, MouseEvent),
    /// A mouse button was clicked. Fired right after [`UserEvent::ButtonReleased`] if the button
    /// was released shortly after it was pressed.
    Click(MouseButton, MouseEvent),
    /// Fired right after the second [`UserEvent::Click`] if it came shortly after the first one.
    DoubleClick(MouseButton, MouseEvent),
    /// Mouse pointer moved.
    PointerMoved(MouseEvent),
    /// The pointer moved with a button pressed further than the drag threshold.
    DragStarted(MouseButton, MouseEvent),
    /// Pointer moved by the given number of pixels during a drag. Only sent to the handler that
    /// consumed [`UserEvent::DragStarted`].
    Drag(MouseButton, Coord<f64>, MouseEvent),
    /// Mouse button was released while dragging.
    DragEnded(MouseButton, MouseEvent),
    /// Scroll by the given number of text lines.
    Scroll(f64, MouseEvent),
}

/// Value returned by an [`UserEventHandler`] to indicate the status of the event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// Event should be propagated to the next handler.
    Propagate,
    /// Event should not be propagated to the next handler.
    Stop,
    /// Event should not be propagated, and the current handler becomes the owner of the drag
    /// started by [`UserEvent::DragStarted`].
    Consume,
}

/// Mouse button enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button.
    Other,
}

/// State of the mouse at the moment of the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Pointer position on the screen in pixels from the top-left corner of the map.
    pub screen_pointer_position: Coord<f64>,
    /// Lon/lat coordinate under the pointer.
    pub lonlat: Coord<f64>,
    /// State of the mouse buttons.
    pub buttons: MouseButtonsState,
}

/// State of a mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButtonState {
    /// Button is pressed.
    Pressed,
    /// Button is not pressed.
    Released,
}

/// State of all mouse buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseButtonsState {
    /// State of the left mouse button.
    pub left: MouseButtonState,
    /// State of the middle mouse button.
    pub middle: MouseButtonState,
    /// State of the right mouse button.
    pub right: MouseButtonState,
}

impl MouseButtonsState {
    pub(crate) fn set_pressed(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Pressed);
    }

    pub(crate) fn set_released(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Released);
    }

    fn set_state(&mut self, button: MouseButton, state: MouseButtonState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
            MouseButton::Other => {}
        }
    }

    fn single_pressed(&self) -> Option<MouseButton> {
        let pressed: Vec<_> = [
            (self.left, MouseButton::Left),
            (self.middle, MouseButton::Middle),
            (self.right, MouseButton::Right),
        ]
        .into_iter()
        .filter(|(state, _)| *state == MouseButtonState::Pressed)
        .map(|(_, button)| button)
        .collect();

        match pressed[..] {
            [button] => Some(button),
            _ => None,
        }
    }
}

impl Default for MouseButtonsState {
    fn default() -> Self {
        Self {
            left: MouseButtonState::Released,
            middle: MouseButtonState::Released,
            right: MouseButtonState::Released,
        }
    }
}
