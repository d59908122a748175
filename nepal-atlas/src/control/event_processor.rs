use std::time::Duration;

use geo_types::Coord;
use web_time::Instant;

use crate::control::{
    EventPropagation, MouseButton, MouseButtonsState, MouseEvent, RawUserEvent, UserEvent,
    UserEventHandler,
};
use crate::state::AppState;

const DRAG_THRESHOLD: f64 = 3.0;
const CLICK_TIMEOUT: Duration = Duration::from_millis(200);
const DBL_CLICK_TIMEOUT: Duration = Duration::from_millis(500);

/// Converts raw input into user events and dispatches them to the handlers.
pub struct EventProcessor {
    handlers: Vec<Box<dyn UserEventHandler>>,
    pointer_position: Coord<f64>,
    pointer_pressed_position: Coord<f64>,

    buttons_state: MouseButtonsState,

    last_pressed_time: Option<Instant>,
    last_click_time: Option<Instant>,

    drag_started: bool,
    drag_target: Option<usize>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            handlers: vec![],
            pointer_position: Coord { x: 0.0, y: 0.0 },
            pointer_pressed_position: Coord { x: 0.0, y: 0.0 },
            buttons_state: MouseButtonsState::default(),
            last_pressed_time: None,
            last_click_time: None,
            drag_started: false,
            drag_target: None,
        }
    }
}

impl std::fmt::Debug for EventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProcessor")
            .field("handlers", &self.handlers.len())
            .field("pointer_position", &self.pointer_position)
            .field("drag_target", &self.drag_target)
            .finish()
    }
}

impl EventProcessor {
    /// Adds a handler to the end of the list.
    pub fn add_handler(&mut self, handler: impl UserEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// True while a drag started over the map is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_started
    }

    /// Processes the raw event and dispatches the resulting user events.
    pub fn handle(&mut self, event: RawUserEvent, state: &mut AppState) {
        self.handle_at(event, state, Instant::now());
    }

    pub(crate) fn handle_at(&mut self, event: RawUserEvent, state: &mut AppState, now: Instant) {
        for user_event in self.process(event, state, now) {
            self.dispatch(user_event, state);
        }
    }

    fn dispatch(&mut self, user_event: UserEvent, state: &mut AppState) {
        let mut drag_start_target = None;

        for (index, handler) in self.handlers.iter().enumerate() {
            if matches!(user_event, UserEvent::Drag(..) | UserEvent::DragEnded(..))
                && self.drag_target != Some(index)
            {
                continue;
            }

            match handler.handle(&user_event, state) {
                EventPropagation::Propagate => {}
                EventPropagation::Stop => break,
                EventPropagation::Consume => {
                    if let UserEvent::DragStarted(button, _) = user_event {
                        drag_start_target = Some(index);

                        let delta = self.pointer_position - self.pointer_pressed_position;
                        let mouse_event = self.get_mouse_event(state);
                        handler.handle(&UserEvent::Drag(button, delta, mouse_event), state);
                    }

                    break;
                }
            }
        }

        if drag_start_target.is_some() {
            self.drag_target = drag_start_target;
        }

        if matches!(user_event, UserEvent::DragEnded(..)) {
            self.drag_target = None;
        }
    }

    fn process(&mut self, event: RawUserEvent, state: &AppState, now: Instant) -> Vec<UserEvent> {
        match event {
            RawUserEvent::ButtonPressed(button) => {
                self.buttons_state.set_pressed(button);
                self.last_pressed_time = Some(now);
                self.pointer_pressed_position = self.pointer_position;
                self.drag_started = false;

                vec![UserEvent::ButtonPressed(button, self.get_mouse_event(state))]
            }
            RawUserEvent::ButtonReleased(button) => {
                self.buttons_state.set_released(button);
                let mouse_event = self.get_mouse_event(state);
                let mut events = vec![UserEvent::ButtonReleased(button, mouse_event)];

                if std::mem::take(&mut self.drag_started) {
                    if self.drag_target.is_some() {
                        events.push(UserEvent::DragEnded(button, mouse_event));
                    }
                    return events;
                }

                if elapsed(self.last_pressed_time, now) < CLICK_TIMEOUT {
                    events.push(UserEvent::Click(button, mouse_event));

                    if elapsed(self.last_click_time, now) < DBL_CLICK_TIMEOUT {
                        events.push(UserEvent::DoubleClick(button, mouse_event));
                        self.last_click_time = None;
                    } else {
                        self.last_click_time = Some(now);
                    }
                }

                events
            }
            RawUserEvent::PointerMoved(position) => {
                let prev_position = self.pointer_position;
                self.pointer_position = position;

                let mut events = vec![UserEvent::PointerMoved(self.get_mouse_event(state))];
                if let Some(button) = self.buttons_state.single_pressed() {
                    if !self.drag_started
                        && taxicab_distance(position, self.pointer_pressed_position)
                            > DRAG_THRESHOLD
                    {
                        self.drag_started = true;
                        events.push(UserEvent::DragStarted(
                            button,
                            self.get_mouse_event_pos(state, self.pointer_pressed_position),
                        ));
                    } else if self.drag_target.is_some() {
                        events.push(UserEvent::Drag(
                            button,
                            position - prev_position,
                            self.get_mouse_event(state),
                        ));
                    }
                }

                events
            }
            RawUserEvent::Scroll(delta) => {
                vec![UserEvent::Scroll(delta, self.get_mouse_event(state))]
            }
        }
    }

    fn get_mouse_event(&self, state: &AppState) -> MouseEvent {
        self.get_mouse_event_pos(state, self.pointer_position)
    }

    fn get_mouse_event_pos(&self, state: &AppState, screen_pointer_position: Coord<f64>) -> MouseEvent {
        MouseEvent {
            screen_pointer_position,
            lonlat: state.view().screen_to_lonlat(screen_pointer_position),
            buttons: self.buttons_state,
        }
    }
}

fn elapsed(since: Option<Instant>, now: Instant) -> Duration {
    since
        .map(|since| now.saturating_duration_since(since))
        .unwrap_or(Duration::MAX)
}

fn taxicab_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
