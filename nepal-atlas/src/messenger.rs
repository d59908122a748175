/// Notifies the UI that the application state changed outside of the UI thread.
pub trait Messenger: Send + Sync {
    /// Asks the UI to draw a new frame.
    fn request_redraw(&self);
}
