//! Nepal atlas is an interactive map of Nepal's administrative boundaries. It shows a tile
//! basemap with three GeoJSON boundary overlays (districts, municipalities and wards), lets the
//! user click a boundary to see its attributes, draw shapes and measure them, and run buffer,
//! centroid and union operations on the drawn shapes.
//!
//! This crate contains everything except the window: the application state and its operations,
//! the data and tile loading, and the event handling. The desktop viewer in `nepal-atlas-egui`
//! renders the state and feeds user input into it.
//!
//! # Main components
//!
//! * [`AppState`] owns the [`MapView`], the [`layers`](layer), the drawn shapes, the result layers
//!   of the spatial operations and the panel contents. Every user operation is a method on it.
//! * [`loader`] fetches the three boundary files concurrently ([`loader::BoundaryLoad`]) and the
//!   basemap tiles ([`loader::TileLoader`]) on a tokio runtime.
//! * [`control`] converts raw pointer input into clicks, double clicks and drags and dispatches
//!   them to the drawing, query and map controllers.
//! * [`geometry`] measures shapes and computes buffers, centroids and unions.

pub mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod geometry;
pub mod info;
pub mod layer;
pub mod loader;
mod messenger;
pub mod projection;
pub mod state;
pub mod tile_schema;
pub mod view;

pub use color::Color;
pub use config::AtlasConfig;
pub use error::{AtlasError, ToolError};
pub use messenger::Messenger;
pub use state::{AppState, LoadStatus};
pub use tile_schema::{TileIndex, TileSchema};
pub use view::{MapView, Size};

pub use geo_types;
pub use geojson;
