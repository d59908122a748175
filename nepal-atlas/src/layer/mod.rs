//! Layers shown on the map: the tile basemap, boundary overlays, user drawings and the results of
//! spatial operations.

use serde::{Deserialize, Serialize};

use crate::color::Color;

pub mod attribution;
pub mod basemap;
pub mod boundary;
pub mod drawn;
pub mod feature;
pub mod feature_store;
pub mod result;

pub use basemap::{Basemap, Basemaps};
pub use boundary::{BoundaryLayer, OverlayKind, Overlays};
pub use drawn::{DrawnItems, DrawnShape, ShapeKind};
pub use feature::{BoundaryFeature, Feature};
pub use feature_store::{FeatureContainer, FeatureStore};
pub use result::{ResultKind, ResultLayer};

/// Stroke style of a vector layer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub weight: f32,
}

impl LayerStyle {
    /// Creates a new style.
    pub fn new(color: Color, weight: f32) -> Self {
        Self { color, weight }
    }
}
