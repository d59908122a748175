//! Layers produced by the spatial operations.

use geo_types::Geometry;

use crate::color::Color;
use crate::layer::LayerStyle;

/// Spatial operation that produced a result layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// Buffer around the drawn shapes.
    Buffer,
    /// Centroid marker of the drawn shapes.
    Centroid,
    /// Union of the first two drawn shapes.
    Union,
}

impl ResultKind {
    /// Style the results of this operation are drawn with.
    pub fn style(&self) -> LayerStyle {
        match self {
            Self::Buffer => LayerStyle::new(Color::HOT_PINK, 3.0),
            Self::Centroid => LayerStyle::new(Color::DRAW_BLUE, 3.0),
            Self::Union => LayerStyle::new(Color::ORANGE, 3.0),
        }
    }

    /// Title of the layer. Markers show it on hover.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Buffer => "Buffer",
            Self::Centroid => "Centroid",
            Self::Union => "Union",
        }
    }
}

/// Layer added to the map by a spatial operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultLayer {
    kind: ResultKind,
    geometries: Vec<Geometry<f64>>,
}

impl ResultLayer {
    /// Creates a new result layer.
    pub fn new(kind: ResultKind, geometries: Vec<Geometry<f64>>) -> Self {
        Self { kind, geometries }
    }

    /// Operation that produced the layer.
    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    /// Resulting geometries in lon/lat.
    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    /// Style of the layer.
    pub fn style(&self) -> LayerStyle {
        self.kind.style()
    }
}
