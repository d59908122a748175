//! Shapes drawn by the user.

use geo_types::{Geometry, GeometryCollection};

use crate::layer::feature::Feature;
use crate::layer::feature_store::{FeatureContainer, FeatureStore};

/// Drawing tool a shape was created with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Open line through the clicked points.
    Polyline,
    /// Closed polygon through the clicked points.
    Polygon,
    /// Axis-aligned rectangle between two corners.
    Rectangle,
    /// Single point.
    Marker,
}

impl ShapeKind {
    /// Name of the tool in the toolbar.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Polyline => "polyline",
            Self::Polygon => "polygon",
            Self::Rectangle => "rectangle",
            Self::Marker => "marker",
        }
    }
}

/// Shape drawn by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
    kind: ShapeKind,
    geometry: Geometry<f64>,
}

impl DrawnShape {
    /// Creates a new shape.
    pub fn new(kind: ShapeKind, geometry: Geometry<f64>) -> Self {
        Self { kind, geometry }
    }

    /// Tool the shape was drawn with.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
}

impl Feature for DrawnShape {
    fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }
}

/// Collection of the shapes drawn by the user, in the order they were drawn.
#[derive(Debug, Clone, Default)]
pub struct DrawnItems {
    shapes: FeatureStore<DrawnShape>,
}

impl DrawnItems {
    /// Adds a shape to the end of the collection and returns its position.
    pub fn add(&mut self, shape: DrawnShape) -> usize {
        self.shapes.insert(shape)
    }

    /// Removes the shape at the given position.
    pub fn remove(&mut self, index: usize) -> Option<DrawnShape> {
        self.shapes.remove(index)
    }

    /// Removes all shapes.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Number of drawn shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// True if nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Returns the shape at the given position.
    pub fn get(&self, index: usize) -> Option<&DrawnShape> {
        self.shapes.get(index)
    }

    /// Iterates over the shapes in drawing order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureContainer<'_, DrawnShape>> {
        self.shapes.iter()
    }

    /// Geometries of all shapes in drawing order.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry<f64>> {
        self.shapes.features().map(|shape| shape.geometry())
    }

    /// All shapes combined into one geometry.
    pub fn combined(&self) -> GeometryCollection<f64> {
        GeometryCollection::new_from(self.geometries().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point};

    #[test]
    fn shapes_keep_drawing_order() {
        let mut items = DrawnItems::default();
        items.add(DrawnShape::new(ShapeKind::Marker, point!(x: 1.0, y: 2.0).into()));
        items.add(DrawnShape::new(
            ShapeKind::Polyline,
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into(),
        ));

        let kinds: Vec<_> = items.iter().map(|c| c.as_ref().kind()).collect();
        assert_eq!(kinds, vec![ShapeKind::Marker, ShapeKind::Polyline]);
        assert_eq!(items.combined().0.len(), 2);

        items.remove(0);
        assert_eq!(items.get(0).map(DrawnShape::kind), Some(ShapeKind::Polyline));
    }
}
