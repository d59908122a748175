//! XYZ tile indexing of the Web Mercator plane.

use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::projection::WebMercator;
use crate::view::{MapView, TOP_RESOLUTION};

/// Index of a tile in the XYZ scheme. Rows go from top to bottom.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    /// Zoom level.
    pub z: u32,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl TileIndex {
    /// Creates a new index.
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

/// Tiling of the Web Mercator world into square tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSchema {
    tile_size: u32,
    min_zoom: u32,
    max_zoom: u32,
}

impl TileSchema {
    /// Standard web tiling with 256 pixel tiles and zoom levels from 0 to `max_zoom`.
    pub fn web(max_zoom: u32) -> Self {
        Self {
            tile_size: 256,
            min_zoom: 0,
            max_zoom,
        }
    }

    /// Tile width and height in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Maximum zoom level provided by the tile source.
    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Resolution of the tiles on the given zoom level.
    pub fn lod_resolution(&self, z: u32) -> f64 {
        TOP_RESOLUTION * 256.0 / self.tile_size as f64 / 2f64.powi(z as i32)
    }

    /// Selects the zoom level whose resolution is the closest to the given one.
    pub fn select_zoom(&self, resolution: f64) -> Option<u32> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return None;
        }

        let zoom = (self.lod_resolution(0) / resolution).log2().round();
        Some((zoom.max(0.0) as u32).clamp(self.min_zoom, self.max_zoom))
    }

    /// Projected bounds of the tile.
    pub fn tile_bounds(&self, index: TileIndex) -> Rect<f64> {
        let half_extent = WebMercator::default().half_extent();
        let tile_span = 2.0 * half_extent / 2f64.powi(index.z as i32);

        let x_min = -half_extent + index.x as f64 * tile_span;
        let y_max = half_extent - index.y as f64 * tile_span;

        Rect::new(
            Coord { x: x_min, y: y_max },
            Coord {
                x: x_min + tile_span,
                y: y_max - tile_span,
            },
        )
    }

    /// Iterates over the tiles covering the view. Returns `None` if the view has no size.
    pub fn iter_tiles(&self, view: &MapView) -> Option<impl Iterator<Item = TileIndex>> {
        let z = self.select_zoom(view.resolution())?;
        let bounds = view.map_bounds()?;

        let half_extent = WebMercator::default().half_extent();
        let tiles_count = 1u64 << z;
        let tile_span = 2.0 * half_extent / tiles_count as f64;
        let last = (tiles_count - 1) as f64;

        let to_index = |value: f64| (value / tile_span).floor().clamp(0.0, last) as u32;

        let x_min = to_index(bounds.min().x + half_extent);
        let x_max = to_index(bounds.max().x + half_extent);
        let y_min = to_index(half_extent - bounds.max().y);
        let y_max = to_index(half_extent - bounds.min().y);

        Some((y_min..=y_max).flat_map(move |y| (x_min..=x_max).map(move |x| TileIndex { z, x, y })))
    }
}
