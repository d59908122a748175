//! Position, zoom and size of the map view and the conversion between screen pixels and
//! geographic coordinates.

use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::projection::WebMercator;

/// Resolution (meters per pixel) of zoom level 0 with 256 pixel tiles.
pub const TOP_RESOLUTION: f64 = 156_543.033_928_000_14;

/// Size of the map viewport in pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Half of the width.
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Half of the height.
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// True if any of the dimensions is zero or not a finite number.
    pub fn is_zero(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// What part of the map is displayed.
///
/// The view is defined in the Web Mercator plane: `center` is in projected meters, `resolution`
/// is the number of meters in one screen pixel. Screen coordinates are pixels from the top-left
/// corner of the map area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    center: Coord<f64>,
    resolution: f64,
    size: Size,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Coord { x: 0.0, y: 0.0 },
            resolution: TOP_RESOLUTION,
            size: Size::default(),
        }
    }
}

impl MapView {
    /// Creates a view centered at the given lon/lat coordinate with the given zoom level.
    pub fn new(center: Coord<f64>, zoom: f64) -> Self {
        Self::default().with_center(center).with_zoom(zoom)
    }

    /// Resolution of the given (possibly fractional) zoom level.
    pub fn zoom_resolution(zoom: f64) -> f64 {
        TOP_RESOLUTION / 2f64.powf(zoom)
    }

    /// Center of the view in projected meters.
    pub fn center(&self) -> Coord<f64> {
        self.center
    }

    /// Center of the view as a lon/lat coordinate.
    pub fn center_lonlat(&self) -> Coord<f64> {
        WebMercator::default().unproject(self.center)
    }

    /// Returns a copy of the view centered at the given lon/lat coordinate.
    pub fn with_center(&self, lonlat: Coord<f64>) -> Self {
        match WebMercator::default().project(lonlat) {
            Some(center) => Self { center, ..*self },
            None => *self,
        }
    }

    /// Meters per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns a copy of the view with the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..*self
        }
    }

    /// Fractional zoom level of the current resolution.
    pub fn zoom(&self) -> f64 {
        (TOP_RESOLUTION / self.resolution).log2()
    }

    /// Returns a copy of the view with the resolution of the given zoom level.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        self.with_resolution(Self::zoom_resolution(zoom))
    }

    /// Returns a copy of the view with the zoom level limited to the given range.
    pub fn clamp_zoom(&self, min_zoom: f64, max_zoom: f64) -> Self {
        let zoom = self.zoom();
        if zoom < min_zoom {
            self.with_zoom(min_zoom)
        } else if zoom > max_zoom {
            self.with_zoom(max_zoom)
        } else {
            *self
        }
    }

    /// Size of the viewport.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the given viewport size.
    pub fn with_size(&self, new_size: Size) -> Self {
        Self {
            size: new_size,
            ..*self
        }
    }

    /// Converts a screen pixel position into projected meters.
    pub fn screen_to_map(&self, px_position: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.center.x + (px_position.x - self.size.half_width()) * self.resolution,
            y: self.center.y + (self.size.half_height() - px_position.y) * self.resolution,
        }
    }

    /// Converts projected meters into a screen pixel position.
    pub fn map_to_screen(&self, position: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (position.x - self.center.x) / self.resolution + self.size.half_width(),
            y: self.size.half_height() - (position.y - self.center.y) / self.resolution,
        }
    }

    /// Converts a screen pixel position into a lon/lat coordinate.
    pub fn screen_to_lonlat(&self, px_position: Coord<f64>) -> Coord<f64> {
        WebMercator::default().unproject(self.screen_to_map(px_position))
    }

    /// Converts a lon/lat coordinate into a screen pixel position.
    pub fn lonlat_to_screen(&self, lonlat: Coord<f64>) -> Option<Coord<f64>> {
        WebMercator::default()
            .project(lonlat)
            .map(|projected| self.map_to_screen(projected))
    }

    /// Projected bounding rectangle of the viewport. `None` if the viewport has no size.
    pub fn map_bounds(&self) -> Option<Rect<f64>> {
        if self.size.is_zero() {
            return None;
        }

        Some(Rect::new(
            self.screen_to_map(Coord { x: 0.0, y: 0.0 }),
            self.screen_to_map(Coord {
                x: self.size.width(),
                y: self.size.height(),
            }),
        ))
    }

    /// Lon/lat bounding rectangle of the viewport. `None` if the viewport has no size.
    pub fn visible_bounds(&self) -> Option<Rect<f64>> {
        let bounds = self.map_bounds()?;
        let projection = WebMercator::default();
        Some(Rect::new(
            projection.unproject(bounds.min()),
            projection.unproject(bounds.max()),
        ))
    }

    /// Moves the view so that the map point under `from` screen position ends up under `to`.
    pub fn translate_by_pixels(&self, from: Coord<f64>, to: Coord<f64>) -> Self {
        let from_projected = self.screen_to_map(from);
        let to_projected = self.screen_to_map(to);
        Self {
            center: self.center - (to_projected - from_projected),
            ..*self
        }
    }

    /// Multiplies the resolution by `zoom`, keeping the map point under `base_point` in place.
    pub fn zoom_around(&self, zoom: f64, base_point: Coord<f64>) -> Self {
        let base_point = self.screen_to_map(base_point);
        Self {
            center: base_point + (self.center - base_point) * zoom,
            resolution: self.resolution * zoom,
            ..*self
        }
    }

    /// Returns a view that shows the whole lon/lat rectangle.
    ///
    /// The rectangle is centered and fills the viewport along its limiting axis. If the viewport
    /// has no size yet, or the rectangle has no extent, only the center is changed.
    pub fn fit_bounds(&self, bounds: Rect<f64>) -> Self {
        let projection = WebMercator::default();
        let (Some(min), Some(max)) = (
            projection.project(bounds.min()),
            projection.project(bounds.max()),
        ) else {
            return *self;
        };

        let center = Coord {
            x: (min.x + max.x) / 2.0,
            y: (min.y + max.y) / 2.0,
        };

        if self.size.is_zero() {
            return Self { center, ..*self };
        }

        let resolution =
            ((max.x - min.x) / self.size.width()).max((max.y - min.y) / self.size.height());
        if resolution > 0.0 && resolution.is_finite() {
            Self {
                center,
                resolution,
                ..*self
            }
        } else {
            Self { center, ..*self }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn coord(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn screen_to_map_size() {
        let view = MapView::default()
            .with_resolution(1.0)
            .with_size(Size::new(100.0, 100.0));

        assert_abs_diff_eq!(
            view.screen_to_map(coord(0.0, 0.0)),
            coord(-50.0, 50.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(coord(50.0, 50.0)),
            coord(0.0, 0.0),
            epsilon = 0.0001,
        );

        let view = view.with_size(Size::new(200.0, 50.0));
        assert_abs_diff_eq!(
            view.screen_to_map(coord(25.0, 49.0)),
            coord(-75.0, -24.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn screen_to_map_resolution() {
        let view = MapView::default()
            .with_resolution(2.0)
            .with_size(Size::new(100.0, 100.0));

        assert_abs_diff_eq!(
            view.screen_to_map(coord(0.0, 0.0)),
            coord(-100.0, 100.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(coord(100.0, 100.0)),
            coord(100.0, -100.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn map_to_screen_inverts_screen_to_map() {
        let view = MapView::new(coord(84.124, 28.3949), 7.0).with_size(Size::new(640.0, 480.0));
        let px = coord(13.0, 411.0);
        assert_abs_diff_eq!(
            view.map_to_screen(view.screen_to_map(px)),
            px,
            epsilon = 1e-6
        );
    }

    #[test]
    fn translate_keeps_point_under_cursor() {
        let view = MapView::default()
            .with_resolution(10.0)
            .with_size(Size::new(100.0, 100.0));
        let grabbed = view.screen_to_map(coord(10.0, 10.0));
        let moved = view.translate_by_pixels(coord(10.0, 10.0), coord(40.0, 70.0));
        assert_abs_diff_eq!(moved.screen_to_map(coord(40.0, 70.0)), grabbed, epsilon = 1e-6);
    }

    #[test]
    fn zoom_around_keeps_base_point() {
        let view = MapView::default()
            .with_resolution(10.0)
            .with_size(Size::new(100.0, 100.0));
        let base = coord(80.0, 20.0);
        let anchor = view.screen_to_map(base);
        let zoomed = view.zoom_around(0.5, base);
        assert_abs_diff_eq!(zoomed.resolution(), 5.0);
        assert_abs_diff_eq!(zoomed.screen_to_map(base), anchor, epsilon = 1e-6);
    }

    #[test]
    fn zoom_levels() {
        let view = MapView::default().with_zoom(7.0);
        assert_abs_diff_eq!(view.zoom(), 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(view.resolution(), TOP_RESOLUTION / 128.0, epsilon = 1e-9);
        assert_abs_diff_eq!(view.clamp_zoom(0.0, 5.0).zoom(), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(view.clamp_zoom(8.0, 19.0).zoom(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn fit_bounds_shows_whole_rect() {
        let bounds = Rect::new(coord(80.06, 26.35), coord(88.2, 30.45));
        let view = MapView::default()
            .with_size(Size::new(800.0, 600.0))
            .fit_bounds(bounds);

        let visible = view.visible_bounds().unwrap();
        assert!(visible.min().x <= bounds.min().x + 1e-9);
        assert!(visible.min().y <= bounds.min().y + 1e-9);
        assert!(visible.max().x >= bounds.max().x - 1e-9);
        assert!(visible.max().y >= bounds.max().y - 1e-9);

        // Nepal is wider than tall, so longitude is the limiting axis.
        assert_abs_diff_eq!(visible.min().x, bounds.min().x, epsilon = 1e-9);
        assert_abs_diff_eq!(visible.max().x, bounds.max().x, epsilon = 1e-9);
    }

    #[test]
    fn fit_bounds_without_size_only_centers() {
        let bounds = Rect::new(coord(10.0, 10.0), coord(20.0, 20.0));
        let view = MapView::default().fit_bounds(bounds);
        assert_abs_diff_eq!(view.resolution(), TOP_RESOLUTION);
        assert_abs_diff_eq!(view.center_lonlat().x, 15.0, epsilon = 1e-9);
        assert!(view.visible_bounds().is_none());
    }
}
