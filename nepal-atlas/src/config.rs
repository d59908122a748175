//! Configuration of the atlas, read from a JSON file.

use std::path::{Path, PathBuf};

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::AtlasError;
use crate::layer::{Basemap, LayerStyle, OverlayKind};

const DATA_BASE_URL: &str = "https://raw.githubusercontent.com/mesaugat/geoJSON-Nepal/master";

/// Settings of the atlas.
///
/// Every field is optional in the file, missing fields take the values of [`AtlasConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// View shown on startup, before the boundaries are loaded.
    pub initial_view: InitialView,
    /// Basemaps in the order they are listed. The first one is active on startup.
    pub basemaps: Vec<Basemap>,
    /// Sources of the boundary overlays.
    pub overlays: OverlaySources,
    /// Range of the buffer distance slider.
    pub buffer: BufferRange,
    /// Folder for downloaded tiles and data. Nothing is cached if not set.
    pub cache_dir: Option<PathBuf>,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            initial_view: InitialView::default(),
            basemaps: vec![
                Basemap::osm(),
                Basemap::world_imagery(),
                Basemap::stamen_toner(),
            ],
            overlays: OverlaySources::default(),
            buffer: BufferRange::default(),
            cache_dir: None,
            user_agent: format!("nepal-atlas/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AtlasConfig {
    /// Reads the configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|err| AtlasError::Config(format!("{path:?}: {err}")))?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), AtlasError> {
        if self.basemaps.is_empty() {
            return Err(AtlasError::Config("at least one basemap is required".into()));
        }

        let BufferRange {
            min_km,
            max_km,
            default_km,
            ..
        } = self.buffer;
        if !(0.0 <= min_km && min_km <= default_km && default_km <= max_km) {
            return Err(AtlasError::Config(format!(
                "buffer range must satisfy 0 <= min <= default <= max, got {min_km}..{max_km} with default {default_km}"
            )));
        }

        Ok(())
    }
}

/// Initial map position.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
    /// Latitude of the center.
    pub latitude: f64,
    /// Longitude of the center.
    pub longitude: f64,
    /// Zoom level.
    pub zoom: f64,
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            latitude: 28.3949,
            longitude: 84.1240,
            zoom: 7.0,
        }
    }
}

impl InitialView {
    /// Center as a lon/lat coordinate.
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// Where a boundary layer is loaded from and how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySource {
    /// Url of the GeoJSON file.
    pub url: String,
    /// Stroke style.
    pub style: LayerStyle,
}

impl OverlaySource {
    fn new(file_name: &str, color: Color, weight: f32) -> Self {
        Self {
            url: format!("{DATA_BASE_URL}/{file_name}"),
            style: LayerStyle::new(color, weight),
        }
    }
}

/// Sources of the three boundary layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySources {
    /// District boundaries.
    pub districts: OverlaySource,
    /// Municipality boundaries.
    pub municipalities: OverlaySource,
    /// Ward boundaries.
    pub wards: OverlaySource,
}

impl Default for OverlaySources {
    fn default() -> Self {
        Self {
            districts: OverlaySource::new("nepal-districts.geojson", Color::DARK_RED, 1.0),
            municipalities: OverlaySource::new(
                "nepal-municipalities.geojson",
                Color::DARK_BLUE,
                1.0,
            ),
            wards: OverlaySource::new("nepal-wards.geojson", Color::DARK_GREEN, 0.8),
        }
    }
}

impl OverlaySources {
    /// Source of the given layer.
    pub fn get(&self, kind: OverlayKind) -> &OverlaySource {
        match kind {
            OverlayKind::District => &self.districts,
            OverlayKind::Municipality => &self.municipalities,
            OverlayKind::Ward => &self.wards,
        }
    }
}

/// Range and initial value of the buffer distance slider, in kilometres.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferRange {
    /// Smallest distance.
    pub min_km: f64,
    /// Largest distance.
    pub max_km: f64,
    /// Slider step.
    pub step_km: f64,
    /// Distance selected on startup.
    pub default_km: f64,
}

impl Default for BufferRange {
    fn default() -> Self {
        Self {
            min_km: 0.0,
            max_km: 50.0,
            step_km: 1.0,
            default_km: 1.0,
        }
    }
}
