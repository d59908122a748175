//! Tile basemaps the user can choose from.

use serde::{Deserialize, Serialize};

use crate::layer::attribution::Attribution;
use crate::tile_schema::{TileIndex, TileSchema};

fn default_subdomains() -> Vec<String> {
    ["a", "b", "c"].map(String::from).to_vec()
}

/// Raster tile basemap served from a `{z}/{x}/{y}` url template.
///
/// The template may contain `{s}`, which is replaced by one of the `subdomains` chosen by the tile
/// position, so that requests are spread over several hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basemap {
    name: String,
    url_template: String,
    max_zoom: u32,
    attribution: Attribution,
    #[serde(default = "default_subdomains")]
    subdomains: Vec<String>,
}

impl Basemap {
    /// Creates a basemap with `a`, `b`, `c` subdomains.
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        max_zoom: u32,
        attribution: Attribution,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            max_zoom,
            attribution,
            subdomains: default_subdomains(),
        }
    }

    /// OpenStreetMap standard tiles.
    pub fn osm() -> Self {
        Self::new(
            "OpenStreetMap",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            19,
            Attribution::new(
                "© OpenStreetMap",
                Some("https://www.openstreetmap.org/copyright".to_string()),
            ),
        )
    }

    /// Esri World Imagery satellite tiles.
    pub fn world_imagery() -> Self {
        Self::new(
            "World Imagery",
            "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            17,
            Attribution::new("Tiles © Esri", None),
        )
    }

    /// Stamen Toner black and white tiles.
    pub fn stamen_toner() -> Self {
        Self::new(
            "Stamen Toner",
            "https://{s}.tile.stamen.com/toner/{z}/{x}/{y}.png",
            20,
            Attribution::new("© Stamen", None),
        )
    }

    /// Name shown in the layer control.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum zoom level the source serves.
    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Credit for the tiles.
    pub fn attribution(&self) -> &Attribution {
        &self.attribution
    }

    /// Tiling used by the source.
    pub fn tile_schema(&self) -> TileSchema {
        TileSchema::web(self.max_zoom)
    }

    /// Url of the given tile.
    pub fn tile_url(&self, index: TileIndex) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let position = (index.x as usize + index.y as usize) % self.subdomains.len();
            &self.subdomains[position]
        };

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &index.z.to_string())
            .replace("{x}", &index.x.to_string())
            .replace("{y}", &index.y.to_string())
    }
}

/// Set of basemaps of which exactly one is displayed.
#[derive(Debug, Clone)]
pub struct Basemaps {
    basemaps: Vec<Basemap>,
    active: usize,
}

impl Basemaps {
    /// Creates the set with the first basemap active. Returns `None` if the list is empty.
    pub fn new(basemaps: Vec<Basemap>) -> Option<Self> {
        if basemaps.is_empty() {
            None
        } else {
            Some(Self {
                basemaps,
                active: 0,
            })
        }
    }

    /// Currently displayed basemap.
    pub fn active(&self) -> &Basemap {
        &self.basemaps[self.active]
    }

    /// Position of the displayed basemap.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Switches to the basemap at the given position. Out of range positions are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.basemaps.len() {
            self.active = index;
        }
    }

    /// Switches to the basemap with the given name. Returns false if there is no such basemap.
    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.basemaps.iter().position(|b| b.name() == name) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// All basemaps in the order they are listed.
    pub fn iter(&self) -> impl Iterator<Item = &Basemap> {
        self.basemaps.iter()
    }
}
