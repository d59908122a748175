use std::collections::HashMap;

use egui::{ColorImage, TextureHandle, TextureOptions};
use nepal_atlas::loader::{TileKey, TileLoader};

/// GPU textures of the basemap tiles delivered by the [`TileLoader`].
///
/// Only tiles the loader still tracks keep their texture, so the number of textures is bounded
/// by the loader capacity.
#[derive(Default)]
pub struct TileTextures {
    textures: HashMap<TileKey, TextureHandle>,
}

impl TileTextures {
    /// Uploads the tiles decoded since the last call and frees the textures of the tiles the
    /// loader has dropped.
    pub fn update(&mut self, ctx: &egui::Context, loader: &TileLoader) {
        self.textures.retain(|key, _| loader.is_tracked(key));

        for (key, image) in loader.take_loaded() {
            let (width, height) = image.dimensions();
            let color_image =
                ColorImage::from_rgba_unmultiplied([width as usize, height as usize], image.bytes());
            let name = format!("{}/{}/{}/{}", key.basemap, key.index.z, key.index.x, key.index.y);
            let texture = ctx.load_texture(name, color_image, TextureOptions::LINEAR);
            self.textures.insert(key, texture);
        }
    }

    pub fn get(&self, key: &TileKey) -> Option<&TextureHandle> {
        self.textures.get(key)
    }

    /// Drops the textures of all basemaps except the given one. Dropped tiles are forgotten by
    /// the loader so they are fetched again if the basemap is selected later.
    pub fn retain_basemap(&mut self, basemap: &str, loader: &TileLoader) {
        self.textures.retain(|key, _| {
            let keep = key.basemap == basemap;
            if !keep {
                loader.forget(key);
            }
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use egui::Color32;
    use nepal_atlas::loader::UrlDataProvider;
    use nepal_atlas::tile_schema::TileIndex;

    use super::*;

    #[test]
    fn textures_of_dropped_tiles_are_freed() {
        let ctx = egui::Context::default();
        let provider = UrlDataProvider::new("nepal-atlas-test", None).unwrap();
        let loader = TileLoader::new(Arc::new(provider), None);

        let key = TileKey {
            basemap: "OpenStreetMap".to_string(),
            index: TileIndex::new(1, 2, 3),
        };
        let image = ColorImage::new([1, 1], Color32::WHITE);
        let mut textures = TileTextures::default();
        textures.textures.insert(
            key.clone(),
            ctx.load_texture("tile", image, TextureOptions::LINEAR),
        );
        assert!(textures.get(&key).is_some());

        textures.update(&ctx, &loader);
        assert!(textures.get(&key).is_none());
    }
}
