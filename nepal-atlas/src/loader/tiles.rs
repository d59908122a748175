use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;
use quick_cache::unsync::Cache;
use web_time::Instant;

use crate::layer::Basemap;
use crate::loader::{DataProvider, DecodedImage};
use crate::messenger::Messenger;
use crate::tile_schema::TileIndex;
use crate::view::MapView;

/// Number of tiles a loader keeps track of by default.
pub const DEFAULT_TILE_CAPACITY: usize = 1000;

/// Time after which a tile that failed to load is requested again.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Identifies a tile of a particular basemap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Name of the basemap.
    pub basemap: String,
    /// Position of the tile.
    pub index: TileIndex,
}

#[derive(Debug, Clone, Copy)]
enum TileState {
    Loading,
    Loaded,
    Error(Instant),
}

type TileStore = Arc<Mutex<Cache<TileKey, TileState>>>;
type ReadyTiles = Arc<Mutex<Vec<(TileKey, DecodedImage)>>>;

/// Loads basemap tiles in the background and hands them over to the UI once decoded.
///
/// The loader tracks a bounded number of tiles. A tile is requested once while it is tracked.
/// Tiles pushed out of the store, [forgotten](TileLoader::forget) or failed longer than the retry
/// delay ago are requested again the next time a view needs them.
pub struct TileLoader {
    provider: Arc<dyn DataProvider>,
    tiles: TileStore,
    ready: ReadyTiles,
    capacity: usize,
    retry_delay: Duration,
    messenger: Option<Arc<dyn Messenger>>,
}

impl std::fmt::Debug for TileLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileLoader")
            .field("tiles", &self.tracked_tiles())
            .field("capacity", &self.capacity)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl TileLoader {
    /// Creates a new loader with the [default capacity](DEFAULT_TILE_CAPACITY).
    pub fn new(provider: Arc<dyn DataProvider>, messenger: Option<Arc<dyn Messenger>>) -> Self {
        Self::with_capacity(provider, messenger, DEFAULT_TILE_CAPACITY)
    }

    /// Creates a new loader that tracks at most `capacity` tiles.
    pub fn with_capacity(
        provider: Arc<dyn DataProvider>,
        messenger: Option<Arc<dyn Messenger>>,
        capacity: usize,
    ) -> Self {
        Self {
            provider,
            tiles: Arc::new(Mutex::new(Cache::new(capacity))),
            ready: Arc::new(Mutex::new(vec![])),
            capacity,
            retry_delay: DEFAULT_RETRY_DELAY,
            messenger,
        }
    }

    /// Sets the time after which failed tiles are requested again.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Maximum number of tracked tiles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tiles currently tracked, in any state.
    pub fn tracked_tiles(&self) -> usize {
        self.tiles.lock().len()
    }

    /// Tiles of the basemap needed to cover the view.
    pub fn tiles_for_view(basemap: &Basemap, view: &MapView) -> Vec<TileKey> {
        let Some(tiles) = basemap.tile_schema().iter_tiles(view) else {
            return vec![];
        };

        tiles
            .map(|index| TileKey {
                basemap: basemap.name().to_string(),
                index,
            })
            .collect()
    }

    /// Starts loading the tiles covering the view that are not tracked yet. Must be called
    /// within a tokio runtime.
    pub fn prepare(&self, basemap: &Basemap, view: &MapView) {
        for key in Self::tiles_for_view(basemap, view) {
            if !self.set_loading_state(&key) {
                continue;
            }

            let url = basemap.tile_url(key.index);
            let provider = self.provider.clone();
            let tiles = self.tiles.clone();
            let ready = self.ready.clone();
            let messenger = self.messenger.clone();
            tokio::spawn(async move {
                Self::load_tile(key, url, provider, tiles, ready, messenger).await;
            });
        }
    }

    fn set_loading_state(&self, key: &TileKey) -> bool {
        let mut tiles = self.tiles.lock();
        match tiles.peek(key) {
            Some(TileState::Error(failed_at)) if failed_at.elapsed() >= self.retry_delay => {
                debug!("Retrying tile {key:?}");
            }
            Some(_) => return false,
            None => {}
        }

        tiles.insert(key.clone(), TileState::Loading);
        true
    }

    async fn load_tile(
        key: TileKey,
        url: String,
        provider: Arc<dyn DataProvider>,
        tiles: TileStore,
        ready: ReadyTiles,
        messenger: Option<Arc<dyn Messenger>>,
    ) {
        let decoded = match provider.load_bytes(&url).await {
            Ok(bytes) => DecodedImage::decode(&bytes),
            Err(err) => Err(err),
        };

        {
            let mut tiles = tiles.lock();
            if tiles.peek(&key).is_none() {
                debug!("Tile {url} was dropped from the store while loading");
                return;
            }

            match decoded {
                Ok(image) => {
                    debug!("Tile {url} loaded");
                    tiles.insert(key.clone(), TileState::Loaded);
                    ready.lock().push((key, image));
                }
                Err(err) => {
                    warn!("Failed to load tile {url}: {err}");
                    tiles.insert(key, TileState::Error(Instant::now()));
                    return;
                }
            }
        }

        if let Some(messenger) = messenger {
            messenger.request_redraw();
        }
    }

    /// Takes the tiles that were decoded since the last call.
    pub fn take_loaded(&self) -> Vec<(TileKey, DecodedImage)> {
        std::mem::take(&mut *self.ready.lock())
    }

    /// True if the loader still tracks the tile.
    pub fn is_tracked(&self, key: &TileKey) -> bool {
        self.tiles.lock().peek(key).is_some()
    }

    /// True if the tile is being loaded.
    pub fn is_loading(&self, key: &TileKey) -> bool {
        matches!(self.tiles.lock().peek(key), Some(TileState::Loading))
    }

    /// True if the last attempt to load the tile failed.
    pub fn is_failed(&self, key: &TileKey) -> bool {
        matches!(self.tiles.lock().peek(key), Some(TileState::Error(_)))
    }

    /// Forgets the tile so that it is requested again next time it is needed.
    pub fn forget(&self, key: &TileKey) {
        self.tiles.lock().remove(key);
        self.ready.lock().retain(|(ready_key, _)| ready_key != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::test_provider::MemoryProvider;
    use crate::view::Size;
    use geo_types::Coord;
    use std::io::Cursor;

    fn png() -> Vec<u8> {
        let mut png = vec![];
        image::RgbaImage::from_pixel(256, 256, image::Rgba([1, 2, 3, 255]))
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        png
    }

    async fn wait_until_settled(loader: &TileLoader, key: &TileKey) {
        while loader.is_loading(key) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn loads_each_tile_once() {
        let basemap = Basemap::osm();
        let view = MapView::new(Coord { x: 85.3, y: 27.7 }, 2.0).with_size(Size::new(100.0, 100.0));
        let keys = TileLoader::tiles_for_view(&basemap, &view);
        assert!(!keys.is_empty());

        let mut provider = MemoryProvider::default();
        for key in &keys {
            provider = provider.with(&basemap.tile_url(key.index), png());
        }
        let provider = Arc::new(provider);
        let loader = TileLoader::new(provider.clone(), None);

        loader.prepare(&basemap, &view);
        loader.prepare(&basemap, &view);

        let mut loaded = vec![];
        while loaded.len() < keys.len() {
            loaded.extend(loader.take_loaded());
            tokio::task::yield_now().await;
        }

        assert_eq!(provider.requests.lock().len(), keys.len());
        assert!(loaded.iter().all(|(_, image)| image.dimensions() == (256, 256)));
        assert!(loader.take_loaded().is_empty());
        assert!(keys.iter().all(|key| loader.is_tracked(key)));
    }

    #[tokio::test]
    async fn missing_tile_is_marked_failed() {
        let basemap = Basemap::osm();
        let view = MapView::new(Coord { x: 85.3, y: 27.7 }, 7.0).with_size(Size::new(10.0, 10.0));
        let loader = TileLoader::new(Arc::new(MemoryProvider::default()), None);

        loader.prepare(&basemap, &view);
        let key = TileLoader::tiles_for_view(&basemap, &view).remove(0);
        wait_until_settled(&loader, &key).await;

        assert!(loader.is_failed(&key));
        loader.forget(&key);
        assert!(!loader.is_failed(&key));
        assert!(!loader.is_tracked(&key));
    }

    #[tokio::test]
    async fn failed_tile_is_requested_again_after_retry_delay() {
        let basemap = Basemap::osm();
        let view = MapView::new(Coord { x: 85.3, y: 27.7 }, 7.0).with_size(Size::new(10.0, 10.0));
        let key = TileLoader::tiles_for_view(&basemap, &view).remove(0);
        let url = basemap.tile_url(key.index);
        let provider = Arc::new(MemoryProvider::default());

        let loader = TileLoader::new(provider.clone(), None).with_retry_delay(Duration::ZERO);
        loader.prepare(&basemap, &view);
        wait_until_settled(&loader, &key).await;
        assert!(loader.is_failed(&key));

        loader.prepare(&basemap, &view);
        wait_until_settled(&loader, &key).await;

        let requests = provider.requests.lock();
        assert_eq!(requests.iter().filter(|r| **r == url).count(), 2);
    }

    #[tokio::test]
    async fn failed_tile_is_not_requested_before_retry_delay() {
        let basemap = Basemap::osm();
        let view = MapView::new(Coord { x: 85.3, y: 27.7 }, 7.0).with_size(Size::new(10.0, 10.0));
        let key = TileLoader::tiles_for_view(&basemap, &view).remove(0);
        let provider = Arc::new(MemoryProvider::default());

        let loader =
            TileLoader::new(provider.clone(), None).with_retry_delay(Duration::from_secs(3600));
        loader.prepare(&basemap, &view);
        wait_until_settled(&loader, &key).await;
        let first_round = provider.requests.lock().len();

        loader.prepare(&basemap, &view);
        assert_eq!(provider.requests.lock().len(), first_round);
        assert!(loader.is_failed(&key));
    }

    #[tokio::test]
    async fn tracked_tiles_stay_within_capacity_while_panning() {
        let basemap = Basemap::osm();
        let capacity = 64;
        let loader =
            TileLoader::with_capacity(Arc::new(MemoryProvider::default()), None, capacity);

        for step in 0..400 {
            let center = Coord {
                x: 80.0 + step as f64 * 0.02,
                y: 26.5 + (step % 20) as f64 * 0.02,
            };
            let view = MapView::new(center, 15.0).with_size(Size::new(1280.0, 800.0));
            loader.prepare(&basemap, &view);
            assert!(loader.tracked_tiles() <= capacity);
        }

        assert!(loader.tracked_tiles() > 0);
        assert_eq!(loader.capacity(), capacity);
    }
}
