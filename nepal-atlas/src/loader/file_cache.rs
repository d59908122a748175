//! Persistent file cache of downloaded data.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;

use crate::error::AtlasError;

/// Stores downloaded responses as a set of files in the specified folder. File names are generated
/// from the urls.
///
/// Currently, there is no eviction mechanism.
#[derive(Debug, Clone)]
pub struct FileCacheController {
    folder_path: PathBuf,
}

impl FileCacheController {
    /// Creates a new instance. The folder is created if it doesn't exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        ensure_folder_exists(path.as_ref()).map_err(|err| {
            AtlasError::Config(format!(
                "failed to initialize file cache folder {:?}: {err}",
                path.as_ref()
            ))
        })?;

        Ok(Self {
            folder_path: path.as_ref().into(),
        })
    }

    /// Returns the cached response for the url.
    pub fn get(&self, url: &str) -> Option<Bytes> {
        let file_path = self.get_file_path(url);
        match std::fs::read(&file_path) {
            Ok(bytes) => {
                debug!("Loaded {url} from cache file {file_path:?}");
                Some(bytes.into())
            }
            Err(_) => None,
        }
    }

    /// Saves the response for the url.
    pub fn insert(&self, url: &str, data: &Bytes) -> Result<(), AtlasError> {
        let file_path = self.get_file_path(url);
        let Some(folder) = file_path.parent() else {
            debug!("Failed to add {url} entry to the cache {file_path:?} - no parent folder");
            return Err(AtlasError::Config(format!(
                "cache path {file_path:?} has no parent folder"
            )));
        };

        ensure_folder_exists(folder)?;
        std::fs::write(&file_path, data)?;
        debug!("Entry {url} saved to cache file {file_path:?}");

        Ok(())
    }

    fn get_file_path(&self, url: &str) -> PathBuf {
        let stripped = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
            .unwrap_or(url);
        let stripped = stripped.split('?').next().unwrap_or(stripped);

        self.folder_path.join(Path::new(stripped))
    }
}

fn ensure_folder_exists(folder_path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(folder_path)
}
