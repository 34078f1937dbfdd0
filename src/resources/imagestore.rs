//! Path-keyed cache of decoded images.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::info;
use rustc_hash::FxHashMap;

use crate::resources::pixmap::{AssetError, Pixmap};

/// Decodes each image file once and hands out shared pixmaps afterwards.
///
/// Failed loads are not cached, so a later call retries the file.
#[derive(Default)]
pub struct ImageStore {
    map: Mutex<FxHashMap<PathBuf, Arc<Pixmap>>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Pixmap>, AssetError> {
        let path = path.as_ref();
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pixmap) = map.get(path) {
            return Ok(Arc::clone(pixmap));
        }
        let pixmap = Arc::new(Pixmap::load(path)?);
        info!("Loaded image {:?}", path);
        map.insert(path.to_path_buf(), Arc::clone(&pixmap));
        Ok(pixmap)
    }

    pub fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
