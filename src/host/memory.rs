// src/host/memory.rs

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::{Arc, Mutex};

use super::AssetSource;

/// Asset store kept entirely in memory.
///
/// Clones share the same underlying map, so a test can keep one clone to add
/// assets after handing another to the launcher.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.add_asset(name, content);
        self
    }

    pub fn add_asset(&self, name: &str, content: impl Into<Vec<u8>>) {
        let mut assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        assets.insert(name.to_string(), content.into());
    }
}

impl AssetSource for MemoryAssetSource {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        let assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        match assets.get(name) {
            Some(content) => Ok(Box::new(Cursor::new(content.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset not found: {name}"),
            )),
        }
    }
}
