use std::sync::{Mutex, PoisonError};

use hashbrown::HashSet;
use regolith_world::TileCoord;

/// Append-only set of tiles that already have (or are getting) a mesh.
#[derive(Default)]
pub struct TileRegistry {
    keys: Mutex<HashSet<TileCoord>>,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test-and-set: returns `true` for exactly one caller per key.
    pub fn claim(&self, coord: TileCoord) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(coord)
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
