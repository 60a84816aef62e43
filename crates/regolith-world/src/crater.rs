use std::sync::{PoisonError, RwLock};

use crate::coord::TileCoord;

/// Circular depression. Units are world units for world craters and
/// tile-normalized `[0, 1)` for local craters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crater {
    pub cx: f32,
    pub cz: f32,
    pub radius: f32,
}

impl Crater {
    #[inline]
    pub const fn new(cx: f32, cz: f32, radius: f32) -> Self {
        Self { cx, cz, radius }
    }

    /// Strictly inside: a point exactly on the rim is not in the crater.
    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let dx = x - self.cx;
        let dz = z - self.cz;
        (dx * dx + dz * dz).sqrt() < self.radius
    }

    /// Maps a tile-normalized crater into world space for `tile`.
    #[inline]
    pub fn to_world(self, tile: TileCoord, grid_size: usize) -> Crater {
        let g = grid_size as f32;
        let (ox, oz) = tile.world_corner(grid_size);
        Crater {
            cx: ox + self.cx * g,
            cz: oz + self.cz * g,
            radius: self.radius * g,
        }
    }
}

/// Accumulated crater depth at `(x, z)`: `-depth` for every crater that
/// strictly contains the point, so overlaps add up. Used for both the world
/// query and per-tile mesh heights.
#[inline]
pub fn crater_depth(x: f32, z: f32, craters: &[Crater], depth: f32) -> f32 {
    craters
        .iter()
        .filter(|c| c.contains(x, z))
        .fold(0.0, |h, _| h - depth)
}

/// Append-only list of world craters shared between generation workers
/// (writers) and the frame loop (reader).
#[derive(Debug, Default)]
pub struct CraterLog {
    entries: RwLock<Vec<Crater>>,
}

impl CraterLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch under one write lock so readers see all or none of it.
    pub fn extend<I>(&self, craters: I) -> usize
    where
        I: IntoIterator<Item = Crater>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.extend(craters);
        entries.len() - before
    }

    /// Terrain height at a world position from every crater recorded so far.
    pub fn height_at(&self, x: f32, z: f32, depth: f32) -> f32 {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        crater_depth(x, z, &entries, depth)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<Crater> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
