use serde::{Deserialize, Serialize};

/// Integer address of one `grid_size x grid_size` terrain tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub tx: i32,
    pub tz: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(tx: i32, tz: i32) -> Self {
        Self { tx, tz }
    }

    /// Tile that owns world position `(wx, wz)`. Floors, so `-0.5` lands in tile `-1`.
    #[inline]
    pub fn containing(wx: f32, wz: f32, grid_size: usize) -> Self {
        let g = grid_size as f32;
        Self {
            tx: (wx / g).floor() as i32,
            tz: (wz / g).floor() as i32,
        }
    }

    /// Neighbouring address. Wraps at the `i32` edges of the tile plane.
    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            tx: self.tx.wrapping_add(dx),
            tz: self.tz.wrapping_add(dz),
        }
    }

    /// The 3x3 block around `self`, center first.
    pub fn neighborhood(self) -> [TileCoord; 9] {
        [
            self,
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(1, 1),
            self.offset(-1, 1),
            self.offset(1, -1),
            self.offset(-1, -1),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }

    /// World-space corner used when converting tile-normalized craters.
    #[inline]
    pub fn world_corner(self, grid_size: usize) -> (f32, f32) {
        let g = grid_size as f32;
        (self.tx as f32 * g, self.tz as f32 * g)
    }

    /// Stable per-tile stream id for seeded generators.
    #[inline]
    pub fn stream_id(self) -> u64 {
        (u64::from(self.tx as u32) << 32) | u64::from(self.tz as u32)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.tx, self.tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_positions() {
        assert_eq!(TileCoord::containing(0.0, 0.0, 200), TileCoord::new(0, 0));
        assert_eq!(TileCoord::containing(199.9, 399.0, 200), TileCoord::new(0, 1));
        assert_eq!(TileCoord::containing(-0.5, -200.0, 200), TileCoord::new(-1, -1));
        assert_eq!(TileCoord::containing(-200.5, 200.0, 200), TileCoord::new(-2, 1));
    }

    #[test]
    fn neighborhood_is_the_unique_3x3_block() {
        let c = TileCoord::new(4, -7);
        let n = c.neighborhood();
        assert_eq!(n[0], c);
        let mut seen = std::collections::HashSet::new();
        for t in n {
            assert!((t.tx - c.tx).abs() <= 1 && (t.tz - c.tz).abs() <= 1);
            assert!(seen.insert(t));
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn neighborhood_at_the_plane_edge_does_not_overflow() {
        let c = TileCoord::new(i32::MAX, i32::MIN);
        let n = c.neighborhood();
        assert_eq!(n[0], c);
        assert_eq!(n[1], TileCoord::new(i32::MIN, i32::MIN));
        assert_eq!(n[7], TileCoord::new(i32::MAX, i32::MAX));
        let unique: std::collections::HashSet<_> = n.into_iter().collect();
        assert_eq!(unique.len(), 9);
    }

    #[test]
    fn stream_ids_differ_between_tiles() {
        let a = TileCoord::new(1, 0).stream_id();
        let b = TileCoord::new(0, 1).stream_id();
        let c = TileCoord::new(-1, 0).stream_id();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }
}
