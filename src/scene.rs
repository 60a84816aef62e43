use hashbrown::HashMap;
use regolith_geom::Aabb;
use regolith_runtime::TileReady;
use regolith_world::TileCoord;

/// What the scene keeps per inserted tile. The mesh arrays themselves
/// would be handed to the GPU here; the headless scene only keeps bounds
/// and counts.
#[derive(Clone, Debug)]
pub struct PlacedTile {
    pub bounds: Aabb,
    pub vertices: usize,
    pub triangles: usize,
    pub build_us: u32,
}

#[derive(Default)]
pub struct Scene {
    tiles: HashMap<TileCoord, PlacedTile>,
    pub vertices: usize,
    pub triangles: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a delivered tile. Returns `false` if the tile was already present.
    pub fn insert(&mut self, ready: TileReady) -> bool {
        if self.tiles.contains_key(&ready.coord) {
            log::warn!("tile {} delivered twice; keeping the first", ready.coord);
            return false;
        }
        let placed = PlacedTile {
            bounds: ready.mesh.world_bbox(),
            vertices: ready.mesh.vertex_count(),
            triangles: ready.mesh.triangle_count(),
            build_us: ready.t_total_us,
        };
        log::info!(
            "tile {} in scene: {} verts, {} tris, y [{:.2}, {:.2}], built in {}us ({:?})",
            ready.coord,
            placed.vertices,
            placed.triangles,
            placed.bounds.min.y,
            placed.bounds.max.y,
            placed.build_us,
            ready.kind
        );
        self.vertices += placed.vertices;
        self.triangles += placed.triangles;
        self.tiles.insert(ready.coord, placed);
        true
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn slowest(&self) -> Option<(TileCoord, u32)> {
        self.tiles
            .iter()
            .map(|(c, t)| (*c, t.build_us))
            .max_by_key(|(_, us)| *us)
    }
}
