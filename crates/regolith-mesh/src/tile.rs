use regolith_geom::{Aabb, Vec3};
use regolith_world::TileCoord;

use crate::mesh_build::MeshBuild;

/// One finished tile. Vertex positions are tile-local; `origin` is the
/// translation the renderer applies to place it in the world.
#[derive(Clone, Debug)]
pub struct TileMeshCPU {
    pub coord: TileCoord,
    pub grid_size: usize,
    pub origin: Vec3,
    pub bbox: Aabb,
    pub mesh: MeshBuild,
}

impl TileMeshCPU {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    #[inline]
    pub fn world_bbox(&self) -> Aabb {
        self.bbox.translated(self.origin)
    }

    /// Local position of grid point `(gx, gz)`.
    #[inline]
    pub fn grid_position(&self, gx: usize, gz: usize) -> Vec3 {
        self.mesh.position(gz * self.grid_size + gx)
    }
}
