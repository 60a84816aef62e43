//! CPU tile meshing: crater height field to colored triangle grid (engine-only).
#![forbid(unsafe_code)]

mod mesh_build;
mod tile;

pub use mesh_build::MeshBuild;
pub use tile::TileMeshCPU;

use rand::Rng;
use regolith_geom::{Aabb, Vec3};
use regolith_world::{Crater, TerrainParams, TileCoord, crater_depth};

/// Raw height at tile-normalized `(nx, nz)` from this tile's own craters,
/// each `depth` deep, plus fresh uniform noise in `[-jitter, jitter)`.
#[inline]
pub fn build_tile_height<R: Rng + ?Sized>(
    nx: f32,
    nz: f32,
    craters: &[Crater],
    depth: f32,
    jitter: f32,
    rng: &mut R,
) -> f32 {
    let noise = if jitter > 0.0 {
        rng.gen_range(-jitter..jitter)
    } else {
        0.0
    };
    crater_depth(nx, nz, craters, depth) + noise
}

/// Builds the `grid x grid` vertex mesh for one tile.
///
/// Rows run along `z`, so vertex `(gx, gz)` sits at index `gz * grid + gx`.
/// Each cell becomes `(tl, bl, tr)` and `(tr, bl, br)`. The tile is placed
/// at `coord * (grid - seam_overlap)` so neighbours overlap at the seam.
pub fn build_tile_mesh<R: Rng + ?Sized>(
    coord: TileCoord,
    craters: &[Crater],
    height_scale: f32,
    params: &TerrainParams,
    rng: &mut R,
) -> TileMeshCPU {
    let n = params.grid_size;
    let g = n as f32;
    let mut mesh = MeshBuild::default();
    mesh.reserve_grid(n);
    let depth = params.craters.depth;
    let mut bbox: Option<Aabb> = None;

    for gz in 0..n {
        for gx in 0..n {
            let nx = gx as f32 / g;
            let nz = gz as f32 / g;
            let h = build_tile_height(nx, nz, craters, depth, params.jitter, rng) * height_scale;
            let p = Vec3::new(gx as f32, h, gz as f32);
            let t = params.shade.brightness(h);
            mesh.push_vertex(p, [t, t, t, 1.0]);
            bbox = Some(match bbox {
                Some(mut b) => {
                    b.include(p);
                    b
                }
                None => Aabb::at(p),
            });
        }
    }

    let n32 = n as u32;
    for z in 0..n32.saturating_sub(1) {
        for x in 0..n32 - 1 {
            let top_left = z * n32 + x;
            let top_right = top_left + 1;
            let bottom_left = (z + 1) * n32 + x;
            let bottom_right = bottom_left + 1;
            mesh.push_tri(top_left, bottom_left, top_right);
            mesh.push_tri(top_right, bottom_left, bottom_right);
        }
    }

    let stride = params.placement_stride() as f32;
    TileMeshCPU {
        coord,
        grid_size: n,
        origin: Vec3::new(coord.tx as f32 * stride, 0.0, coord.tz as f32 * stride),
        bbox: bbox.unwrap_or_default(),
        mesh,
    }
}
