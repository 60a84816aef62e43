use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regolith_mesh::build_tile_mesh;
use regolith_world::{Crater, CraterParams, TerrainParams, TileCoord, sample_local_craters};

fn params(n: usize, jitter: f32) -> TerrainParams {
    TerrainParams {
        grid_size: n,
        jitter,
        ..TerrainParams::default()
    }
}

proptest! {
    // N x N vertices, 2 (N-1)^2 triangles, every index in range
    #[test]
    fn topology_counts(n in 2usize..=24, seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let craters = sample_local_craters(&mut rng, 5, &CraterParams::default());
        let tile = build_tile_mesh(TileCoord::new(0, 0), &craters, 2.0, &params(n, 0.1), &mut rng);
        prop_assert_eq!(tile.vertex_count(), n * n);
        prop_assert_eq!(tile.triangle_count(), 2 * (n - 1) * (n - 1));
        prop_assert_eq!(tile.mesh.idx.len(), 6 * (n - 1) * (n - 1));
        prop_assert_eq!(tile.mesh.col.len(), 4 * n * n);
        let max = (n * n) as u32;
        prop_assert!(tile.mesh.idx.iter().all(|&i| i < max));
    }

    // Without jitter the height is exactly scale * crater depth and the color follows it
    #[test]
    fn heights_and_shades_follow_craters(n in 2usize..=20, scale in 0.5f32..8.0, seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let craters = sample_local_craters(&mut rng, 6, &CraterParams::default());
        let p = params(n, 0.0);
        let tile = build_tile_mesh(TileCoord::new(-3, 9), &craters, scale, &p, &mut rng);
        for gz in 0..n {
            for gx in 0..n {
                let v = tile.grid_position(gx, gz);
                prop_assert_eq!(v.x, gx as f32);
                prop_assert_eq!(v.z, gz as f32);
                let nx = gx as f32 / n as f32;
                let nz = gz as f32 / n as f32;
                let inside = craters.iter().filter(|c| c.contains(nx, nz)).count();
                prop_assert_eq!(v.y, -(inside as f32) * scale);
                let t = p.shade.brightness(v.y);
                prop_assert_eq!(tile.mesh.color(gz * n + gx), [t, t, t, 1.0]);
                prop_assert!(tile.bbox.contains(v));
            }
        }
    }
}

#[test]
fn full_size_tile_matches_reference_counts() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let p = TerrainParams::default();
    let craters = sample_local_craters(&mut rng, p.crater_count, &p.craters);
    let tile = build_tile_mesh(TileCoord::new(1, 0), &craters, p.height_scale, &p, &mut rng);
    assert_eq!(tile.vertex_count(), 200 * 200);
    assert_eq!(tile.triangle_count(), 2 * 199 * 199);
    assert_eq!(tile.origin.x, 198.0);
    assert_eq!(tile.origin.z, 0.0);
}

#[test]
fn seeded_builds_are_reproducible() {
    let p = params(16, 0.1);
    let craters = [Crater::new(0.5, 0.5, 0.3)];
    let a = build_tile_mesh(TileCoord::new(0, 0), &craters, 2.0, &p, &mut ChaCha8Rng::seed_from_u64(3));
    let b = build_tile_mesh(TileCoord::new(0, 0), &craters, 2.0, &p, &mut ChaCha8Rng::seed_from_u64(3));
    assert_eq!(a.mesh.pos, b.mesh.pos);
    assert_eq!(a.mesh.col, b.mesh.col);
}

#[test]
fn very_tall_terrain_is_brighter_than_white() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let p = params(4, 0.0);
    // A negative scale turns craters into mounds; brightness keeps climbing past 1.0.
    let craters: Vec<Crater> = (0..40).map(|_| Crater::new(0.5, 0.5, 0.4)).collect();
    let tile = build_tile_mesh(TileCoord::new(0, 0), &craters, -2.0, &p, &mut rng);
    let center = tile.grid_position(2, 2);
    assert_eq!(center.y, 80.0);
    assert!(tile.mesh.color(2 * 4 + 2)[0] > 1.0);
}
