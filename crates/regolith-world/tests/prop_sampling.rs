use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regolith_world::{Crater, CraterParams, TileCoord, crater_depth, sample_local_craters};

fn tile() -> impl Strategy<Value = TileCoord> {
    (-10_000i32..=10_000, -10_000i32..=10_000).prop_map(|(x, z)| TileCoord::new(x, z))
}

proptest! {
    // Sampled craters stay inside the padded band and the radius range
    #[test]
    fn local_craters_keep_off_tile_edges(seed in any::<u64>(), count in 0usize..64) {
        let params = CraterParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let craters = sample_local_craters(&mut rng, count, &params);
        prop_assert_eq!(craters.len(), count);
        for c in craters {
            let pad = c.radius * params.edge_padding;
            prop_assert!(c.radius >= params.radius_min && c.radius < params.radius_max);
            prop_assert!(pad <= c.cx && c.cx <= 1.0 - pad);
            prop_assert!(pad <= c.cz && c.cz <= 1.0 - pad);
        }
    }

    // World conversion keeps craters inside the owning tile's square
    #[test]
    fn world_craters_land_in_their_tile(seed in any::<u64>(), t in tile()) {
        let grid = 200usize;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for local in sample_local_craters(&mut rng, 16, &CraterParams::default()) {
            let w = local.to_world(t, grid);
            prop_assert_eq!(TileCoord::containing(w.cx, w.cz, grid), t);
            prop_assert!((w.radius - local.radius * grid as f32).abs() < 1e-4);
        }
    }

    // Height drops by one crater depth per containing crater
    #[test]
    fn depth_counts_containing_craters(
        raw in prop::collection::vec((-50f32..50.0, -50f32..50.0, 0.5f32..30.0), 0..24),
        x in -60f32..60.0,
        z in -60f32..60.0,
    ) {
        let craters: Vec<Crater> = raw.into_iter().map(|(cx, cz, r)| Crater::new(cx, cz, r)).collect();
        let inside = craters.iter().filter(|c| c.contains(x, z)).count();
        prop_assert_eq!(crater_depth(x, z, &craters, 1.0), -(inside as f32));
        prop_assert_eq!(crater_depth(x, z, &craters, 0.5), -(inside as f32) * 0.5);
    }
}
