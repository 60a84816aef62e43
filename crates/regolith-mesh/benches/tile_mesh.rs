use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use regolith_mesh::build_tile_mesh;
use regolith_world::{TerrainParams, TileCoord, sample_local_craters};

fn bench_build_tile_default(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tile_mesh");
    let params = TerrainParams::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    let craters = sample_local_craters(&mut rng, params.crater_count, &params.craters);
    group.bench_function("grid_200_craters_25", |b| {
        b.iter(|| {
            let tile = build_tile_mesh(
                TileCoord::new(0, 0),
                &craters,
                params.height_scale,
                &params,
                &mut rng,
            );
            black_box(tile);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build_tile_default);
criterion_main!(benches);
