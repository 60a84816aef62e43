mod camera;
mod scene;
mod watchers;

use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use regolith_geom::Vec3;
use regolith_runtime::TerrainField;
use regolith_world::config::load_params_from_path;
use regolith_world::{TerrainParams, TileSeed};

use crate::camera::FlyCamera;
use crate::scene::Scene;
use crate::watchers::ConfigWatcher;

/// Headless fly-over of the crater terrain: streams tiles around a moving
/// camera and keeps the camera on the ground.
#[derive(Parser, Debug)]
#[command(name = "regolith", version, about)]
struct Args {
    /// Terrain config (TOML). Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fixed seed for reproducible tile layouts.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Camera speed in world units per second.
    #[arg(long, default_value_t = 120.0)]
    speed: f32,
    /// Camera heading in degrees (0 = +X, 90 = +Z).
    #[arg(long, default_value_t = 30.0)]
    heading: f32,
    #[arg(long, default_value_t = 1.7)]
    eye_height: f32,
    /// Frame length in milliseconds; 0 runs the frames back to back.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Tile worker threads (defaults to cores - 1).
    #[arg(long)]
    workers: Option<usize>,
    /// Reload the config file when it changes.
    #[arg(long)]
    watch: bool,
    /// Log filter, e.g. `debug` or `terrain=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(f) = filter {
        builder.parse_filters(f);
    }
    builder.format_timestamp_millis().init();
}

fn load_params(args: &Args) -> Result<TerrainParams, Box<dyn Error>> {
    let params = match &args.config {
        Some(path) => {
            let p = load_params_from_path(path)?;
            log::info!("terrain config loaded from {}", path.display());
            p
        }
        None => TerrainParams::default(),
    };
    Ok(match args.seed {
        Some(seed) => params.with_seed(TileSeed::Fixed(seed)),
        None => params,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let params = load_params(&args)?;
    let (ready_tx, ready_rx) = crossbeam_channel::unbounded();
    let field = match args.workers {
        Some(n) => TerrainField::with_workers(params.clone(), n, ready_tx)?,
        None => TerrainField::new(params.clone(), ready_tx)?,
    };

    let watcher = match (&args.config, args.watch) {
        (Some(path), true) => {
            let seed = args.seed.map(TileSeed::Fixed);
            match ConfigWatcher::new(path, seed) {
                Ok(w) => Some(w),
                Err(e) => {
                    log::warn!("config watch disabled: {}", e);
                    None
                }
            }
        }
        (None, true) => {
            log::warn!("--watch needs --config; ignoring");
            None
        }
        _ => None,
    };

    let half = params.grid_size as f32 * 0.5;
    let mut cam = FlyCamera::new(
        Vec3::new(half, 0.0, half),
        args.heading,
        args.speed,
        args.eye_height,
    );
    let mut scene = Scene::new();
    let frame = Duration::from_millis(args.frame_ms);
    let dt = if args.frame_ms == 0 {
        1.0 / 60.0
    } else {
        args.frame_ms as f32 / 1000.0
    };
    let t_start = Instant::now();
    let mut last_tile = None;

    for frame_no in 0..args.frames {
        let t_frame = Instant::now();
        if let Some(w) = &watcher {
            w.process_config_events(&field);
        }

        cam.advance(dt);
        let tile = field.tile_at(cam.position.x, cam.position.z);
        let scheduled = field.generate_surrounding_tiles(tile.tx, tile.tz);
        if last_tile != Some(tile) {
            log::debug!("frame {}: camera entered tile {} ({} new)", frame_no, tile, scheduled);
            last_tile = Some(tile);
        }

        for ready in ready_rx.try_iter() {
            scene.insert(ready);
        }
        cam.settle_on(field.world_height(cam.position.x, cam.position.z));

        if frame_no % 120 == 0 {
            let s = field.stats();
            log::info!(
                "frame {}: cam=({:.1}, {:.2}, {:.1}) tiles={}/{} craters={} queued={}+{} inflight={}",
                frame_no,
                cam.position.x,
                cam.position.y,
                cam.position.z,
                scene.len(),
                s.tiles_registered,
                s.world_craters,
                s.queued_focus,
                s.queued_ring,
                s.inflight
            );
        }

        if let Some(rest) = frame.checked_sub(t_frame.elapsed()) {
            thread::sleep(rest);
        }
    }

    // Let outstanding tiles land so the summary is complete.
    let deadline = Instant::now() + Duration::from_secs(10);
    while scene.len() < field.generated_count() {
        let Some(left) = deadline.checked_duration_since(Instant::now()) else {
            log::warn!(
                "gave up waiting on {} tile(s)",
                field.generated_count() - scene.len()
            );
            break;
        };
        match ready_rx.recv_timeout(left) {
            Ok(ready) => {
                scene.insert(ready);
            }
            Err(_) => break,
        }
    }

    let stats = field.stats();
    println!(
        "{} frames in {:.2}s: {} tiles ({} verts, {} tris), {} world craters",
        args.frames,
        t_start.elapsed().as_secs_f32(),
        scene.len(),
        scene.vertices,
        scene.triangles,
        stats.world_craters
    );
    println!(
        "camera ended at ({:.1}, {:.2}, {:.1}) over tile {}",
        cam.position.x,
        cam.position.y,
        cam.position.z,
        field.tile_at(cam.position.x, cam.position.z)
    );
    if let Some((coord, us)) = scene.slowest() {
        println!("slowest tile {} took {:.2}ms", coord, us as f32 / 1000.0);
    }
    Ok(())
}
