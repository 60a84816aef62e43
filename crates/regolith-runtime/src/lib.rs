//! Tile generation runtime: registry, worker lanes, and mesh delivery.
#![forbid(unsafe_code)]

mod registry;

use std::error::Error;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TryRecvError, select, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use regolith_mesh::{TileMeshCPU, build_tile_mesh};
use regolith_world::{Crater, CraterLog, TerrainParams, TileCoord, sample_local_craters};

pub use crate::registry::TileRegistry;

#[derive(Clone, Debug)]
pub struct TileJob {
    pub coord: TileCoord,
    pub crater_count: usize,
    pub height_scale: f32,
    pub params: Arc<TerrainParams>,
    pub job_id: u64,
}

/// A finished tile, posted to the owner's delivery channel.
pub struct TileReady {
    pub coord: TileCoord,
    pub mesh: TileMeshCPU,
    pub craters_added: usize,
    pub job_id: u64,
    pub kind: JobKind,
    pub t_sample_us: u32,
    pub t_mesh_us: u32,
    pub t_total_us: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Lane {
    Focus,
    Ring,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Focus,
    Ring,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub queued_focus: usize,
    pub queued_ring: usize,
    pub inflight: usize,
    pub completed: usize,
    pub tiles_registered: usize,
    pub world_craters: usize,
}

#[inline]
fn elapsed_us(t0: Instant) -> u32 {
    t0.elapsed().as_micros().min(u128::from(u32::MAX)) as u32
}

fn process_tile_job(job: TileJob, lane: Lane, craters: &CraterLog, tx: &Sender<TileReady>) {
    let TileJob {
        coord,
        crater_count,
        height_scale,
        params,
        job_id,
    } = job;

    let t_job_start = Instant::now();
    let mut rng = params.seed.rng_for(coord);

    let t0 = Instant::now();
    let local = sample_local_craters(&mut rng, crater_count, &params.craters);
    let craters_added = craters.extend(
        local
            .iter()
            .map(|c: &Crater| c.to_world(coord, params.grid_size)),
    );
    let t_sample_us = elapsed_us(t0);

    let t0 = Instant::now();
    let mesh = build_tile_mesh(coord, &local, height_scale, &params, &mut rng);
    let t_mesh_us = elapsed_us(t0);

    let kind = match lane {
        Lane::Focus => JobKind::Focus,
        Lane::Ring => JobKind::Ring,
    };
    let t_total_us = elapsed_us(t_job_start);
    log::debug!(
        target: "terrain",
        "built tile {} job={:#x} lane={:?} craters={} verts={} sample={}us mesh={}us",
        coord,
        job_id,
        kind,
        craters_added,
        mesh.vertex_count(),
        t_sample_us,
        t_mesh_us
    );
    // A dropped receiver means nobody wants the mesh any more.
    let _ = tx.send(TileReady {
        coord,
        mesh,
        craters_added,
        job_id,
        kind,
        t_sample_us,
        t_mesh_us,
        t_total_us,
    });
}

/// Pushes `job` onto a lane. On a closed lane the queue count is rolled
/// back and the tile stays claimed but unbuilt.
fn enqueue(tx: &Sender<TileJob>, queued: &AtomicUsize, job: TileJob) -> bool {
    let coord = job.coord;
    queued.fetch_add(1, Ordering::Relaxed);
    if tx.send(job).is_err() {
        queued.fetch_sub(1, Ordering::Relaxed);
        log::error!("tile {} dropped: worker lanes closed", coord);
        return false;
    }
    true
}

/// Counters shared between the submitting side and the workers.
#[derive(Default)]
struct LaneCounters {
    q_focus: AtomicUsize,
    q_ring: AtomicUsize,
    inflight: AtomicUsize,
    completed: AtomicUsize,
}

struct Worker {
    focus_rx: Receiver<TileJob>,
    ring_rx: Receiver<TileJob>,
    craters: Arc<CraterLog>,
    counters: Arc<LaneCounters>,
    tx: Sender<TileReady>,
}

impl Worker {
    fn run_one(&self, job: TileJob, lane: Lane) {
        let queued = match lane {
            Lane::Focus => &self.counters.q_focus,
            Lane::Ring => &self.counters.q_ring,
        };
        queued.fetch_sub(1, Ordering::Relaxed);
        self.counters.inflight.fetch_add(1, Ordering::Relaxed);
        process_tile_job(job, lane, self.craters.as_ref(), &self.tx);
        self.counters.inflight.fetch_sub(1, Ordering::Relaxed);
        self.counters.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Focus jobs always go first; ring jobs fill the gaps.
    fn run(self) {
        loop {
            match self.focus_rx.try_recv() {
                Ok(job) => {
                    self.run_one(job, Lane::Focus);
                    continue;
                }
                Err(TryRecvError::Disconnected) => {
                    while let Ok(job) = self.ring_rx.recv() {
                        self.run_one(job, Lane::Ring);
                    }
                    break;
                }
                Err(TryRecvError::Empty) => {}
            }

            select! {
                recv(self.focus_rx) -> res => match res {
                    Ok(job) => self.run_one(job, Lane::Focus),
                    Err(_) => {
                        while let Ok(job) = self.ring_rx.recv() {
                            self.run_one(job, Lane::Ring);
                        }
                        break;
                    }
                },
                recv(self.ring_rx) -> res => match res {
                    Ok(job) => self.run_one(job, Lane::Ring),
                    Err(_) => {
                        while let Ok(job) = self.focus_rx.recv() {
                            self.run_one(job, Lane::Focus);
                        }
                        break;
                    }
                },
            }
        }
    }
}

/// Owns the tile registry and the world crater log, and builds tile meshes
/// on a background pool.
///
/// Finished meshes are sent to the `Sender<TileReady>` given at
/// construction; the owner drains the matching receiver on its main loop.
/// Dropping the field closes the job lanes. Jobs already queued still run.
pub struct TerrainField {
    registry: TileRegistry,
    craters: Arc<CraterLog>,
    params: RwLock<Arc<TerrainParams>>,
    job_tx_focus: Sender<TileJob>,
    job_tx_ring: Sender<TileJob>,
    _pool: Arc<ThreadPool>,
    counters: Arc<LaneCounters>,
    next_job_id: AtomicU64,
}

impl TerrainField {
    pub fn new(params: TerrainParams, ready_tx: Sender<TileReady>) -> Result<Self, Box<dyn Error>> {
        let workers = thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(4)
            .max(1);
        Self::with_workers(params, workers, ready_tx)
    }

    /// Convenience constructor that also creates the delivery channel.
    pub fn with_channel(
        params: TerrainParams,
    ) -> Result<(Self, Receiver<TileReady>), Box<dyn Error>> {
        let (tx, rx) = unbounded::<TileReady>();
        Ok((Self::new(params, tx)?, rx))
    }

    /// Validates `params` before any worker starts, so a bad config is
    /// reported here instead of failing inside a tile job.
    pub fn with_workers(
        params: TerrainParams,
        workers: usize,
        ready_tx: Sender<TileReady>,
    ) -> Result<Self, Box<dyn Error>> {
        params.validate()?;
        let workers = workers.max(1);
        let (job_tx_focus, job_rx_focus) = unbounded::<TileJob>();
        let (job_tx_ring, job_rx_ring) = unbounded::<TileJob>();
        let craters = Arc::new(CraterLog::new());
        let counters = Arc::new(LaneCounters::default());

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("regolith-tile-{i}"))
                .build()?,
        );
        for _ in 0..workers {
            let worker = Worker {
                focus_rx: job_rx_focus.clone(),
                ring_rx: job_rx_ring.clone(),
                craters: craters.clone(),
                counters: counters.clone(),
                tx: ready_tx.clone(),
            };
            pool.spawn(move || worker.run());
        }
        log::info!(
            "terrain field: {} worker(s), grid={} stride={}",
            workers,
            params.grid_size,
            params.placement_stride()
        );

        Ok(Self {
            registry: TileRegistry::new(),
            craters,
            params: RwLock::new(Arc::new(params)),
            job_tx_focus,
            job_tx_ring,
            _pool: pool,
            counters,
            next_job_id: AtomicU64::new(1),
        })
    }

    /// Height of the world surface at `(x, z)` from every crater registered so
    /// far. Tiles still being generated may or may not be reflected.
    pub fn world_height(&self, x: f32, z: f32) -> f32 {
        let depth = self.params().craters.depth;
        self.craters.height_at(x, z, depth)
    }

    /// Requests the 3x3 block around `(tx, tz)`. Cheap to call every frame;
    /// returns how many new tiles were scheduled.
    pub fn generate_surrounding_tiles(&self, tx: i32, tz: i32) -> usize {
        let params = self.params();
        let center = TileCoord::new(tx, tz);
        let mut scheduled = 0;
        for coord in center.neighborhood() {
            let lane = if coord == center { Lane::Focus } else { Lane::Ring };
            if self.request(coord, lane, params.crater_count, params.height_scale, &params) {
                scheduled += 1;
            }
        }
        scheduled
    }

    /// Schedules `coord` with the current default crater count and height scale.
    pub fn generate_tile(&self, coord: TileCoord) -> bool {
        let params = self.params();
        self.request(coord, Lane::Focus, params.crater_count, params.height_scale, &params)
    }

    /// Schedules `coord` unless it was requested before; a repeat is a no-op
    /// and returns `false`.
    pub fn generate_tile_with(&self, coord: TileCoord, crater_count: usize, height_scale: f32) -> bool {
        let params = self.params();
        self.request(coord, Lane::Focus, crater_count, height_scale, &params)
    }

    fn request(
        &self,
        coord: TileCoord,
        lane: Lane,
        crater_count: usize,
        height_scale: f32,
        params: &Arc<TerrainParams>,
    ) -> bool {
        if !self.registry.claim(coord) {
            return false;
        }
        let job = TileJob {
            coord,
            crater_count,
            height_scale,
            params: Arc::clone(params),
            job_id: self.next_job_id.fetch_add(1, Ordering::Relaxed),
        };
        log::debug!(target: "terrain", "schedule tile {} lane={:?} job={:#x}", coord, lane, job.job_id);
        let (tx, queued) = match lane {
            Lane::Focus => (&self.job_tx_focus, &self.counters.q_focus),
            Lane::Ring => (&self.job_tx_ring, &self.counters.q_ring),
        };
        enqueue(tx, queued, job)
    }

    pub fn params(&self) -> Arc<TerrainParams> {
        Arc::clone(&self.params.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swaps the parameters used by tiles scheduled from now on. Built tiles
    /// keep their layout. The tile size, seam and crater depth cannot change
    /// once tiles exist in world space.
    pub fn update_params(&self, params: TerrainParams) -> Result<(), Box<dyn Error>> {
        params.validate()?;
        let mut cur = self.params.write().unwrap_or_else(PoisonError::into_inner);
        if params.grid_size != cur.grid_size || params.seam_overlap != cur.seam_overlap {
            return Err(format!(
                "tile geometry is fixed for the life of the field (grid {} seam {}, got grid {} seam {})",
                cur.grid_size, cur.seam_overlap, params.grid_size, params.seam_overlap
            )
            .into());
        }
        if params.craters.depth != cur.craters.depth {
            return Err(format!(
                "crater depth is fixed for the life of the field (got {}, field uses {})",
                params.craters.depth, cur.craters.depth
            )
            .into());
        }
        *cur = Arc::new(params);
        Ok(())
    }

    /// Tile under a world position, using this field's tile size.
    pub fn tile_at(&self, wx: f32, wz: f32) -> TileCoord {
        TileCoord::containing(wx, wz, self.params().grid_size)
    }

    pub fn is_generated(&self, coord: TileCoord) -> bool {
        self.registry.contains(coord)
    }

    pub fn generated_count(&self) -> usize {
        self.registry.len()
    }

    pub fn crater_count(&self) -> usize {
        self.craters.len()
    }

    pub fn world_craters_snapshot(&self) -> Vec<Crater> {
        self.craters.snapshot()
    }

    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            queued_focus: self.counters.q_focus.load(Ordering::Relaxed),
            queued_ring: self.counters.q_ring.load(Ordering::Relaxed),
            inflight: self.counters.inflight.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            tiles_registered: self.registry.len(),
            world_craters: self.craters.len(),
        }
    }
}
