use std::error::Error;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, unbounded};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use regolith_runtime::TerrainField;
use regolith_world::TileSeed;
use regolith_world::config::load_params_from_path;

/// Watches the terrain config file and pushes edits into a running field.
pub struct ConfigWatcher {
    path: PathBuf,
    seed_override: Option<TileSeed>,
    event_rx: Receiver<()>,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    pub fn new(path: &Path, seed_override: Option<TileSeed>) -> Result<Self, Box<dyn Error>> {
        let (tx, rx) = unbounded::<()>();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    match event.kind {
                        EventKind::Modify(_)
                        | EventKind::Create(_)
                        | EventKind::Remove(_)
                        | EventKind::Any => {
                            let _ = tx.send(());
                        }
                        _ => {}
                    }
                }
            })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        log::info!("watching terrain config {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            seed_override,
            event_rx: rx,
            _watcher: watcher,
        })
    }

    /// Applies a pending config change, if any. Returns `true` when the
    /// field picked up new parameters.
    pub fn process_config_events(&self, field: &TerrainField) -> bool {
        let mut changed = false;
        for _ in self.event_rx.try_iter() {
            changed = true;
        }
        if !changed {
            return false;
        }
        if !self.path.exists() {
            log::warn!("terrain config missing: {}", self.path.display());
            return false;
        }
        let params = match load_params_from_path(&self.path) {
            Ok(p) => match self.seed_override {
                Some(seed) => p.with_seed(seed),
                None => p,
            },
            Err(e) => {
                log::warn!("terrain config reload failed ({}): {}", self.path.display(), e);
                return false;
            }
        };
        match field.update_params(params) {
            Ok(()) => {
                log::info!("terrain config reloaded from {}", self.path.display());
                log::info!("Existing tiles unchanged; new tiles use updated params");
                true
            }
            Err(e) => {
                log::warn!("terrain config rejected ({}): {}", self.path.display(), e);
                false
            }
        }
    }
}
