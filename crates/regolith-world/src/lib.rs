//! Crater model, tile addressing, sampling, and terrain parameters.
#![forbid(unsafe_code)]

pub mod config;
pub mod coord;
pub mod crater;
pub mod sampling;

pub use config::{CraterParams, ShadeParams, TerrainConfig, TerrainParams};
pub use coord::TileCoord;
pub use crater::{Crater, CraterLog, crater_depth};
pub use sampling::{TileSeed, sample_local_craters};
