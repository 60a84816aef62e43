use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::sampling::TileSeed;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_seam_overlap")]
    pub seam_overlap: usize,
    #[serde(default = "default_crater_count")]
    pub crater_count: usize,
    #[serde(default = "default_height_scale")]
    pub height_scale: f32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub craters: Craters,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub shade: Shade,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            seam_overlap: default_seam_overlap(),
            crater_count: default_crater_count(),
            height_scale: default_height_scale(),
            seed: None,
            craters: Craters::default(),
            surface: Surface::default(),
            shade: Shade::default(),
        }
    }
}

fn default_grid_size() -> usize {
    200
}
fn default_seam_overlap() -> usize {
    2
}
fn default_crater_count() -> usize {
    25
}
fn default_height_scale() -> f32 {
    2.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct Craters {
    #[serde(default = "default_radius_min")]
    pub radius_min: f32,
    #[serde(default = "default_radius_max")]
    pub radius_max: f32,
    #[serde(default = "default_edge_padding")]
    pub edge_padding: f32,
    #[serde(default = "default_depth")]
    pub depth: f32,
}
fn default_radius_min() -> f32 {
    0.01
}
fn default_radius_max() -> f32 {
    0.15
}
fn default_edge_padding() -> f32 {
    1.1
}
fn default_depth() -> f32 {
    1.0
}
impl Default for Craters {
    fn default() -> Self {
        Self {
            radius_min: default_radius_min(),
            radius_max: default_radius_max(),
            edge_padding: default_edge_padding(),
            depth: default_depth(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_jitter")]
    pub jitter: f32,
}
fn default_jitter() -> f32 {
    0.1
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            jitter: default_jitter(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Shade {
    #[serde(default = "default_shade_offset")]
    pub offset: f32,
    #[serde(default = "default_shade_span")]
    pub span: f32,
}
fn default_shade_offset() -> f32 {
    5.0
}
fn default_shade_span() -> f32 {
    30.0
}
impl Default for Shade {
    fn default() -> Self {
        Self {
            offset: default_shade_offset(),
            span: default_shade_span(),
        }
    }
}

/// Radius range and edge keep-out for local crater sampling, in
/// tile-normalized units, plus the height each crater removes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CraterParams {
    pub radius_min: f32,
    pub radius_max: f32,
    pub edge_padding: f32,
    pub depth: f32,
}

impl Default for CraterParams {
    fn default() -> Self {
        Self::from(&Craters::default())
    }
}

impl From<&Craters> for CraterParams {
    fn from(cfg: &Craters) -> Self {
        Self {
            radius_min: cfg.radius_min,
            radius_max: cfg.radius_max,
            edge_padding: cfg.edge_padding,
            depth: cfg.depth,
        }
    }
}

/// Grayscale ramp `t = max(0, h / 2 + offset) / span`. Not clamped above.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadeParams {
    pub offset: f32,
    pub span: f32,
}

impl ShadeParams {
    #[inline]
    pub fn brightness(&self, height: f32) -> f32 {
        (height / 2.0 + self.offset).max(0.0) / self.span
    }
}

impl Default for ShadeParams {
    fn default() -> Self {
        Self {
            offset: default_shade_offset(),
            span: default_shade_span(),
        }
    }
}

/// Validated runtime parameters derived from a [`TerrainConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainParams {
    pub grid_size: usize,
    pub seam_overlap: usize,
    pub crater_count: usize,
    pub height_scale: f32,
    pub seed: TileSeed,
    pub craters: CraterParams,
    pub jitter: f32,
    pub shade: ShadeParams,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            seam_overlap: default_seam_overlap(),
            crater_count: default_crater_count(),
            height_scale: default_height_scale(),
            seed: TileSeed::Entropy,
            craters: CraterParams::default(),
            jitter: default_jitter(),
            shade: ShadeParams::default(),
        }
    }
}

impl TerrainParams {
    pub fn from_config(cfg: &TerrainConfig) -> Result<Self, Box<dyn Error>> {
        let params = Self {
            grid_size: cfg.grid_size,
            seam_overlap: cfg.seam_overlap,
            crater_count: cfg.crater_count,
            height_scale: cfg.height_scale,
            seed: cfg.seed.map_or(TileSeed::Entropy, TileSeed::Fixed),
            craters: CraterParams::from(&cfg.craters),
            jitter: cfg.surface.jitter,
            shade: ShadeParams {
                offset: cfg.shade.offset,
                span: cfg.shade.span,
            },
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_seed(mut self, seed: TileSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.grid_size < 2 {
            return Err(format!("grid_size must be at least 2 (got {})", self.grid_size).into());
        }
        if self.seam_overlap >= self.grid_size {
            return Err(format!(
                "seam_overlap {} must be smaller than grid_size {}",
                self.seam_overlap, self.grid_size
            )
            .into());
        }
        let c = &self.craters;
        if !(c.radius_min > 0.0 && c.radius_min < c.radius_max) {
            return Err(format!(
                "crater radius range [{}, {}) is empty or non-positive",
                c.radius_min, c.radius_max
            )
            .into());
        }
        if !(c.edge_padding >= 1.0) {
            return Err(format!("edge_padding must be >= 1.0 (got {})", c.edge_padding).into());
        }
        if c.radius_max * c.edge_padding >= 0.5 {
            return Err(format!(
                "radius_max * edge_padding = {} leaves no room for crater centers",
                c.radius_max * c.edge_padding
            )
            .into());
        }
        if !(c.depth > 0.0 && c.depth.is_finite()) {
            return Err(format!("crater depth must be positive (got {})", c.depth).into());
        }
        if !(self.jitter >= 0.0) {
            return Err(format!("surface jitter must be non-negative (got {})", self.jitter).into());
        }
        if !(self.shade.span > 0.0) {
            return Err(format!("shade span must be positive (got {})", self.shade.span).into());
        }
        if !self.height_scale.is_finite() {
            return Err("height_scale must be finite".into());
        }
        Ok(())
    }

    /// Distance between neighbouring tile origins when placed in the world.
    #[inline]
    pub fn placement_stride(&self) -> usize {
        self.grid_size - self.seam_overlap
    }
}

pub fn load_params_from_path(path: &Path) -> Result<TerrainParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainConfig = toml::from_str(&s)?;
    let params = TerrainParams::from_config(&cfg)?;
    log::debug!(
        "terrain params from {}: grid={} craters={} scale={} seed={:?}",
        path.display(),
        params.grid_size,
        params.crater_count,
        params.height_scale,
        params.seed
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_terrain() {
        let p = TerrainParams::default();
        assert_eq!(p.grid_size, 200);
        assert_eq!(p.placement_stride(), 198);
        assert_eq!(p.crater_count, 25);
        assert_eq!(p.height_scale, 2.0);
        assert_eq!(p.craters.radius_min, 0.01);
        assert_eq!(p.craters.radius_max, 0.15);
        assert_eq!(p.craters.edge_padding, 1.1);
        assert_eq!(p.craters.depth, 1.0);
        assert_eq!(p.jitter, 0.1);
        assert!(p.validate().is_ok());
        assert_eq!(TerrainParams::from_config(&TerrainConfig::default()).unwrap(), p);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            crater_count = 8
            seed = 7

            [craters]
            radius_max = 0.2
            depth = 0.5
            "#,
        )
        .unwrap();
        let p = TerrainParams::from_config(&cfg).unwrap();
        assert_eq!(p.crater_count, 8);
        assert_eq!(p.seed, TileSeed::Fixed(7));
        assert_eq!(p.craters.radius_max, 0.2);
        assert_eq!(p.craters.radius_min, 0.01);
        assert_eq!(p.craters.depth, 0.5);
        assert_eq!(p.grid_size, 200);
    }

    #[test]
    fn rejects_impossible_layouts() {
        let mut cfg = TerrainConfig::default();
        cfg.craters.radius_max = 0.46;
        assert!(TerrainParams::from_config(&cfg).is_err());

        let mut cfg = TerrainConfig::default();
        cfg.craters.radius_min = 0.2;
        assert!(TerrainParams::from_config(&cfg).is_err());

        let mut cfg = TerrainConfig::default();
        cfg.grid_size = 2;
        assert!(TerrainParams::from_config(&cfg).is_err());

        let mut cfg = TerrainConfig::default();
        cfg.surface.jitter = -1.0;
        assert!(TerrainParams::from_config(&cfg).is_err());

        let mut cfg = TerrainConfig::default();
        cfg.craters.depth = 0.0;
        assert!(TerrainParams::from_config(&cfg).is_err());
    }

    #[test]
    fn brightness_is_not_clamped_above_one() {
        let shade = ShadeParams::default();
        assert_eq!(shade.brightness(0.0), 5.0 / 30.0);
        assert_eq!(shade.brightness(-20.0), 0.0);
        assert!(shade.brightness(100.0) > 1.0);
    }
}
