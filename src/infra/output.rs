// ============================================================
// Layer 6 — Output Store
// ============================================================
// Everything a run leaves behind lives in one directory:
//
//   output/
//     layer_conv5_1_filter_12.png           ← final image
//     layer_conv5_1_filter_12_scale03.png   ← optional intermediates
//     activations.csv                       ← see metrics.rs
//     run_config.json                       ← exact settings used
//
// Images are clipped to [0, 1] and written as 8-bit PNG.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{image::ImagePlanes, traits::ImageSink, unit::TargetUnit};

pub const RUN_CONFIG_FILE: &str = "run_config.json";

pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, unit: &TargetUnit) -> PathBuf {
        self.dir.join(format!("{}.png", unit.file_stem()))
    }

    pub fn scale_path(&self, unit: &TargetUnit, scale: usize) -> PathBuf {
        self.dir.join(format!("{}_scale{:02}.png", unit.file_stem(), scale))
    }

    pub fn save_config<T: Serialize>(&self, cfg: &T) -> Result<PathBuf> {
        let path = self.dir.join(RUN_CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(path)
    }

    pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))
    }

    fn write_png(path: &Path, image: &ImagePlanes) -> Result<()> {
        let width  = u32::try_from(image.width).context("Image too wide")?;
        let height = u32::try_from(image.height).context("Image too tall")?;
        let rgb = image::RgbImage::from_raw(width, height, image.to_rgb8())
            .ok_or_else(|| anyhow!("Pixel buffer does not match {width}x{height}"))?;
        rgb.save(path)
            .with_context(|| format!("Cannot write image '{}'", path.display()))
    }
}

impl ImageSink for OutputStore {
    fn write(&self, unit: &TargetUnit, image: &ImagePlanes) -> Result<PathBuf> {
        let path = self.image_path(unit);
        Self::write_png(&path, image)?;
        Ok(path)
    }

    fn write_scale(&self, unit: &TargetUnit, scale: usize, image: &ImagePlanes) -> Result<PathBuf> {
        let path = self.scale_path(unit, scale);
        Self::write_png(&path, image)?;
        Ok(path)
    }
}
