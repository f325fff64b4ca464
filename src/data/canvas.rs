// ============================================================
// Layer 4 — Initial Canvas
// ============================================================
// Produces the image the optimiser starts from.
//
// Noise canvas: every channel of every pixel is an integer drawn
// uniformly from [150, 180) and divided by 255, i.e. a light,
// slightly speckled grey.
//
// File canvas: any image the `image` crate can decode, resized
// to the first scale with a Catmull-Rom filter. Useful for
// "dreaming" a unit on top of a photograph.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::image::{ImagePlanes, CHANNELS};

pub const NOISE_LOW: u8 = 150;
pub const NOISE_HIGH: u8 = 180;

pub struct CanvasFactory {
    rng: StdRng,
}

impl CanvasFactory {
    /// A fixed seed makes every canvas reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Square noise canvas with side `size`.
    pub fn noise(&mut self, size: usize) -> ImagePlanes {
        let data = (0..CHANNELS * size * size)
            .map(|_| self.rng.gen_range(NOISE_LOW..NOISE_HIGH) as f32 / 255.0)
            .collect();
        ImagePlanes {
            width:  size,
            height: size,
            data,
        }
    }

    /// Square canvas decoded from an image file.
    pub fn from_file(&self, path: &Path, size: usize) -> Result<ImagePlanes> {
        let img = image::open(path)
            .with_context(|| format!("Cannot open initial image '{}'", path.display()))?
            .to_rgb8();
        let side    = u32::try_from(size).context("Canvas size does not fit in u32")?;
        let resized = imageops::resize(&img, side, side, FilterType::CatmullRom);

        tracing::debug!(
            "Initial image '{}' {}x{} resized to {}x{}",
            path.display(), img.width(), img.height(), size, size
        );
        Ok(ImagePlanes::from_rgb8(size, size, resized.as_raw())?)
    }
}
