// ============================================================
// Layer 4 — ImageNet Normalisation
// ============================================================
// torchvision's pretrained VGG weights expect each channel to
// be standardised with the ImageNet training statistics:
//
//   x' = (x - mean[c]) / std[c]
//
// The optimiser works in that normalised space; the image is
// mapped back to [0, 1]-ish RGB between scales so that resizing
// and blurring operate on ordinary pixel values.

use crate::domain::image::{ImagePlanes, CHANNELS};

pub const IMAGENET_MEAN: [f32; CHANNELS] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; CHANNELS] = [0.229, 0.224, 0.225];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    mean: [f32; CHANNELS],
    std:  [f32; CHANNELS],
}

impl Normalizer {
    pub fn new(mean: [f32; CHANNELS], std: [f32; CHANNELS]) -> Self {
        Self { mean, std }
    }

    pub fn imagenet() -> Self {
        Self::new(IMAGENET_MEAN, IMAGENET_STD)
    }

    pub fn normalize(&self, img: &ImagePlanes) -> ImagePlanes {
        self.map_channels(img, |c, v| (v - self.mean[c]) / self.std[c])
    }

    pub fn denormalize(&self, img: &ImagePlanes) -> ImagePlanes {
        self.map_channels(img, |c, v| v * self.std[c] + self.mean[c])
    }

    fn map_channels(&self, img: &ImagePlanes, f: impl Fn(usize, f32) -> f32) -> ImagePlanes {
        let plane = img.plane_len();
        let data = img
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| f(i / plane, v))
            .collect();
        ImagePlanes {
            width:  img.width,
            height: img.height,
            data,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::imagenet()
    }
}
