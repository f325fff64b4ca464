// ============================================================
// Layer 3 — ImagePlanes Domain Type
// ============================================================
// An RGB image stored channel-first (CHW) as f32, which is the
// layout a convolutional network consumes:
//
//   data[c * height * width + y * width + x]
//
// Values are nominally in [0, 1] but are allowed to drift
// outside that range during optimisation and resizing.
// Clipping only happens when the image is written to disk.

use crate::domain::error::DomainError;

pub const CHANNELS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlanes {
    pub width:  usize,
    pub height: usize,
    pub data:   Vec<f32>,
}

impl ImagePlanes {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, DomainError> {
        let expected = CHANNELS * width * height;
        if data.len() != expected {
            return Err(DomainError::ImageShape {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Every pixel set to the same RGB value.
    pub fn filled(width: usize, height: usize, rgb: [f32; CHANNELS]) -> Self {
        let plane = width * height;
        let mut data = Vec::with_capacity(CHANNELS * plane);
        for value in rgb {
            data.extend(std::iter::repeat(value).take(plane));
        }
        Self { width, height, data }
    }

    /// Build from interleaved 8-bit RGB (HWC), as produced by `image::RgbImage`.
    pub fn from_rgb8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, DomainError> {
        let plane = width * height;
        if pixels.len() != CHANNELS * plane {
            return Err(DomainError::ImageShape {
                width,
                height,
                expected: CHANNELS * plane,
                actual:   pixels.len(),
            });
        }
        let mut data = vec![0.0f32; CHANNELS * plane];
        for (i, px) in pixels.chunks_exact(CHANNELS).enumerate() {
            for c in 0..CHANNELS {
                data[c * plane + i] = px[c] as f32 / 255.0;
            }
        }
        Ok(Self { width, height, data })
    }

    pub fn plane_len(&self) -> usize {
        self.width * self.height
    }

    pub fn channel(&self, c: usize) -> &[f32] {
        let plane = self.plane_len();
        &self.data[c * plane..(c + 1) * plane]
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; CHANNELS] {
        let plane = self.plane_len();
        let i = y * self.width + x;
        [self.data[i], self.data[plane + i], self.data[2 * plane + i]]
    }

    /// Interleaved 8-bit RGB (HWC), clipped to [0, 1] first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let plane = self.plane_len();
        let mut out = Vec::with_capacity(CHANNELS * plane);
        for i in 0..plane {
            for c in 0..CHANNELS {
                let v = self.data[c * plane + i].clamp(0.0, 1.0);
                out.push((v * 255.0).round() as u8);
            }
        }
        out
    }
}
