// ============================================================
// Layer 5 — Canvas Transforms
// ============================================================
// Between two optimisation scales the canvas is
//
//   1. upscaled with bicubic interpolation
//   2. smoothed with a k x k box filter
//
// The blur mirrors the image around its edge pixels before
// averaging (gfedcb|abcdefgh|gfedcba, OpenCV's BORDER_REFLECT_101),
// so every output pixel is a mean of exactly k*k input pixels.
//
// Reference: Burn Book §3 (Tensor operations)

use anyhow::{anyhow, ensure, Result};
use burn::{
    nn::{pool::AvgPool2dConfig, PaddingConfig2d},
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

use crate::domain::image::{ImagePlanes, CHANNELS};

/// ImagePlanes → [1, 3, H, W]
pub fn to_tensor<B: Backend>(img: &ImagePlanes, device: &B::Device) -> Tensor<B, 4> {
    Tensor::<B, 1>::from_floats(img.data.as_slice(), device)
        .reshape([1, CHANNELS, img.height, img.width])
}

/// [1, 3, H, W] → ImagePlanes
pub fn to_planes<B: Backend>(tensor: Tensor<B, 4>) -> Result<ImagePlanes> {
    let [batch, channels, height, width] = tensor.dims();
    ensure!(
        batch == 1 && channels == CHANNELS,
        "expected a single RGB image, got shape [{batch}, {channels}, {height}, {width}]"
    );
    let data = tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read image tensor: {e:?}"))?;
    Ok(ImagePlanes::new(width, height, data)?)
}

/// Bicubic resize to a `size` x `size` square.
pub fn resize<B: Backend>(img: &ImagePlanes, size: usize, device: &B::Device) -> Result<ImagePlanes> {
    if img.width == size && img.height == size {
        return Ok(img.clone());
    }
    let x = to_tensor::<B>(img, device);
    let y = interpolate(x, [size, size], InterpolateOptions::new(InterpolateMode::Bicubic));
    to_planes(y)
}

/// Source index for position `i` of a `len`-long signal mirrored
/// around its first and last samples.
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = i.rem_euclid(period);
    (if m >= len as isize { period - m } else { m }) as usize
}

/// Grows `dim` by `pad` mirrored samples on both sides.
fn reflect_pad<B: Backend>(x: Tensor<B, 4>, dim: usize, pad: usize, device: &B::Device) -> Tensor<B, 4> {
    let len = x.dims()[dim];
    let indices: Vec<i32> = (-(pad as isize)..(len + pad) as isize)
        .map(|i| reflect_101(i, len) as i32)
        .collect();
    x.select(dim, Tensor::<B, 1, Int>::from_ints(indices.as_slice(), device))
}

/// k x k mean filter with mirrored borders.
pub fn box_blur<B: Backend>(img: &ImagePlanes, kernel: usize, device: &B::Device) -> Result<ImagePlanes> {
    ensure!(kernel % 2 == 1, "blur size must be odd, got {kernel}");
    if kernel == 1 {
        return Ok(img.clone());
    }
    let pad = kernel / 2;
    let x   = to_tensor::<B>(img, device);
    let x   = reflect_pad(reflect_pad(x, 2, pad, device), 3, pad, device);

    let pool = AvgPool2dConfig::new([kernel, kernel])
        .with_strides([1, 1])
        .with_padding(PaddingConfig2d::Valid)
        .init();
    to_planes(pool.forward(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn device() -> <TestBackend as Backend>::Device {
        Default::default()
    }

    #[test]
    fn test_tensor_layout_is_chw() {
        let img = ImagePlanes::new(2, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let t   = to_tensor::<TestBackend>(&img, &device());
        assert_eq!(t.dims(), [1, 3, 1, 2]);
        let blue: Vec<f32> = t.slice([0..1, 2..3, 0..1, 0..2]).into_data().to_vec().unwrap();
        assert_eq!(blue, vec![5.0, 6.0]);
    }

    #[test]
    fn test_resize_changes_size() {
        let img = ImagePlanes::filled(5, 5, [0.2, 0.4, 0.6]);
        let out = resize::<TestBackend>(&img, 7, &device()).unwrap();
        assert_eq!((out.width, out.height), (7, 7));
        for (c, expected) in [0.2f32, 0.4, 0.6].into_iter().enumerate() {
            assert!(out.channel(c).iter().all(|v| (v - expected).abs() < 1e-4));
        }
    }

    #[test]
    fn test_blur_keeps_flat_image_flat() {
        // Edge pixels must not darken
        let img = ImagePlanes::filled(6, 6, [0.5, 0.5, 0.5]);
        let out = box_blur::<TestBackend>(&img, 5, &device()).unwrap();
        assert_eq!((out.width, out.height), (6, 6));
        assert!(out.data.iter().all(|v| (v - 0.5).abs() < 1e-5));
    }

    #[test]
    fn test_blur_spreads_a_point() {
        let mut img = ImagePlanes::filled(5, 5, [0.0, 0.0, 0.0]);
        img.data[2 * 5 + 2] = 9.0;
        let out = box_blur::<TestBackend>(&img, 3, &device()).unwrap();
        assert!((out.pixel(2, 2)[0] - 1.0).abs() < 1e-5);
        assert!((out.pixel(1, 1)[0] - 1.0).abs() < 1e-5);
        assert_eq!(out.pixel(0, 0)[0], 0.0);
    }

    #[test]
    fn test_blur_rejects_even_kernel() {
        let img = ImagePlanes::filled(4, 4, [0.0; 3]);
        assert!(box_blur::<TestBackend>(&img, 4, &device()).is_err());
    }

    #[test]
    fn test_reflect_101_indices() {
        let mirrored: Vec<usize> = (-3..8).map(|i| reflect_101(i, 5)).collect();
        assert_eq!(mirrored, vec![3, 2, 1, 0, 1, 2, 3, 4, 3, 2, 1]);
        assert_eq!(reflect_101(-2, 1), 0);
    }

    #[test]
    fn test_blur_mirrors_corners() {
        // The 3x3 window at (0, 0) reads rows/cols {1, 0, 1}: the corner
        // value is counted once out of nine
        let mut img = ImagePlanes::filled(3, 3, [0.0, 0.0, 0.0]);
        img.data[0] = 9.0;
        let out = box_blur::<TestBackend>(&img, 3, &device()).unwrap();
        assert!((out.pixel(0, 0)[0] - 1.0).abs() < 1e-5);
        assert!((out.pixel(1, 1)[0] - 1.0).abs() < 1e-5);
        assert!((out.pixel(2, 2)[0] - 0.0).abs() < 1e-5);
    }
}
