// ============================================================
// Layer 5 — FilterVisualizer
// ============================================================
// Runs the full multi-scale optimisation for one unit:
//
//   canvas (noise or file) at sizes[0]
//   for each scale:
//       resize + blur           (skipped at the first scale)
//       normalise → ascend → denormalise
//   return the last denormalised image
//
// The resize/blur that would follow the last scale is never
// applied, so the returned image is exactly what the optimiser
// produced.

use std::path::PathBuf;

use anyhow::Result;
use burn::{module::Module, tensor::backend::AutodiffBackend};

use crate::data::{canvas::CanvasFactory, preprocess::Normalizer};
use crate::domain::{
    image::ImagePlanes, schedule::ScaleSchedule, traits::UnitVisualizer, unit::TargetUnit,
};
use crate::ml::{
    ascent::{ascend, AscentSettings},
    model::Vgg,
    transforms::{box_blur, resize, to_planes, to_tensor},
};

#[derive(Debug, Clone)]
pub struct VisualizerSettings {
    pub schedule: ScaleSchedule,
    pub ascent:   AscentSettings,
    /// Box blur size applied after every upscale; `None` disables it
    pub blur:     Option<usize>,
    /// Keep a copy of every scale's image in the reports
    pub keep_scales: bool,
}

/// What happened at one scale of the last `visualize` call.
#[derive(Debug, Clone)]
pub struct ScaleReport {
    pub scale:       usize,
    pub size:        usize,
    pub activations: Vec<f32>,
    pub image:       Option<ImagePlanes>,
}

impl ScaleReport {
    pub fn final_activation(&self) -> Option<f32> {
        self.activations.last().copied()
    }
}

pub struct FilterVisualizer<B: AutodiffBackend> {
    model:      Vgg<B>,
    device:     B::Device,
    normalizer: Normalizer,
    canvas:     CanvasFactory,
    init_image: Option<PathBuf>,
    settings:   VisualizerSettings,
    reports:    Vec<ScaleReport>,
}

impl<B: AutodiffBackend> FilterVisualizer<B> {
    pub fn new(
        model:    Vgg<B>,
        device:   B::Device,
        canvas:   CanvasFactory,
        settings: VisualizerSettings,
    ) -> Self {
        Self {
            // Only the canvas is optimised
            model: model.no_grad(),
            device,
            normalizer: Normalizer::imagenet(),
            canvas,
            init_image: None,
            settings,
            reports: Vec::new(),
        }
    }

    /// Start every run from this image instead of noise.
    pub fn with_init_image(mut self, path: Option<PathBuf>) -> Self {
        self.init_image = path;
        self
    }

    /// Per-scale reports of the most recent `visualize` call.
    pub fn reports(&self) -> &[ScaleReport] {
        &self.reports
    }

    fn initial_canvas(&mut self, size: usize) -> Result<ImagePlanes> {
        match &self.init_image {
            Some(path) => self.canvas.from_file(path, size),
            None       => Ok(self.canvas.noise(size)),
        }
    }
}

impl<B: AutodiffBackend> UnitVisualizer for FilterVisualizer<B> {
    fn visualize(&mut self, unit: &TargetUnit) -> Result<ImagePlanes> {
        let table = self.model.layers();
        let layer = table.resolve(&unit.layer)?;
        table.check_kernel(layer, unit.kernel)?;
        self.settings
            .schedule
            .require_min_size(table.min_input_size(layer), &layer.name)?;
        let index = layer.index;

        self.reports.clear();
        let sizes = self.settings.schedule.sizes().to_vec();
        let mut image = self.initial_canvas(sizes[0])?;

        for (scale, &size) in sizes.iter().enumerate() {
            if scale > 0 {
                image = resize::<B::InnerBackend>(&image, size, &self.device)?;
                if let Some(k) = self.settings.blur {
                    image = box_blur::<B::InnerBackend>(&image, k, &self.device)?;
                }
            }

            let input   = to_tensor::<B::InnerBackend>(&self.normalizer.normalize(&image), &self.device);
            let outcome = ascend(&self.model, index, unit.kernel, input, &self.settings.ascent);
            image = self.normalizer.denormalize(&to_planes(outcome.pixels)?);

            let report = ScaleReport {
                scale,
                size,
                activations: outcome.activations,
                image: self.settings.keep_scales.then(|| image.clone()),
            };
            tracing::info!(
                "{} | scale {:>2}/{} | {}x{} | activation={:.4}",
                unit.file_stem(),
                scale + 1,
                sizes.len(),
                size,
                size,
                report.final_activation().unwrap_or(f32::NAN),
            );
            self.reports.push(report);
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arch::PlanItem::{Conv, Pool};
    use crate::ml::backend::CpuBackend;
    use crate::ml::model::VggConfig;

    fn visualizer(steps: usize, keep_scales: bool) -> FilterVisualizer<CpuBackend> {
        let device = Default::default();
        let model  = VggConfig::new(vec![Conv(4), Pool, Conv(8), Pool]).init::<CpuBackend>(&device);
        let settings = VisualizerSettings {
            schedule: ScaleSchedule::new(8, steps, 1.5).unwrap(),
            ascent:   AscentSettings { steps: 3, ..AscentSettings::default() },
            blur:     Some(3),
            keep_scales,
        };
        FilterVisualizer::new(model, device, CanvasFactory::new(Some(5)), settings)
    }

    #[test]
    fn test_output_has_last_scale_size() {
        let mut vis = visualizer(3, false);
        let img = vis.visualize(&TargetUnit::new("conv2_1", 3)).unwrap();
        // 8 → 12 → 18
        assert_eq!((img.width, img.height), (18, 18));

        let sizes: Vec<usize> = vis.reports().iter().map(|r| r.size).collect();
        assert_eq!(sizes, vec![8, 12, 18]);
        assert!(vis.reports().iter().all(|r| r.activations.len() == 3 && r.image.is_none()));
    }

    #[test]
    fn test_keep_scales_stores_images() {
        let mut vis = visualizer(2, true);
        let img = vis.visualize(&TargetUnit::new("relu1_1", 0)).unwrap();
        let last = vis.reports().last().unwrap().image.clone().unwrap();
        assert_eq!(last, img);
    }

    #[test]
    fn test_rejects_bad_kernel() {
        let mut vis = visualizer(1, false);
        let err = vis.visualize(&TargetUnit::new("conv1_1", 4)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_rejects_unknown_layer() {
        let mut vis = visualizer(1, false);
        assert!(vis.visualize(&TargetUnit::new("fc7", 0)).is_err());
    }

    #[test]
    fn test_rejects_canvas_smaller_than_pools() {
        let mut vis = visualizer(2, false);
        vis.settings.schedule = ScaleSchedule::new(2, 2, 1.5).unwrap();
        // pool2 needs 4px: 2 → 1 → 0
        let err = vis.visualize(&TargetUnit::new("pool2", 0)).unwrap_err();
        assert!(err.to_string().contains("needs at least 4px"));
        assert!(vis.reports().is_empty());
    }

    #[test]
    fn test_visualize_leaves_batch_norm_model_untouched() {
        let device = Default::default();
        let model  = VggConfig::new(vec![Conv(4), Pool, Conv(8), Pool])
            .with_batch_norm(true)
            .init::<CpuBackend>(&device);
        let settings = VisualizerSettings {
            schedule:    ScaleSchedule::new(8, 2, 1.5).unwrap(),
            ascent:      AscentSettings { steps: 2, ..AscentSettings::default() },
            blur:        Some(3),
            keep_scales: false,
        };
        let mut vis = FilterVisualizer::new(model, device, CanvasFactory::new(Some(3)), settings);

        let weights = |vis: &FilterVisualizer<CpuBackend>| -> Vec<Vec<f32>> {
            vis.model
                .blocks
                .iter()
                .flat_map(|b| {
                    let norm = b.norm.as_ref().unwrap();
                    [
                        b.conv.weight.val().into_data().to_vec::<f32>().unwrap(),
                        norm.running_mean.value().into_data().to_vec::<f32>().unwrap(),
                        norm.running_var.value().into_data().to_vec::<f32>().unwrap(),
                    ]
                })
                .collect()
        };
        let before = weights(&vis);
        vis.visualize(&TargetUnit::new("relu2_1", 2)).unwrap();
        assert_eq!(weights(&vis), before);
    }
}
