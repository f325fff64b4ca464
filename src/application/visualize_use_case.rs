// ============================================================
// Layer 2 — VisualizeUseCase
// ============================================================
// Orchestrates one activation-maximisation run:
//
//   Step 1: Resolve the layer and check every kernel   (Layer 3 - domain)
//   Step 2: Build the upscaling schedule               (Layer 3 - domain)
//   Step 3: Prepare the output directory + config      (Layer 6 - infra)
//   Step 4: Build the network, load weights            (Layer 6 - infra)
//   Step 5: Optimise an image for each kernel          (Layer 5 - ml)
//   Step 6: Write images and activation log            (Layer 6 - infra)
//
// Steps 1–2 run before anything touches the disk or the GPU,
// so a typo in a layer name fails immediately.

use std::path::PathBuf;

use anyhow::{ensure, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::canvas::CanvasFactory;
use crate::domain::{
    arch::VggArch,
    schedule::ScaleSchedule,
    traits::{ImageSink, UnitVisualizer},
    unit::TargetUnit,
};
use crate::infra::{metrics::ActivationLogger, output::OutputStore, weights::WeightStore};
use crate::ml::{
    ascent::AscentSettings,
    backend::{BackendKind, CpuBackend, GpuBackend},
    model::VggConfig,
    visualizer::{FilterVisualizer, VisualizerSettings},
};

// ─── Visualisation Configuration ─────────────────────────────────────────────
// Every knob of a run. Serialisable so it can be read from a
// JSON file and written next to the images it produced.
// Missing fields in a JSON file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizeConfig {
    pub arch:              VggArch,
    pub weights:           Option<PathBuf>,
    pub layer:             String,
    pub kernels:           Vec<usize>,
    pub size:              usize,
    pub upscaling_steps:   usize,
    pub upscaling_factor:  f64,
    pub opt_steps:         usize,
    pub lr:                f64,
    pub weight_decay:      f64,
    pub blur:              Option<usize>,
    pub seed:              Option<u64>,
    pub init_image:        Option<PathBuf>,
    pub output_dir:        PathBuf,
    pub backend:           BackendKind,
    pub save_intermediate: bool,
}

impl Default for VisualizeConfig {
    fn default() -> Self {
        Self {
            arch:              VggArch::Vgg16,
            weights:           None,
            layer:             "conv5_1".to_string(),
            kernels:           vec![0],
            size:              56,
            upscaling_steps:   12,
            upscaling_factor:  1.2,
            opt_steps:         20,
            lr:                0.1,
            weight_decay:      1e-6,
            blur:              Some(5),
            seed:              None,
            init_image:        None,
            output_dir:        PathBuf::from("output"),
            backend:           BackendKind::default(),
            save_intermediate: false,
        }
    }
}

// ─── VisualizeUseCase ─────────────────────────────────────────────────────────
pub struct VisualizeUseCase {
    config: VisualizeConfig,
}

impl VisualizeUseCase {
    pub fn new(config: VisualizeConfig) -> Self {
        Self { config }
    }

    /// Run on the configured backend. Returns the final image paths,
    /// one per kernel, in the order the kernels were given.
    pub fn execute(&self) -> Result<Vec<PathBuf>> {
        match self.config.backend {
            BackendKind::Wgpu => self.run::<GpuBackend>(BackendKind::gpu_device()),
            BackendKind::Cpu  => self.run::<CpuBackend>(BackendKind::cpu_device()),
        }
    }

    fn run<B: AutodiffBackend>(&self, device: B::Device) -> Result<Vec<PathBuf>> {
        let cfg = &self.config;

        // ── Step 1: Resolve layer and kernels ────────────────────────────────
        ensure!(!cfg.kernels.is_empty(), "No kernels selected");
        // 0 and 1 both mean "no blur"
        let blur = cfg.blur.filter(|&k| k > 1);
        if let Some(k) = blur {
            ensure!(k % 2 == 1, "Blur size must be odd, got {k}");
        }
        let table = VggConfig::from_arch(cfg.arch).layer_table();
        let layer = table.resolve(&cfg.layer)?.clone();
        for &kernel in &cfg.kernels {
            table.check_kernel(&layer, kernel)?;
        }
        tracing::info!(
            "Target: {} {} (features.{}, {} channels), kernels {:?}",
            cfg.arch, layer.name, layer.index, layer.channels, cfg.kernels
        );

        // ── Step 2: Upscaling schedule ────────────────────────────────────────
        let schedule = ScaleSchedule::new(cfg.size, cfg.upscaling_steps, cfg.upscaling_factor)?;
        schedule.require_min_size(table.min_input_size(&layer), &layer.name)?;
        tracing::info!("Scales: {:?} (final {}px)", schedule.sizes(), schedule.final_size());

        // ── Step 3: Output directory ──────────────────────────────────────────
        let store  = OutputStore::new(&cfg.output_dir)?;
        store.save_config(cfg)?;
        let logger = ActivationLogger::new(store.dir())?;

        // ── Step 4: Network ───────────────────────────────────────────────────
        let model = WeightStore::load_or_init::<B>(cfg.arch, cfg.weights.as_deref(), &device)?;
        let settings = VisualizerSettings {
            schedule,
            ascent: AscentSettings {
                steps:        cfg.opt_steps,
                lr:           cfg.lr,
                weight_decay: cfg.weight_decay,
            },
            blur,
            keep_scales: cfg.save_intermediate,
        };
        let mut visualizer = FilterVisualizer::new(model, device, CanvasFactory::new(cfg.seed), settings)
            .with_init_image(cfg.init_image.clone());

        // ── Step 5 + 6: One image per kernel ──────────────────────────────────
        let mut written = Vec::with_capacity(cfg.kernels.len());
        for &kernel in &cfg.kernels {
            let unit  = TargetUnit::new(layer.name.clone(), kernel);
            let image = visualizer.visualize(&unit)?;

            for report in visualizer.reports() {
                logger.log_scale(&unit, report.scale, report.size, &report.activations)?;
                if let Some(img) = &report.image {
                    store.write_scale(&unit, report.scale, img)?;
                }
            }

            let path = store.write(&unit, &image)?;
            tracing::info!("Saved '{}'", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(dir: &std::path::Path) -> VisualizeConfig {
        VisualizeConfig {
            arch:              VggArch::Vgg11,
            layer:             "conv1_1".to_string(),
            kernels:           vec![0, 5],
            size:              8,
            upscaling_steps:   2,
            upscaling_factor:  1.5,
            opt_steps:         2,
            blur:              Some(3),
            seed:              Some(1),
            output_dir:        dir.to_path_buf(),
            backend:           BackendKind::Cpu,
            save_intermediate: true,
            ..VisualizeConfig::default()
        }
    }

    #[test]
    fn test_run_writes_images_log_and_config() {
        let dir   = tempfile::tempdir().unwrap();
        let paths = VisualizeUseCase::new(small_config(dir.path())).execute().unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("layer_conv1_1_filter_5.png"));
        assert!(paths.iter().all(|p| p.exists()));

        let final_img = image::open(&paths[0]).unwrap();
        assert_eq!((final_img.width(), final_img.height()), (12, 12));

        assert!(dir.path().join("layer_conv1_1_filter_0_scale00.png").exists());
        assert!(dir.path().join("layer_conv1_1_filter_0_scale01.png").exists());
        assert!(dir.path().join("run_config.json").exists());

        // header + 2 kernels x 2 scales x 2 steps
        let csv = std::fs::read_to_string(dir.path().join("activations.csv")).unwrap();
        assert_eq!(csv.lines().count(), 9);
    }

    #[test]
    fn test_layer_by_torchvision_index() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = VisualizeConfig {
            layer:             "features.1".to_string(),
            kernels:           vec![2],
            upscaling_steps:   1,
            save_intermediate: false,
            ..small_config(dir.path())
        };
        let paths = VisualizeUseCase::new(cfg).execute().unwrap();
        assert!(paths[0].ends_with("layer_relu1_1_filter_2.png"));
    }

    #[test]
    fn test_kernel_out_of_range_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never");
        let cfg = VisualizeConfig {
            kernels: vec![64],
            ..small_config(&out)
        };
        let err = VisualizeUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(!out.exists());
    }

    #[test]
    fn test_even_blur_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = VisualizeConfig {
            blur: Some(4),
            ..small_config(dir.path())
        };
        assert!(VisualizeUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_zero_blur_means_no_blur() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: VisualizeConfig = serde_json::from_str(r#"{ "blur": 0 }"#).unwrap();
        let cfg = VisualizeConfig {
            blur: cfg.blur,
            ..small_config(dir.path())
        };
        assert_eq!(cfg.blur, Some(0));
        assert_eq!(VisualizeUseCase::new(cfg).execute().unwrap().len(), 2);
    }

    #[test]
    fn test_canvas_too_small_for_layer_fails_before_output() {
        // vgg11 conv5_1 sits behind four 2x2 pools: 8 → 4 → 2 → 1 → 0
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never");
        let cfg = VisualizeConfig {
            layer:   "conv5_1".to_string(),
            kernels: vec![0],
            ..small_config(&out)
        };
        let err = VisualizeUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("needs at least 16px"));
        assert!(!out.exists());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: VisualizeConfig =
            serde_json::from_str(r#"{ "layer": "conv4_2", "kernels": [3, 9], "arch": "vgg19_bn" }"#).unwrap();
        assert_eq!(cfg.arch, VggArch::Vgg19Bn);
        assert_eq!(cfg.kernels, vec![3, 9]);
        assert_eq!(cfg.size, 56);
        assert_eq!(cfg.blur, Some(5));
        assert_eq!(cfg.backend, BackendKind::Wgpu);
    }
}
