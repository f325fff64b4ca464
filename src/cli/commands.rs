// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `visualize`, `layers` and
// `import`, and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::visualize_use_case::VisualizeConfig;
use crate::domain::arch::VggArch;
use crate::ml::backend::BackendKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesise images that maximally excite kernels of one layer
    Visualize(VisualizeArgs),

    /// List the layers of an architecture with their channel counts
    Layers(LayersArgs),

    /// Convert a torchvision .pth state dict into a burnpack (.bpk)
    Import(ImportArgs),
}

/// All arguments for the `visualize` command.
#[derive(Args, Debug)]
pub struct VisualizeArgs {
    /// Read every setting from this JSON file; other flags are ignored
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// VGG variant: vgg11, vgg13, vgg16, vgg19, optionally with _bn
    #[arg(long, default_value = "vgg16")]
    pub arch: VggArch,

    /// Pretrained weights (.pth from torchvision, or .bpk from `import`)
    #[arg(long)]
    pub weights: Option<PathBuf>,

    /// Layer name (conv5_1), torchvision path (features.24) or index (24)
    #[arg(long, default_value = "conv5_1")]
    pub layer: String,

    /// Kernel (channel) indices, comma separated
    #[arg(long = "kernels", short = 'k', value_delimiter = ',', default_value = "0")]
    pub kernels: Vec<usize>,

    /// Side length of the first, smallest image
    #[arg(long, default_value_t = 56)]
    pub size: usize,

    /// Number of scales (the first one included)
    #[arg(long, default_value_t = 12)]
    pub upscaling_steps: usize,

    /// Growth of the side length between scales
    #[arg(long, default_value_t = 1.2)]
    pub upscaling_factor: f64,

    /// Adam steps per scale
    #[arg(long, default_value_t = 20)]
    pub opt_steps: usize,

    #[arg(long, default_value_t = 0.1)]
    pub lr: f64,

    #[arg(long, default_value_t = 1e-6)]
    pub weight_decay: f64,

    /// Odd box-blur size applied after each upscale; 0 disables
    #[arg(long, default_value_t = 5)]
    pub blur: usize,

    /// Seed for the noise canvas
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start from this image instead of noise
    #[arg(long)]
    pub init_image: Option<PathBuf>,

    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// wgpu or cpu
    #[arg(long, default_value = "wgpu")]
    pub backend: BackendKind,

    /// Also write the image produced at every scale
    #[arg(long)]
    pub save_intermediate: bool,
}

/// Convert CLI VisualizeArgs into the application-layer VisualizeConfig.
/// The application layer never sees clap types.
impl From<VisualizeArgs> for VisualizeConfig {
    fn from(a: VisualizeArgs) -> Self {
        VisualizeConfig {
            arch:              a.arch,
            weights:           a.weights,
            layer:             a.layer,
            kernels:           a.kernels,
            size:              a.size,
            upscaling_steps:   a.upscaling_steps,
            upscaling_factor:  a.upscaling_factor,
            opt_steps:         a.opt_steps,
            lr:                a.lr,
            weight_decay:      a.weight_decay,
            blur:              (a.blur > 0).then_some(a.blur),
            seed:              a.seed,
            init_image:        a.init_image,
            output_dir:        a.output_dir,
            backend:           a.backend,
            save_intermediate: a.save_intermediate,
        }
    }
}

#[derive(Args, Debug)]
pub struct LayersArgs {
    #[arg(long, default_value = "vgg16")]
    pub arch: VggArch,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[arg(long, default_value = "vgg16")]
    pub arch: VggArch,

    /// torchvision state dict, e.g. vgg16-397923af.pth
    #[arg(long)]
    pub pytorch: PathBuf,

    /// Destination burnpack
    #[arg(long, default_value = "weights/vgg16.bpk")]
    pub output: PathBuf,
}
