use burn::{
    module::Ignored,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::arch::{PlanItem, VggArch};
use crate::domain::layer::{LayerKind, LayerTable};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct VggConfig {
    pub plan: Vec<PlanItem>,
    #[config(default = false)]
    pub batch_norm: bool,
}

impl VggConfig {
    pub fn from_arch(arch: VggArch) -> Self {
        Self::new(arch.plan().to_vec()).with_batch_norm(arch.batch_norm())
    }

    pub fn layer_table(&self) -> LayerTable {
        LayerTable::from_plan(&self.plan, self.batch_norm)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Vgg<B> {
        let mut blocks      = Vec::new();
        let mut in_channels = 3usize;
        for item in &self.plan {
            if let PlanItem::Conv(out_channels) = *item {
                blocks.push(self.build_block(in_channels, out_channels, device));
                in_channels = out_channels;
            }
        }
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();
        Vgg {
            blocks,
            pool,
            layers: Ignored(self.layer_table()),
        }
    }

    fn build_block<B: Backend>(
        &self,
        in_channels:  usize,
        out_channels: usize,
        device:       &B::Device,
    ) -> ConvBlock<B> {
        let conv = Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let norm = self
            .batch_norm
            .then(|| BatchNormConfig::new(out_channels).init(device));
        ConvBlock { conv, norm }
    }
}

/// One 3x3 convolution plus its optional batch norm.
/// The ReLU that follows has no parameters and lives in `Vgg::forward_until`.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: Option<BatchNorm<B>>,
}

/// Running statistics are always used: `BatchNorm::forward` switches to
/// batch statistics on autodiff backends.
fn frozen_batch_norm<B: Backend>(norm: &BatchNorm<B>, x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [_, channels, _, _] = x.dims();
    let shape = [1, channels, 1, 1];

    let mean  = norm.running_mean.value().reshape(shape);
    let var   = norm.running_var.value().reshape(shape);
    let gamma = norm.gamma.val().reshape(shape);
    let beta  = norm.beta.val().reshape(shape);

    (x - mean) / (var + norm.epsilon).sqrt() * gamma + beta
}

/// The `features` half of a VGG network. The classifier is never needed:
/// every unit worth visualising lives in the convolutional trunk.
#[derive(Module, Debug)]
pub struct Vgg<B: Backend> {
    pub blocks: Vec<ConvBlock<B>>,
    pub pool:   MaxPool2d,
    pub layers: Ignored<LayerTable>,
}

impl<B: Backend> Vgg<B> {
    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// images: [batch, 3, H, W] → output of `features[index]`.
    ///
    /// Stops as soon as the requested layer has run, which is both the
    /// forward hook and a shortcut past the deeper layers.
    pub fn forward_until(&self, images: Tensor<B, 4>, index: usize) -> Tensor<B, 4> {
        let mut x = images;
        for layer in self.layers.iter().take(index + 1) {
            x = match layer.kind {
                LayerKind::Conv { block } => self.blocks[block].conv.forward(x),
                LayerKind::BatchNorm { block } => match &self.blocks[block].norm {
                    Some(norm) => frozen_batch_norm(norm, x),
                    None       => x,
                },
                LayerKind::Relu    => relu(x),
                LayerKind::MaxPool => self.pool.forward(x),
            };
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::domain::arch::PlanItem::{Conv, Pool};

    type TestBackend = NdArray;

    fn tiny(batch_norm: bool) -> VggConfig {
        VggConfig::new(vec![Conv(4), Pool, Conv(8), Conv(8), Pool]).with_batch_norm(batch_norm)
    }

    fn input(size: usize) -> Tensor<TestBackend, 4> {
        let device = Default::default();
        Tensor::random([1, 3, size, size], burn::tensor::Distribution::Default, &device)
    }

    #[test]
    fn test_block_count_matches_convs() {
        let device = Default::default();
        let model: Vgg<TestBackend> = tiny(false).init(&device);
        assert_eq!(model.blocks.len(), 3);
        assert_eq!(model.layers().iter().count(), 8);
    }

    #[test]
    fn test_forward_until_shapes() {
        let device = Default::default();
        let model: Vgg<TestBackend> = tiny(false).init(&device);
        let x = input(8);

        assert_eq!(model.forward_until(x.clone(), 0).dims(), [1, 4, 8, 8]);
        assert_eq!(model.forward_until(x.clone(), 2).dims(), [1, 4, 4, 4]);
        assert_eq!(model.forward_until(x.clone(), 3).dims(), [1, 8, 4, 4]);
        assert_eq!(model.forward_until(x, 7).dims(), [1, 8, 2, 2]);
    }

    #[test]
    fn test_relu_output_is_non_negative() {
        let device = Default::default();
        let model: Vgg<TestBackend> = tiny(false).init(&device);
        let out = model.forward_until(input(8), 1);
        let min: f32 = out.min().into_scalar().elem();
        assert!(min >= 0.0);
    }

    #[test]
    fn test_fresh_batch_norm_is_near_identity() {
        // Fresh running stats are mean 0, var 1, gamma 1, beta 0
        let device = Default::default();
        let model: Vgg<TestBackend> = tiny(true).init(&device);
        let x = input(8);

        let conv = model.forward_until(x.clone(), 0);
        let norm = model.forward_until(x, 1);
        let diff: f32 = (conv - norm).abs().max().into_scalar().elem();
        assert!(diff < 1e-3);
    }

    #[test]
    fn test_from_arch_uses_plan() {
        let cfg = VggConfig::from_arch(VggArch::Vgg16Bn);
        assert!(cfg.batch_norm);
        assert_eq!(cfg.layer_table().iter().count(), 44);
    }
}
