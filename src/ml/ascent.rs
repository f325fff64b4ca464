// ============================================================
// Layer 5 — Gradient Ascent on the Input Image
// ============================================================
// The usual training loop, turned around: the network is frozen
// and the *image* is the only parameter.
//
//   activation = mean( features[layer](image)[:, kernel, :, :] )
//   loss       = -activation
//
// Minimising the loss with Adam pushes the image towards
// whatever pattern makes the chosen kernel fire the strongest.
// A tiny weight decay keeps pixel values from drifting off.
//
// Reference: Erhan et al. (2009) Visualizing Higher-Layer Features
//            Kingma & Ba (2015) Adam

use burn::{
    module::Param,
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::ml::model::Vgg;

/// The image being optimised, wrapped as a module so the optimiser can
/// treat it like any other set of weights.
#[derive(Module, Debug)]
pub struct Canvas<B: Backend> {
    pub pixels: Param<Tensor<B, 4>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AscentSettings {
    /// Optimiser steps per scale
    pub steps: usize,
    pub lr: f64,
    pub weight_decay: f64,
}

impl Default for AscentSettings {
    fn default() -> Self {
        Self {
            steps:        20,
            lr:           0.1,
            weight_decay: 1e-6,
        }
    }
}

pub struct AscentOutcome<B: Backend> {
    /// Optimised (still normalised) image, detached from the graph
    pub pixels: Tensor<B, 4>,
    /// Target activation measured at the start of every step
    pub activations: Vec<f32>,
}

/// Mean of one channel over batch and all spatial positions.
pub fn channel_activation<B: Backend>(features: Tensor<B, 4>, kernel: usize) -> Tensor<B, 1> {
    let [batch, _, height, width] = features.dims();
    features
        .slice([0..batch, kernel..kernel + 1, 0..height, 0..width])
        .mean()
}

pub fn ascend<B: AutodiffBackend>(
    model:    &Vgg<B>,
    layer:    usize,
    kernel:   usize,
    pixels:   Tensor<B::InnerBackend, 4>,
    settings: &AscentSettings,
) -> AscentOutcome<B::InnerBackend> {
    let mut canvas = Canvas {
        pixels: Param::from_tensor(Tensor::<B, 4>::from_inner(pixels).require_grad()),
    };

    let mut optim = AdamConfig::new()
        .with_weight_decay(Some(WeightDecayConfig::new(settings.weight_decay.elem())))
        .init();

    let mut activations = Vec::with_capacity(settings.steps);

    for step in 1..=settings.steps {
        let features   = model.forward_until(canvas.pixels.val(), layer);
        let activation = channel_activation(features, kernel);

        let value: f32 = activation.clone().into_scalar().elem();
        activations.push(value);
        tracing::debug!("step {:>3}/{} | activation={:.5}", step, settings.steps, value);

        let loss  = activation.neg();
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &canvas);
        canvas = optim.step(settings.lr, canvas, grads);
    }

    AscentOutcome {
        pixels: canvas.pixels.val().inner(),
        activations,
    }
}
