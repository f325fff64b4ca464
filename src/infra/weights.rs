// ============================================================
// Layer 6 — Weight Store
// ============================================================
// Moves VGG weights between disk and a `Vgg<B>` with burn-store.
//
// Supported files:
//   *.pth / *.pt → PyTorch state dict (e.g. torchvision's
//                  vgg16-397923af.pth), read with PytorchStore
//   *.bpk        → burnpack, read and written with BurnpackStore
//
// torchvision names parameters by their position in the
// `features` Sequential:
//
//   features.0.weight   (conv1_1)
//   features.2.weight   (conv1_2)
//   features.1.weight   (bn1_1, batch-norm variants only)
//
// Our model groups each conv with its batch norm, so every
// weighted layer gets its own anchored key remapping:
//
//   ^features\.2\.  →  blocks.1.conv.
//   ^features\.1\.  →  blocks.0.norm.   (bn variants)
//
// `classifier.*` keys have no counterpart and are left unused.
//
// Reference: Burn Book (Saving and Loading Models)

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use burn::prelude::*;
use burn_store::{BurnpackStore, ModuleSnapshot, PytorchStore};

use crate::domain::{
    arch::VggArch,
    layer::{LayerKind, LayerTable},
};
use crate::ml::model::{Vgg, VggConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightFormat {
    Pytorch,
    Burnpack,
}

impl WeightFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pth") | Some("pt") => Ok(WeightFormat::Pytorch),
            Some("bpk")              => Ok(WeightFormat::Burnpack),
            _ => bail!(
                "Cannot tell the weight format of '{}' (expected .pth, .pt or .bpk)",
                path.display()
            ),
        }
    }
}

/// (regex, replacement) pairs turning torchvision keys into our module paths.
pub fn torch_key_remaps(table: &LayerTable) -> Vec<(String, String)> {
    table
        .iter()
        .filter_map(|layer| {
            let target = match layer.kind {
                LayerKind::Conv { block }      => format!("blocks.{block}.conv."),
                LayerKind::BatchNorm { block } => format!("blocks.{block}.norm."),
                LayerKind::Relu | LayerKind::MaxPool => return None,
            };
            Some((format!(r"^features\.{}\.", layer.index), target))
        })
        .collect()
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("Weight path '{}' is not valid UTF-8", path.display()))
}

pub struct WeightStore;

impl WeightStore {
    /// Build `arch` and fill it from `weights`, or leave it randomly
    /// initialised when no file is given.
    pub fn load_or_init<B: Backend>(
        arch:    VggArch,
        weights: Option<&Path>,
        device:  &B::Device,
    ) -> Result<Vgg<B>> {
        let model = VggConfig::from_arch(arch).init::<B>(device);
        match weights {
            Some(path) => Self::load(model, path),
            None => {
                tracing::warn!(
                    "No weight file given: {} keeps its random initialisation, \
                     images will show noise-driven patterns only",
                    arch
                );
                Ok(model)
            }
        }
    }

    pub fn load<B: Backend>(mut model: Vgg<B>, path: &Path) -> Result<Vgg<B>> {
        if !path.exists() {
            bail!("Weight file '{}' does not exist", path.display());
        }
        let file = path_str(path)?;

        match WeightFormat::from_path(path)? {
            WeightFormat::Pytorch => {
                // Block indices are already exact after remapping
                let mut store = torch_key_remaps(model.layers())
                    .iter()
                    .fold(
                        PytorchStore::from_file(file).map_indices_contiguous(false),
                        |store, (from, to)| store.with_key_remapping(from.as_str(), to.as_str()),
                    );
                model
                    .load_from(&mut store)
                    .map_err(|e| anyhow!("Cannot load PyTorch weights '{file}': {e:?}"))?;
            }
            WeightFormat::Burnpack => {
                let mut store = BurnpackStore::from_file(file);
                model
                    .load_from(&mut store)
                    .map_err(|e| anyhow!("Cannot load burnpack '{file}': {e:?}"))?;
            }
        }

        tracing::info!("Loaded weights from '{}'", path.display());
        Ok(model)
    }

    /// Write `model` as a burnpack. Returns the path actually written.
    pub fn save<B: Backend>(model: &Vgg<B>, path: &Path) -> Result<PathBuf> {
        let mut path = path.to_path_buf();
        if path.extension().is_none() {
            path.set_extension("bpk");
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Cannot replace '{}'", path.display()))?;
        }

        let mut store = BurnpackStore::from_file(path_str(&path)?);
        model
            .save_into(&mut store)
            .map_err(|e| anyhow!("Cannot write burnpack '{}': {e:?}", path.display()))?;

        tracing::debug!("Saved weights to '{}'", path.display());
        Ok(path)
    }
}
