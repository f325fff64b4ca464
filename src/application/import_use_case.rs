// ============================================================
// Layer 2 — ImportUseCase
// ============================================================
// Converts a torchvision VGG state dict (.pth) into a burnpack
// (.bpk). Reading a burnpack is much faster than parsing a
// pickle, so converting once pays off across many runs.
//
//   Step 1: Check the source really is a PyTorch file
//   Step 2: Build the architecture and load the state dict  (Layer 6 - infra)
//   Step 3: Write the burnpack                              (Layer 6 - infra)

use std::path::PathBuf;

use anyhow::{bail, Result};
use burn::{backend::NdArray, module::Module};

use crate::domain::arch::VggArch;
use crate::infra::weights::{WeightFormat, WeightStore};

pub struct ImportUseCase {
    arch:   VggArch,
    source: PathBuf,
    output: PathBuf,
}

impl ImportUseCase {
    pub fn new(arch: VggArch, source: PathBuf, output: PathBuf) -> Self {
        Self { arch, source, output }
    }

    /// Returns the path of the written burnpack.
    pub fn execute(&self) -> Result<PathBuf> {
        if WeightFormat::from_path(&self.source)? != WeightFormat::Pytorch {
            bail!(
                "'{}' is not a PyTorch checkpoint; import expects a .pth or .pt file",
                self.source.display()
            );
        }

        // Conversion needs no gradients and no GPU
        let device = Default::default();
        let model  = WeightStore::load_or_init::<NdArray>(self.arch, Some(&self.source), &device)?;
        tracing::info!("{} loaded: {} parameters", self.arch, model.num_params());

        WeightStore::save(&model, &self.output)
    }
}
