// ============================================================
// Layer 2 — LayersUseCase
// ============================================================
// Lists every layer a unit can be picked from, so users can
// find the right name before starting a long run.

use crate::domain::{arch::VggArch, layer::LayerTable};
use crate::ml::model::VggConfig;

pub struct LayersUseCase {
    arch: VggArch,
}

impl LayersUseCase {
    pub fn new(arch: VggArch) -> Self {
        Self { arch }
    }

    pub fn table(&self) -> LayerTable {
        VggConfig::from_arch(self.arch).layer_table()
    }
}
