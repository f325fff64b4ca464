// ============================================================
// Layer 3 — TargetUnit Domain Type
// ============================================================
// The thing being visualised: one kernel (output channel) of
// one layer. The optimiser maximises the mean of that channel's
// activation map over all spatial positions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetUnit {
    /// Resolved layer name, e.g. `conv5_1`
    pub layer: String,

    /// Channel index inside that layer
    pub kernel: usize,
}

impl TargetUnit {
    pub fn new(layer: impl Into<String>, kernel: usize) -> Self {
        Self {
            layer: layer.into(),
            kernel,
        }
    }

    /// Base file name shared by every artefact of this unit.
    pub fn file_stem(&self) -> String {
        format!("layer_{}_filter_{}", self.layer, self.kernel)
    }
}
