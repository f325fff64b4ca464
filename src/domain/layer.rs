// ============================================================
// Layer 3 — Layer Table
// ============================================================
// Flattens a VGG plan into the same `features` sequence that
// torchvision builds, so that "features.28" here means exactly
// what `model.features[28]` means in a PyTorch notebook.
//
// Every layer also gets a readable name:
//
//   conv3_2  → second convolution of the third stage
//   bn3_2    → its batch norm (bn variants only)
//   relu3_2  → its ReLU
//   pool3    → the max pool closing the third stage
//
// Example (vgg16, no batch norm):
//   features.0  conv1_1   64 ch
//   features.1  relu1_1   64 ch
//   features.2  conv1_2   64 ch
//   ...
//   features.28 conv5_3  512 ch
//   features.30 pool5    512 ch

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::arch::PlanItem;
use crate::domain::error::DomainError;

/// What a single entry of the `features` sequence does.
/// `block` is the zero-based index of the conv block that owns
/// the parameters (only convs and batch norms carry weights).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Conv { block: usize },
    BatchNorm { block: usize },
    Relu,
    MaxPool,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Conv { .. }      => f.write_str("Conv2d"),
            LayerKind::BatchNorm { .. } => f.write_str("BatchNorm2d"),
            LayerKind::Relu             => f.write_str("ReLU"),
            LayerKind::MaxPool          => f.write_str("MaxPool2d"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Position in the torchvision `features` sequence
    pub index: usize,
    /// Readable name such as `conv4_2`
    pub name: String,
    pub kind: LayerKind,
    /// Number of output channels (= selectable kernels)
    pub channels: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTable {
    layers: Vec<LayerInfo>,
}

impl LayerTable {
    pub fn from_plan(plan: &[PlanItem], batch_norm: bool) -> Self {
        let mut layers   = Vec::new();
        let mut stage    = 1usize;
        let mut conv_num = 0usize;
        let mut block    = 0usize;
        let mut channels = 3usize;

        for item in plan {
            match *item {
                PlanItem::Conv(out) => {
                    conv_num += 1;
                    channels  = out;
                    let suffix = format!("{stage}_{conv_num}");

                    layers.push(LayerInfo {
                        index: layers.len(),
                        name: format!("conv{suffix}"),
                        kind: LayerKind::Conv { block },
                        channels,
                    });
                    if batch_norm {
                        layers.push(LayerInfo {
                            index: layers.len(),
                            name: format!("bn{suffix}"),
                            kind: LayerKind::BatchNorm { block },
                            channels,
                        });
                    }
                    layers.push(LayerInfo {
                        index: layers.len(),
                        name: format!("relu{suffix}"),
                        kind: LayerKind::Relu,
                        channels,
                    });
                    block += 1;
                }
                PlanItem::Pool => {
                    layers.push(LayerInfo {
                        index: layers.len(),
                        name: format!("pool{stage}"),
                        kind: LayerKind::MaxPool,
                        channels,
                    });
                    stage   += 1;
                    conv_num = 0;
                }
            }
        }

        Self { layers }
    }

    pub fn get(&self, index: usize) -> Option<&LayerInfo> {
        self.layers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerInfo> {
        self.layers.iter()
    }

    /// Find a layer by name (`conv5_1`), torchvision path
    /// (`features.28`) or bare index (`28`).
    pub fn resolve(&self, query: &str) -> Result<&LayerInfo, DomainError> {
        let q = query.trim().to_ascii_lowercase();
        let q = q.strip_prefix("features.").unwrap_or(&q);

        let found = match q.parse::<usize>() {
            Ok(index) => self.layers.get(index),
            Err(_)    => self.layers.iter().find(|l| l.name == q),
        };

        found.ok_or_else(|| DomainError::UnknownLayer {
            query:     query.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Fails when `kernel` does not name a channel of `layer`.
    pub fn check_kernel(&self, layer: &LayerInfo, kernel: usize) -> Result<(), DomainError> {
        if kernel < layer.channels {
            Ok(())
        } else {
            Err(DomainError::KernelOutOfRange {
                layer:    layer.name.clone(),
                kernel,
                channels: layer.channels,
            })
        }
    }

    /// Smallest square input that still has at least one pixel left
    /// after every max pool up to and including `layer`.
    pub fn min_input_size(&self, layer: &LayerInfo) -> usize {
        let pools = self
            .layers
            .iter()
            .take(layer.index + 1)
            .filter(|l| l.kind == LayerKind::MaxPool)
            .count();
        1 << pools
    }

    fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arch::VggArch;

    fn table(arch: VggArch) -> LayerTable {
        LayerTable::from_plan(arch.plan(), arch.batch_norm())
    }

    #[test]
    fn test_vgg16_matches_torchvision_length() {
        // torchvision vgg16.features has 31 modules, vgg16_bn has 44
        assert_eq!(table(VggArch::Vgg16).iter().count(), 31);
        assert_eq!(table(VggArch::Vgg16Bn).iter().count(), 44);
        assert_eq!(table(VggArch::Vgg19).iter().count(), 37);
    }

    #[test]
    fn test_vgg16_named_indices() {
        let t = table(VggArch::Vgg16);
        let conv5_1 = t.resolve("conv5_1").unwrap();
        assert_eq!(conv5_1.index, 24);
        assert_eq!(conv5_1.channels, 512);
        assert_eq!(conv5_1.kind, LayerKind::Conv { block: 10 });

        assert_eq!(t.get(28).unwrap().name, "conv5_3");
        assert_eq!(t.get(30).unwrap().name, "pool5");
        assert_eq!(t.get(1).unwrap().kind, LayerKind::Relu);
    }

    #[test]
    fn test_batch_norm_follows_conv() {
        let t = table(VggArch::Vgg11Bn);
        assert_eq!(t.get(0).unwrap().name, "conv1_1");
        assert_eq!(t.get(1).unwrap().kind, LayerKind::BatchNorm { block: 0 });
        assert_eq!(t.get(2).unwrap().name, "relu1_1");
        assert_eq!(t.get(3).unwrap().name, "pool1");
    }

    #[test]
    fn test_resolve_accepts_path_index_and_name() {
        let t = table(VggArch::Vgg16);
        assert_eq!(t.resolve("features.28").unwrap().name, "conv5_3");
        assert_eq!(t.resolve("28").unwrap().name, "conv5_3");
        assert_eq!(t.resolve(" Conv5_3 ").unwrap().index, 28);
    }

    #[test]
    fn test_resolve_unknown_layer() {
        let t = table(VggArch::Vgg11);
        let err = t.resolve("conv9_9").unwrap_err();
        assert!(matches!(err, DomainError::UnknownLayer { .. }));
        assert!(t.resolve("99").is_err());
    }

    #[test]
    fn test_kernel_range() {
        let t = table(VggArch::Vgg16);
        let layer = t.resolve("conv1_1").unwrap();
        assert!(t.check_kernel(layer, 63).is_ok());
        assert_eq!(
            t.check_kernel(layer, 64),
            Err(DomainError::KernelOutOfRange {
                layer:    "conv1_1".to_string(),
                kernel:   64,
                channels: 64,
            })
        );
    }

    #[test]
    fn test_pool_keeps_previous_channels() {
        let t = table(VggArch::Vgg13);
        let pool2 = t.resolve("pool2").unwrap();
        assert_eq!(pool2.channels, 128);
    }

    #[test]
    fn test_min_input_size_counts_pools_up_to_layer() {
        let t = table(VggArch::Vgg11);
        let min = |name: &str| t.min_input_size(t.resolve(name).unwrap());
        assert_eq!(min("conv1_1"), 1);
        assert_eq!(min("pool1"), 2);
        assert_eq!(min("conv2_1"), 2);
        assert_eq!(min("conv5_1"), 16);
        assert_eq!(min("pool5"), 32);
    }
}
