// ============================================================
// Layer 3 — VGG Architectures
// ============================================================
// The four VGG layouts published by Simonyan & Zisserman,
// in the same order torchvision builds them:
//
//   vgg11  (A)  8 convs
//   vgg13  (B) 10 convs
//   vgg16  (D) 13 convs
//   vgg19  (E) 16 convs
//
// Each layout also exists with a BatchNorm after every conv.
// Pretrained weights for all eight ship with torchvision, so a
// plan here must match torchvision's layer order exactly or
// the weight import will not line up.
//
// Reference: Simonyan & Zisserman (2015) Very Deep Convolutional
//            Networks for Large-Scale Image Recognition

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// One entry of a VGG `features` plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanItem {
    /// 3x3 convolution with this many output channels
    Conv(usize),
    /// 2x2 max pool with stride 2
    Pool,
}

use PlanItem::{Conv, Pool};

const PLAN_A: &[PlanItem] = &[
    Conv(64), Pool,
    Conv(128), Pool,
    Conv(256), Conv(256), Pool,
    Conv(512), Conv(512), Pool,
    Conv(512), Conv(512), Pool,
];

const PLAN_B: &[PlanItem] = &[
    Conv(64), Conv(64), Pool,
    Conv(128), Conv(128), Pool,
    Conv(256), Conv(256), Pool,
    Conv(512), Conv(512), Pool,
    Conv(512), Conv(512), Pool,
];

const PLAN_D: &[PlanItem] = &[
    Conv(64), Conv(64), Pool,
    Conv(128), Conv(128), Pool,
    Conv(256), Conv(256), Conv(256), Pool,
    Conv(512), Conv(512), Conv(512), Pool,
    Conv(512), Conv(512), Conv(512), Pool,
];

const PLAN_E: &[PlanItem] = &[
    Conv(64), Conv(64), Pool,
    Conv(128), Conv(128), Pool,
    Conv(256), Conv(256), Conv(256), Conv(256), Pool,
    Conv(512), Conv(512), Conv(512), Conv(512), Pool,
    Conv(512), Conv(512), Conv(512), Conv(512), Pool,
];

/// A named VGG variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VggArch {
    Vgg11,
    Vgg11Bn,
    Vgg13,
    Vgg13Bn,
    Vgg16,
    Vgg16Bn,
    Vgg19,
    Vgg19Bn,
}

impl VggArch {
    pub const ALL: [VggArch; 8] = [
        VggArch::Vgg11,
        VggArch::Vgg11Bn,
        VggArch::Vgg13,
        VggArch::Vgg13Bn,
        VggArch::Vgg16,
        VggArch::Vgg16Bn,
        VggArch::Vgg19,
        VggArch::Vgg19Bn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VggArch::Vgg11   => "vgg11",
            VggArch::Vgg11Bn => "vgg11_bn",
            VggArch::Vgg13   => "vgg13",
            VggArch::Vgg13Bn => "vgg13_bn",
            VggArch::Vgg16   => "vgg16",
            VggArch::Vgg16Bn => "vgg16_bn",
            VggArch::Vgg19   => "vgg19",
            VggArch::Vgg19Bn => "vgg19_bn",
        }
    }

    pub fn batch_norm(self) -> bool {
        matches!(
            self,
            VggArch::Vgg11Bn | VggArch::Vgg13Bn | VggArch::Vgg16Bn | VggArch::Vgg19Bn
        )
    }

    pub fn plan(self) -> &'static [PlanItem] {
        match self {
            VggArch::Vgg11 | VggArch::Vgg11Bn => PLAN_A,
            VggArch::Vgg13 | VggArch::Vgg13Bn => PLAN_B,
            VggArch::Vgg16 | VggArch::Vgg16Bn => PLAN_D,
            VggArch::Vgg19 | VggArch::Vgg19Bn => PLAN_E,
        }
    }
}

impl fmt::Display for VggArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VggArch {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        VggArch::ALL
            .into_iter()
            .find(|arch| arch.name() == wanted)
            .ok_or_else(|| DomainError::UnknownArch {
                name:     s.to_string(),
                expected: VggArch::ALL.map(VggArch::name).join(", "),
            })
    }
}
