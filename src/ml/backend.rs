// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Gradient ascent needs an autodiff backend. Two are offered:
//
//   wgpu → Autodiff<Wgpu>    (GPU via Vulkan / Metal / DX12)
//   cpu  → Autodiff<NdArray> (portable, slow, used by the tests)

use std::{fmt, str::FromStr};

use burn::backend::{
    ndarray::{NdArray, NdArrayDevice},
    wgpu::{Wgpu, WgpuDevice},
    Autodiff,
};
use serde::{Deserialize, Serialize};

pub type GpuBackend = Autodiff<Wgpu>;
pub type CpuBackend = Autodiff<NdArray>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Wgpu,
    Cpu,
}

impl BackendKind {
    pub fn gpu_device() -> WgpuDevice {
        WgpuDevice::default()
    }

    pub fn cpu_device() -> NdArrayDevice {
        NdArrayDevice::default()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Wgpu => f.write_str("wgpu"),
            BackendKind::Cpu  => f.write_str("cpu"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgpu" | "gpu" | "vulkan" | "metal" => Ok(BackendKind::Wgpu),
            "cpu" | "ndarray"                   => Ok(BackendKind::Cpu),
            other => Err(format!("unknown backend '{other}' (expected wgpu or cpu)")),
        }
    }
}
