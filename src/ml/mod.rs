// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn framework specific code.
// The domain and data layers stay free of tensors.
//
// What's in this layer:
//
//   backend.rs    — Autodiff backends (wgpu / ndarray)
//
//   model.rs      — VGG `features` trunk with a forward pass
//                   that stops at any layer (the "hook")
//
//   transforms.rs — Bicubic upscaling and box blur of the canvas
//
//   ascent.rs     — Adam gradient ascent on the input image
//
//   visualizer.rs — Multi-scale optimisation of one unit
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Optimizers)

/// Backend aliases and runtime selection
pub mod backend;

/// VGG feature extractor
pub mod model;

/// Canvas resize / blur on the backend
pub mod transforms;

/// Gradient ascent loop
pub mod ascent;

/// Progressive-upscaling visualiser
pub mod visualizer;
