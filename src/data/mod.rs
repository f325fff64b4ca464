// ============================================================
// Layer 4 — Image Data Pipeline
// ============================================================
// Everything that happens to the canvas outside the network:
//
//   noise / image file
//       │
//       ▼
//   CanvasFactory     → initial RGB canvas in [0, 1]
//       │
//       ▼
//   Normalizer        → ImageNet standardisation before each scale,
//                       and its inverse afterwards
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Noise and file-based starting images
pub mod canvas;

/// ImageNet mean/std normalisation
pub mod preprocess;
