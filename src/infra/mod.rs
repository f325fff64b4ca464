// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Disk-facing concerns shared by the use cases:
//
//   weights.rs — VGG weights in and out of burn-store
//                (PyTorch state dicts and burnpack files)
//
//   output.rs  — The run directory: PNG images and the
//                run_config.json that produced them
//
//   metrics.rs — Per-step activation log (CSV)
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Pretrained weight loading and conversion
pub mod weights;

/// Images and run config on disk
pub mod output;

/// Activation CSV logger
pub mod metrics;
