// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one user-facing goal.
//
// Rules for this layer:
//   - No tensor math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Synthesise images for one layer's kernels
pub mod visualize_use_case;

// List the selectable layers of an architecture
pub mod layers_use_case;

// Convert PyTorch weights into a burnpack
pub mod import_use_case;
