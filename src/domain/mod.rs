// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what an activation
// maximization run is about: which network layout, which
// layer and kernel, which sequence of image sizes, and the
// image itself.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// VGG layouts (vgg11 … vgg19, with or without batch norm)
pub mod arch;

// Typed errors for lookups and validation
pub mod error;

// CHW float image used between optimisation scales
pub mod image;

// The torchvision-style `features` layer table
pub mod layer;

// Progressive upscaling schedule
pub mod schedule;

// Core abstractions (traits) that other layers implement
pub mod traits;

// A (layer, kernel) pair to visualise
pub mod unit;
