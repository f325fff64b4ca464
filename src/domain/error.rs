// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Typed errors for everything the domain layer validates.
// Upper layers wrap these in anyhow with extra context.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown architecture '{name}' (expected one of: {expected})")]
    UnknownArch { name: String, expected: String },

    #[error("unknown layer '{query}'; available layers: {available}")]
    UnknownLayer { query: String, available: String },

    #[error("kernel {kernel} is out of range for layer '{layer}' ({channels} channels)")]
    KernelOutOfRange {
        layer:    String,
        kernel:   usize,
        channels: usize,
    },

    #[error("invalid scale schedule: {0}")]
    InvalidSchedule(String),

    #[error("image buffer holds {actual} values, expected {expected} for {width}x{height} RGB")]
    ImageShape {
        width:    usize,
        height:   usize,
        expected: usize,
        actual:   usize,
    },
}
