// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to the optimiser and to the
// output directory only through these traits, so a run can be
// pointed at a different backend or a different sink without
// touching the orchestration code.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::image::ImagePlanes;
use crate::domain::unit::TargetUnit;

// ─── UnitVisualizer ───────────────────────────────────────────────────────────
/// Anything that can synthesise an image for a unit.
///
/// Implementations:
///   - FilterVisualizer → gradient ascent through a Burn VGG
pub trait UnitVisualizer {
    fn visualize(&mut self, unit: &TargetUnit) -> Result<ImagePlanes>;
}

// ─── ImageSink ────────────────────────────────────────────────────────────────
/// Anywhere a finished or intermediate image can be written.
///
/// Implementations:
///   - OutputStore → PNG files in the output directory
pub trait ImageSink {
    /// Persist the final image of `unit` and return where it went.
    fn write(&self, unit: &TargetUnit, image: &ImagePlanes) -> Result<PathBuf>;

    /// Persist the image produced at one scale of the schedule.
    fn write_scale(&self, unit: &TargetUnit, scale: usize, image: &ImagePlanes) -> Result<PathBuf>;
}
