// ============================================================
// Layer 6 — Activation Logger
// ============================================================
// Records the target activation at every optimiser step to a
// CSV file, so the climb can be plotted afterwards.
//
// Output file: <output_dir>/activations.csv
//
// Example CSV output:
//   layer,kernel,scale,size,step,activation
//   conv5_1,12,0,56,1,0.031200
//   conv5_1,12,0,56,2,0.184000
//   ...
//
// How to read the log:
//   - Within a scale the activation should rise step by step
//   - It usually drops at the start of the next scale, because
//     resizing and blurring destroy some of the fine detail
//   - A flat line at 0.0 after a ReLU means the unit never fired

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::unit::TargetUnit;

pub const ACTIVATIONS_FILE: &str = "activations.csv";

pub struct ActivationLogger {
    csv_path: PathBuf,
}

impl ActivationLogger {
    /// Writes the CSV header if the file doesn't exist yet,
    /// so repeated runs append to the same log.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let csv_path = dir.join(ACTIVATIONS_FILE);

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "layer,kernel,scale,size,step,activation")?;
            tracing::debug!("Created activation CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row per step of a single scale.
    pub fn log_scale(
        &self,
        unit:        &TargetUnit,
        scale:       usize,
        size:        usize,
        activations: &[f32],
    ) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        for (i, value) in activations.iter().enumerate() {
            writeln!(
                f,
                "{},{},{},{},{},{:.6}",
                unit.layer, unit.kernel, scale, size, i + 1, value,
            )?;
        }
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_then_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = ActivationLogger::new(dir.path()).unwrap();
        let unit   = TargetUnit::new("conv1_2", 3);
        logger.log_scale(&unit, 1, 67, &[0.5, 0.75]).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "layer,kernel,scale,size,step,activation",
            "conv1_2,3,1,67,1,0.500000",
            "conv1_2,3,1,67,2,0.750000",
        ]);
    }

    #[test]
    fn test_second_logger_appends() {
        let dir  = tempfile::tempdir().unwrap();
        let unit = TargetUnit::new("relu1_1", 0);
        ActivationLogger::new(dir.path()).unwrap().log_scale(&unit, 0, 8, &[1.0]).unwrap();
        ActivationLogger::new(dir.path()).unwrap().log_scale(&unit, 0, 8, &[2.0]).unwrap();

        let text = fs::read_to_string(dir.path().join(ACTIVATIONS_FILE)).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
