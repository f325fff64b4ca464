// ============================================================
// Layer 3 — Progressive Upscaling Schedule
// ============================================================
// Optimising a large image directly tends to produce a
// high-frequency pattern that repeats every few pixels.
// Starting small and growing the image lets the low-frequency
// structure settle first.
//
// The side length at each scale:
//   s0     = size
//   s(i+1) = floor(s(i) * factor)
//
// Example (size=56, factor=1.2, 4 scales):
//   56 → 67 → 80 → 96

use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSchedule {
    sizes: Vec<usize>,
}

impl ScaleSchedule {
    pub fn new(size: usize, steps: usize, factor: f64) -> Result<Self, DomainError> {
        if size == 0 {
            return Err(DomainError::InvalidSchedule("size must be positive".into()));
        }
        if steps == 0 {
            return Err(DomainError::InvalidSchedule(
                "at least one upscaling step is required".into(),
            ));
        }
        if !factor.is_finite() || factor < 1.0 {
            return Err(DomainError::InvalidSchedule(format!(
                "upscaling factor must be >= 1.0, got {factor}"
            )));
        }

        let mut sizes = Vec::with_capacity(steps);
        let mut current = size;
        for _ in 0..steps {
            sizes.push(current);
            current = (current as f64 * factor).floor() as usize;
        }
        Ok(Self { sizes })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Side length of the image that comes out of the last scale.
    pub fn final_size(&self) -> usize {
        self.sizes.last().copied().unwrap_or(0)
    }

    /// Fails when any scale is smaller than `min_size`, the input size
    /// `layer` needs to keep a non-empty feature map.
    pub fn require_min_size(&self, min_size: usize, layer: &str) -> Result<(), DomainError> {
        match self.sizes.iter().copied().min() {
            Some(smallest) if smallest < min_size => Err(DomainError::InvalidSchedule(format!(
                "{smallest}px is too small for layer '{layer}', which needs at least {min_size}px"
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let s = ScaleSchedule::new(56, 12, 1.2).unwrap();
        assert_eq!(s.sizes().len(), 12);
        assert_eq!(&s.sizes()[..5], &[56, 67, 80, 96, 115]);
        assert_eq!(s.final_size(), 408);
    }

    #[test]
    fn test_single_step_keeps_size() {
        let s = ScaleSchedule::new(32, 1, 1.5).unwrap();
        assert_eq!(s.sizes(), &[32]);
    }

    #[test]
    fn test_factor_one_is_constant() {
        let s = ScaleSchedule::new(20, 3, 1.0).unwrap();
        assert_eq!(s.sizes(), &[20, 20, 20]);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ScaleSchedule::new(0, 3, 1.2).is_err());
        assert!(ScaleSchedule::new(56, 0, 1.2).is_err());
        assert!(ScaleSchedule::new(56, 3, 0.5).is_err());
        assert!(ScaleSchedule::new(56, 3, f64::NAN).is_err());
    }

    #[test]
    fn test_min_size_checks_first_scale() {
        let s = ScaleSchedule::new(8, 3, 1.5).unwrap();
        assert!(s.require_min_size(8, "conv3_1").is_ok());
        assert!(matches!(
            s.require_min_size(16, "conv5_1"),
            Err(DomainError::InvalidSchedule(msg)) if msg.contains("conv5_1")
        ));
    }
}
