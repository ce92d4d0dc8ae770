//! Reliability and scheduled-maintenance models for subassemblies.

use rand::Rng;
use rand::rngs::StdRng;

use super::types::Capability;

/// Weibull failure model for one severity level of a subassembly.
///
/// A `shape` or `scale` of zero is the "never fails" sentinel: the level
/// simply produces no failure events. Negative parameters are rejected at
/// configuration time and never reach sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureModel {
    /// Severity level; higher levels are more severe.
    pub level: u8,
    /// Weibull shape parameter (0 = never fails).
    pub shape: f64,
    /// Weibull scale parameter in hours (0 = never fails).
    pub scale: f64,
    /// On-site repair duration in hours.
    pub repair_time_h: f64,
    /// Materials cost billed on completion.
    pub materials_cost: f64,
    /// Capability required to service this failure.
    pub capability: Capability,
    /// Immediate operating-level reduction in [0, 1] while the failure is
    /// active; 1.0 shuts the subassembly down entirely.
    pub operation_reduction: f64,
}

impl FailureModel {
    /// Returns `true` when this model can never produce a failure.
    pub fn never_fails(&self) -> bool {
        self.shape == 0.0 || self.scale == 0.0
    }

    /// Draws a time-to-failure in hours from the Weibull model by inverse
    /// CDF: `t = scale * (-ln(1 - u))^(1/shape)`.
    ///
    /// Returns `None` for never-fails models.
    pub fn sample_time_to_failure(&self, rng: &mut StdRng) -> Option<f64> {
        if self.never_fails() {
            return None;
        }
        // Keep u strictly below 1 so ln(1 - u) stays finite.
        let u: f64 = rng.random::<f64>().min(1.0 - 1e-12);
        Some(self.scale * (-(1.0 - u).ln()).powf(1.0 / self.shape))
    }
}

/// Fixed-interval scheduled maintenance task.
///
/// Recurrence is deterministic: the next occurrence is always
/// `now + frequency_h`, independent of any failures on the subassembly.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceTask {
    /// Recurrence interval in hours.
    pub frequency_h: f64,
    /// Service duration in hours.
    pub duration_h: f64,
    /// Materials cost billed on completion.
    pub materials_cost: f64,
    /// Capability required to perform the task.
    pub capability: Capability,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn model(shape: f64, scale: f64) -> FailureModel {
        FailureModel {
            level: 1,
            shape,
            scale,
            repair_time_h: 8.0,
            materials_cost: 100.0,
            capability: Capability::Ctv,
            operation_reduction: 0.3,
        }
    }

    #[test]
    fn zero_shape_never_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(model(0.0, 1000.0).sample_time_to_failure(&mut rng).is_none());
    }

    #[test]
    fn zero_scale_never_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(model(0.8, 0.0).sample_time_to_failure(&mut rng).is_none());
    }

    #[test]
    fn samples_are_positive_and_finite() {
        let mut rng = StdRng::seed_from_u64(42);
        let m = model(0.8, 25_000.0);
        for _ in 0..200 {
            let t = m.sample_time_to_failure(&mut rng).expect("model fails");
            assert!(t.is_finite());
            assert!(t >= 0.0);
        }
    }

    #[test]
    fn same_seed_draws_identically() {
        let m = model(1.2, 10_000.0);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(m.sample_time_to_failure(&mut a), m.sample_time_to_failure(&mut b));
        }
    }

    #[test]
    fn exponential_special_case_scales_with_scale() {
        // shape = 1 reduces to an exponential with mean == scale; a crude
        // mean check over many draws guards the inverse-CDF arithmetic.
        let m = model(1.0, 500.0);
        let mut rng = StdRng::seed_from_u64(3);
        let n = 4000;
        let mean: f64 = (0..n)
            .filter_map(|_| m.sample_time_to_failure(&mut rng))
            .sum::<f64>()
            / f64::from(n);
        assert!((mean - 500.0).abs() < 50.0, "mean was {mean}");
    }
}
