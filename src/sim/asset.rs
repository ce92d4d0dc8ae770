//! Assets and their subassembly state machines.

use std::collections::{BTreeMap, BTreeSet};

use super::failure::{FailureModel, MaintenanceTask};
use super::types::{EventId, RequestId, SimError};

/// Variant of a windfarm asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Turbine,
    Substation,
    Cable,
}

/// Derived lifecycle state of a subassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubassemblyState {
    Operating,
    /// At least one unresolved failure; carries the most severe active level.
    Failed(u8),
    UnderRepair,
}

/// A serviceable component of an asset.
///
/// Owns its maintenance tasks and a per-severity-level failure model map.
/// Active failures accumulate until repaired; the reduction policy is that
/// the highest active severity level dominates and lower severities queue
/// without stacking their reductions.
#[derive(Debug, Clone)]
pub struct Subassembly {
    /// Config key, unique within the owning asset.
    pub key: String,
    /// Scheduled maintenance tasks.
    pub maintenance: Vec<MaintenanceTask>,
    /// Failure models keyed by severity level.
    pub failures: BTreeMap<u8, FailureModel>,
    active: BTreeSet<u8>,
    in_progress: Option<RequestId>,
    /// Pending failure-draw events, cancelled and redrawn after each repair.
    pub pending_draws: Vec<EventId>,
}

impl Subassembly {
    /// Creates an operating subassembly from its models.
    pub fn new(key: String, maintenance: Vec<MaintenanceTask>, failures: Vec<FailureModel>) -> Self {
        let failures = failures.into_iter().map(|m| (m.level, m)).collect();
        Self {
            key,
            maintenance,
            failures,
            active: BTreeSet::new(),
            in_progress: None,
            pending_draws: Vec::new(),
        }
    }

    /// Current derived state.
    pub fn state(&self) -> SubassemblyState {
        if self.in_progress.is_some() {
            SubassemblyState::UnderRepair
        } else if let Some(&level) = self.active.iter().next_back() {
            SubassemblyState::Failed(level)
        } else {
            SubassemblyState::Operating
        }
    }

    /// Operating-level reduction of the most severe active failure.
    ///
    /// Policy: highest active severity wins; lower severities remain queued
    /// but do not stack. This is the single place the combination policy
    /// lives.
    pub fn net_reduction(&self) -> f64 {
        self.active
            .iter()
            .next_back()
            .and_then(|level| self.failures.get(level))
            .map(|m| m.operation_reduction)
            .unwrap_or(0.0)
    }

    /// Records a fired failure at `level`.
    pub fn record_failure(&mut self, level: u8) {
        self.active.insert(level);
    }

    /// Returns the severity levels currently failed.
    pub fn active_levels(&self) -> impl Iterator<Item = u8> + '_ {
        self.active.iter().copied()
    }

    /// Marks a repair in progress.
    ///
    /// # Errors
    ///
    /// A subassembly can host at most one in-progress repair; a second
    /// concurrent repair is a fatal engine defect.
    pub fn begin_repair(&mut self, request: RequestId) -> Result<(), SimError> {
        if let Some(current) = self.in_progress {
            return Err(SimError::Inconsistency(format!(
                "subassembly \"{}\" already has request {current} in progress",
                self.key
            )));
        }
        self.in_progress = Some(request);
        Ok(())
    }

    /// Completes the in-progress repair, clearing `level` when the repair
    /// resolved a failure (maintenance completions pass `None`).
    pub fn complete_repair(&mut self, level: Option<u8>) {
        if let Some(level) = level {
            self.active.remove(&level);
        }
        self.in_progress = None;
    }

    /// The request currently being repaired, if any.
    pub fn in_progress(&self) -> Option<RequestId> {
        self.in_progress
    }
}

/// A windfarm asset: a turbine, substation, or cable.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Unique asset id from the layout.
    pub name: String,
    pub kind: AssetKind,
    /// Rated capacity in kW.
    pub capacity_kw: f64,
    /// Serviceable components, in config order.
    pub subassemblies: Vec<Subassembly>,
    under_tow: bool,
    operating_level: f64,
}

impl Asset {
    /// Creates a fully operating asset.
    pub fn new(name: String, kind: AssetKind, capacity_kw: f64, subassemblies: Vec<Subassembly>) -> Self {
        Self {
            name,
            kind,
            capacity_kw,
            subassemblies,
            under_tow: false,
            operating_level: 1.0,
        }
    }

    /// Current output fraction in [0, 1] relative to rated capacity.
    pub fn operating_level(&self) -> f64 {
        self.operating_level
    }

    /// Whether the asset is currently being towed to or from the port.
    pub fn under_tow(&self) -> bool {
        self.under_tow
    }

    /// Sets the tow flag; the caller recomputes the level afterwards.
    pub fn set_under_tow(&mut self, under_tow: bool) {
        self.under_tow = under_tow;
    }

    /// Recomputes and returns the operating level from subassembly state:
    /// the product of per-subassembly availabilities. A tow in progress
    /// forces the level to zero.
    pub fn recompute_operating_level(&mut self) -> f64 {
        self.operating_level = if self.under_tow {
            0.0
        } else {
            self.subassemblies
                .iter()
                .map(|s| 1.0 - s.net_reduction())
                .product::<f64>()
                .clamp(0.0, 1.0)
        };
        self.operating_level
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::types::Capability;

    use super::*;

    fn failure(level: u8, reduction: f64) -> FailureModel {
        FailureModel {
            level,
            shape: 0.5,
            scale: 20_000.0,
            repair_time_h: 8.0,
            materials_cost: 0.0,
            capability: Capability::Ctv,
            operation_reduction: reduction,
        }
    }

    fn sub(key: &str, failures: Vec<FailureModel>) -> Subassembly {
        Subassembly::new(key.to_string(), Vec::new(), failures)
    }

    #[test]
    fn fresh_subassembly_is_operating() {
        let s = sub("generator", vec![failure(1, 0.3)]);
        assert_eq!(s.state(), SubassemblyState::Operating);
        assert_eq!(s.net_reduction(), 0.0);
    }

    #[test]
    fn highest_active_severity_dominates() {
        let mut s = sub("generator", vec![failure(1, 0.3), failure(2, 0.8)]);
        s.record_failure(1);
        assert_eq!(s.net_reduction(), 0.3);
        assert_eq!(s.state(), SubassemblyState::Failed(1));

        s.record_failure(2);
        // Level 2 dominates; the reductions do not stack.
        assert_eq!(s.net_reduction(), 0.8);
        assert_eq!(s.state(), SubassemblyState::Failed(2));

        s.complete_repair(Some(2));
        assert_eq!(s.net_reduction(), 0.3);
    }

    #[test]
    fn second_concurrent_repair_is_rejected() {
        let mut s = sub("gearbox", vec![failure(1, 0.3)]);
        s.begin_repair(RequestId(1)).expect("first repair");
        assert_eq!(s.state(), SubassemblyState::UnderRepair);
        let err = s.begin_repair(RequestId(2));
        assert!(matches!(err, Err(SimError::Inconsistency(_))));
    }

    #[test]
    fn repair_completion_clears_in_progress() {
        let mut s = sub("gearbox", vec![failure(1, 0.3)]);
        s.record_failure(1);
        s.begin_repair(RequestId(1)).expect("first repair");
        s.complete_repair(Some(1));
        assert_eq!(s.state(), SubassemblyState::Operating);
        assert!(s.in_progress().is_none());
    }

    #[test]
    fn asset_level_is_product_of_subassembly_availability() {
        let mut a = Asset::new(
            "S00T1".to_string(),
            AssetKind::Turbine,
            3000.0,
            vec![
                sub("generator", vec![failure(1, 0.5)]),
                sub("gearbox", vec![failure(1, 0.2)]),
            ],
        );
        assert_eq!(a.operating_level(), 1.0);

        a.subassemblies[0].record_failure(1);
        a.subassemblies[1].record_failure(1);
        let level = a.recompute_operating_level();
        assert!((level - 0.4).abs() < 1e-12); // 0.5 * 0.8
    }

    #[test]
    fn tow_forces_level_to_zero() {
        let mut a = Asset::new("S00T2".to_string(), AssetKind::Turbine, 3000.0, Vec::new());
        a.set_under_tow(true);
        assert_eq!(a.recompute_operating_level(), 0.0);
        a.set_under_tow(false);
        assert_eq!(a.recompute_operating_level(), 1.0);
    }
}
