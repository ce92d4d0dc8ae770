//! Servicing equipment: capability sets, dispatch strategies, and the
//! mobilize/travel/service phase machine.

use std::fmt;

use super::types::{Capability, EventId, RequestId, WorkShift};

/// Phase of the equipment sub-state-machine. Every transition between
/// phases consumes a configured duration and is scheduled as a clock event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentPhase {
    Idle,
    Mobilizing,
    Traveling,
    Servicing,
    Returning,
}

impl EquipmentPhase {
    /// Lowercase label used in log records.
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentPhase::Idle => "idle",
            EquipmentPhase::Mobilizing => "mobilizing",
            EquipmentPhase::Traveling => "traveling",
            EquipmentPhase::Servicing => "servicing",
            EquipmentPhase::Returning => "returning",
        }
    }
}

impl fmt::Display for EquipmentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Policy governing when a piece of equipment mobilizes.
///
/// A closed tagged variant with one evaluation path per strategy; adding a
/// strategy means adding a variant here and an arm in the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchStrategy {
    /// Active within inclusive day-of-year charter ranges; mobilizes at each
    /// active workday start and demobilizes at the workday end.
    Scheduled { charter_days: Vec<(u32, u32)> },
    /// Mobilizes once at least `count` matchable open requests exist; stays
    /// out until its matchable queue is empty.
    RequestsThreshold { count: usize },
    /// Mobilizes while capacity-weighted farm downtime is at or above
    /// `fraction`; demobilizes once it drops below.
    DowntimeThreshold { fraction: f64 },
}

/// A mobile servicing resource (vessel, helicopter, drone team, ...).
#[derive(Debug, Clone)]
pub struct ServicingEquipment {
    pub name: String,
    /// Capabilities this equipment can service.
    pub capabilities: Vec<Capability>,
    pub strategy: DispatchStrategy,
    /// Mobilization duration in hours (port to farm readiness).
    pub mobilization_h: f64,
    /// One-off cost billed when mobilization starts.
    pub mobilization_cost: f64,
    /// Travel duration between the staging point and an asset, in hours.
    pub transit_h: f64,
    /// Labor rate billed per servicing hour.
    pub hourly_rate: f64,
    pub phase: EquipmentPhase,
    /// True from mobilization completion until the return leg finishes.
    pub on_station: bool,
    /// The claimed request, if any.
    pub assignment: Option<RequestId>,
    /// The next scheduled phase event, kept so a recall can cancel it.
    pub pending_event: Option<EventId>,
}

impl ServicingEquipment {
    pub fn new(
        name: String,
        capabilities: Vec<Capability>,
        strategy: DispatchStrategy,
        mobilization_h: f64,
        mobilization_cost: f64,
        transit_h: f64,
        hourly_rate: f64,
    ) -> Self {
        Self {
            name,
            capabilities,
            strategy,
            mobilization_h,
            mobilization_cost,
            transit_h,
            hourly_rate,
            phase: EquipmentPhase::Idle,
            on_station: false,
            assignment: None,
            pending_event: None,
        }
    }

    /// Whether this equipment can service `capability`.
    pub fn can_serve(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Whether the charter calendar is active at `time_h`. Strategies other
    /// than `Scheduled` are always eligible.
    pub fn charter_active(&self, time_h: f64) -> bool {
        match &self.strategy {
            DispatchStrategy::Scheduled { charter_days } => {
                let day = WorkShift::day_of_year(time_h);
                charter_days.iter().any(|&(start, end)| day >= start && day <= end)
            }
            _ => true,
        }
    }

    /// Earliest shift start at or after `time_h` that falls on an active
    /// charter day. `None` for non-scheduled strategies or an empty charter.
    pub fn next_charter_shift_start(&self, shift: &WorkShift, time_h: f64) -> Option<f64> {
        if !matches!(self.strategy, DispatchStrategy::Scheduled { .. }) {
            return None;
        }
        let base_day = (time_h / 24.0).floor();
        // One pass over a full charter year is enough to find the next
        // active day or prove there is none.
        for offset in 0..=366u32 {
            let candidate = (base_day + f64::from(offset)) * 24.0 + f64::from(shift.start_hour);
            if candidate < time_h {
                continue;
            }
            if self.charter_active(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled(charter_days: Vec<(u32, u32)>) -> ServicingEquipment {
        ServicingEquipment::new(
            "SCN-1".to_string(),
            vec![Capability::Scn],
            DispatchStrategy::Scheduled { charter_days },
            12.0,
            50_000.0,
            2.0,
            200.0,
        )
    }

    #[test]
    fn capability_membership() {
        let eq = scheduled(vec![(0, 364)]);
        assert!(eq.can_serve(Capability::Scn));
        assert!(!eq.can_serve(Capability::Tow));
    }

    #[test]
    fn charter_window_bounds_are_inclusive() {
        let eq = scheduled(vec![(10, 20)]);
        assert!(!eq.charter_active(9.0 * 24.0));
        assert!(eq.charter_active(10.0 * 24.0));
        assert!(eq.charter_active(20.0 * 24.0 + 12.0));
        assert!(!eq.charter_active(21.0 * 24.0));
    }

    #[test]
    fn charter_repeats_every_year() {
        let eq = scheduled(vec![(0, 0)]);
        assert!(eq.charter_active(0.0));
        assert!(eq.charter_active(365.0 * 24.0 + 1.0));
        assert!(!eq.charter_active(24.0));
    }

    #[test]
    fn next_charter_shift_start_skips_inactive_days() {
        let shift = WorkShift::new(8, 16);
        let eq = scheduled(vec![(2, 3)]);
        assert_eq!(eq.next_charter_shift_start(&shift, 0.0), Some(2.0 * 24.0 + 8.0));
        // From inside the window, the same day's start has passed.
        assert_eq!(
            eq.next_charter_shift_start(&shift, 2.0 * 24.0 + 9.0),
            Some(3.0 * 24.0 + 8.0)
        );
        // After the charter, next year's window.
        assert_eq!(
            eq.next_charter_shift_start(&shift, 10.0 * 24.0),
            Some((365.0 + 2.0) * 24.0 + 8.0)
        );
    }

    #[test]
    fn threshold_strategies_have_no_charter_calendar() {
        let eq = ServicingEquipment::new(
            "CTV-1".to_string(),
            vec![Capability::Ctv],
            DispatchStrategy::RequestsThreshold { count: 3 },
            6.0,
            0.0,
            1.0,
            100.0,
        );
        assert!(eq.charter_active(0.0));
        assert_eq!(eq.next_charter_shift_start(&WorkShift::all_day(), 0.0), None);
    }
}
