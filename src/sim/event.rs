//! Event payloads carried on the simulation clock.

use super::types::EventId;

/// What a scheduled event does when it fires.
///
/// Entities are referenced by their index in the engine's owning vectors
/// (`assets`, `fleet`, port tug pool); indices are stable for the lifetime
/// of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A failure draw for one severity level of a subassembly comes due.
    FailureDue {
        asset: usize,
        subassembly: usize,
        level: u8,
    },
    /// A recurring maintenance task comes due.
    MaintenanceDue {
        asset: usize,
        subassembly: usize,
        task: usize,
    },
    /// Strategy evaluation point for one piece of servicing equipment.
    /// Periodic checks reschedule themselves; ad-hoc checks (fired when a
    /// request is created or an operating level changes) do not.
    DispatchCheck { equipment: usize, periodic: bool },
    /// The current phase of an equipment sub-state-machine finishes.
    EquipmentPhaseComplete { equipment: usize },
    /// A repair parked outside working hours resumes at shift start.
    RepairResume { equipment: usize },
    /// The current leg of a tug's tow cycle finishes.
    TugPhaseComplete { tug: usize },
}

/// A fired event, as handed to the engine by the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Identifier assigned at scheduling time.
    pub id: EventId,
    /// Absolute simulation time in hours at which the event fires.
    pub time_h: f64,
    /// Payload.
    pub kind: EventKind,
}
