//! Time-ordered event log emitted by the engine.
//!
//! The log is the engine's only output: downstream reporting collaborators
//! consume these records; the engine itself never writes files.

use super::types::{Capability, RequestId};

/// One log entry with its simulation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Absolute simulation time in hours.
    pub time_h: f64,
    pub kind: LogKind,
}

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum LogKind {
    /// An asset's operating-level fraction changed.
    OperatingLevel {
        asset: String,
        previous: f64,
        current: f64,
    },
    /// A repair request was created from a failure or maintenance task.
    RequestCreated {
        request: RequestId,
        asset: String,
        subassembly: String,
        severity: u8,
        capability: Capability,
    },
    /// A servicing resource claimed the request.
    RequestAssigned {
        request: RequestId,
        equipment: String,
    },
    /// Servicing began (labor starts billing).
    RequestStarted {
        request: RequestId,
        equipment: String,
    },
    /// Servicing finished; the request is destroyed.
    RequestCompleted {
        request: RequestId,
        equipment: String,
        labor_cost: f64,
        materials_cost: f64,
    },
    /// A piece of equipment or a tug changed phase. `cost` carries any
    /// one-off charge tied to the transition (mobilization).
    EquipmentTransition {
        equipment: String,
        from: &'static str,
        to: &'static str,
        cost: f64,
    },
    /// Demand outstripped resources; the request stays open and the
    /// shortage is absorbed into simulated downtime.
    ResourceWait { request: RequestId, detail: String },
}

impl LogKind {
    /// Record discriminator used in the CSV export.
    pub fn label(&self) -> &'static str {
        match self {
            LogKind::OperatingLevel { .. } => "operating-level",
            LogKind::RequestCreated { .. } => "request-created",
            LogKind::RequestAssigned { .. } => "request-assigned",
            LogKind::RequestStarted { .. } => "request-started",
            LogKind::RequestCompleted { .. } => "request-completed",
            LogKind::EquipmentTransition { .. } => "equipment-transition",
            LogKind::ResourceWait { .. } => "resource-wait",
        }
    }
}
