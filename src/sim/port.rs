//! Port and tow-to-port orchestration.
//!
//! TOW-capability failures are never serviced on-site: they queue here and
//! wait for one of the port's finite pool of tugs. The pool is a classic
//! bounded producer/consumer with FIFO fairness and no preemption; requests
//! beyond capacity simply wait.

use std::collections::VecDeque;
use std::fmt;

use super::types::RequestId;

/// Leg of a tug's tow cycle. Every leg is one scheduled clock event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TugPhase {
    Idle,
    /// Sailing out to the failed asset.
    ToSite,
    /// Towing the asset in to the port.
    TowIn,
    /// Servicing at the port (port labor, separate from on-site equipment).
    AtPort,
    /// Towing the repaired asset back out to its position.
    TowOut,
    /// Sailing back to the port empty.
    Returning,
}

impl TugPhase {
    /// Lowercase label used in log records.
    pub fn label(&self) -> &'static str {
        match self {
            TugPhase::Idle => "idle",
            TugPhase::ToSite => "to-site",
            TugPhase::TowIn => "tow-in",
            TugPhase::AtPort => "at-port",
            TugPhase::TowOut => "tow-out",
            TugPhase::Returning => "returning",
        }
    }
}

impl fmt::Display for TugPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Site details a tug carries through its cycle, kept past the point where
/// the underlying request is completed and destroyed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowJob {
    pub asset: usize,
    pub subassembly: usize,
    /// Severity level resolved by the repair, `None` for maintenance tows.
    pub level: Option<u8>,
    /// Port service duration in hours.
    pub duration_h: f64,
}

/// One tug of the port pool.
#[derive(Debug, Clone)]
pub struct Tug {
    pub name: String,
    pub phase: TugPhase,
    pub request: Option<RequestId>,
    pub job: Option<TowJob>,
}

/// Finite pool of tow-capable tugs plus the FIFO of queued tow requests.
#[derive(Debug)]
pub struct Port {
    pub tugs: Vec<Tug>,
    /// Sailing duration between port and farm, in hours.
    pub transit_h: f64,
    /// Duration of one tow leg (either direction), in hours.
    pub tow_h: f64,
    /// Port labor rate billed per servicing hour.
    pub hourly_rate: f64,
    queue: VecDeque<RequestId>,
}

impl Port {
    /// Creates a port with `capacity` tugs.
    pub fn new(capacity: usize, transit_h: f64, tow_h: f64, hourly_rate: f64) -> Self {
        let tugs = (0..capacity)
            .map(|i| Tug {
                name: format!("TUG-{}", i + 1),
                phase: TugPhase::Idle,
                request: None,
                job: None,
            })
            .collect();
        Self {
            tugs,
            transit_h,
            tow_h,
            hourly_rate,
            queue: VecDeque::new(),
        }
    }

    /// Appends a tow request to the FIFO.
    pub fn enqueue(&mut self, id: RequestId) {
        self.queue.push_back(id);
    }

    /// Number of tow requests waiting for a tug.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Index of an idle tug, if any.
    pub fn idle_tug(&self) -> Option<usize> {
        self.tugs.iter().position(|t| t.phase == TugPhase::Idle)
    }

    /// Pairs the next queued request with an idle tug, FIFO. The caller
    /// schedules the outbound leg and records the job details.
    pub fn claim_next(&mut self) -> Option<(usize, RequestId)> {
        let tug = self.idle_tug()?;
        let request = self.queue.pop_front()?;
        self.tugs[tug].request = Some(request);
        self.tugs[tug].phase = TugPhase::ToSite;
        Some((tug, request))
    }
}
