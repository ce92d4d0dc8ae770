//! Shared identifiers, capability codes, working-hours windows, and the
//! runtime error taxonomy.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Capability code describing what kind of repair a servicing resource can
/// perform. Unknown codes are rejected at configuration time; the simulation
/// core only ever sees this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Remote reset / remote maintenance.
    Rmt,
    /// Drone inspection.
    Drn,
    /// Crew transfer vessel.
    Ctv,
    /// Small crane.
    Scn,
    /// Large crane.
    Lcn,
    /// Cabling vessel.
    Cab,
    /// Diving support vessel.
    Dsv,
    /// Tow-to-port tug.
    Tow,
    /// Anchor handling vessel (on-site mooring repairs).
    Ahv,
}

impl Capability {
    /// Every valid capability, in canonical order.
    pub const ALL: [Capability; 9] = [
        Capability::Rmt,
        Capability::Drn,
        Capability::Ctv,
        Capability::Scn,
        Capability::Lcn,
        Capability::Cab,
        Capability::Dsv,
        Capability::Tow,
        Capability::Ahv,
    ];

    /// The wire/config spelling of this capability.
    pub fn code(&self) -> &'static str {
        match self {
            Capability::Rmt => "RMT",
            Capability::Drn => "DRN",
            Capability::Ctv => "CTV",
            Capability::Scn => "SCN",
            Capability::Lcn => "LCN",
            Capability::Cab => "CAB",
            Capability::Dsv => "DSV",
            Capability::Tow => "TOW",
            Capability::Ahv => "AHV",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unrecognized capability code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown capability code \"{0}\"")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RMT" => Ok(Capability::Rmt),
            "DRN" => Ok(Capability::Drn),
            "CTV" => Ok(Capability::Ctv),
            "SCN" => Ok(Capability::Scn),
            "LCN" => Ok(Capability::Lcn),
            "CAB" => Ok(Capability::Cab),
            "DSV" => Ok(Capability::Dsv),
            "TOW" => Ok(Capability::Tow),
            "AHV" => Ok(Capability::Ahv),
            other => Err(UnknownCapability(other.to_string())),
        }
    }
}

/// Identifier of a scheduled clock event. Doubles as the insertion sequence
/// number, so ids are strictly increasing in scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);

/// Identifier of a repair request, unique over the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fatal simulation errors.
///
/// Runtime resource shortages are never errors; they are absorbed into
/// simulated downtime and show up in the event log instead. These variants
/// indicate defects in the engine itself and abort the run immediately.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// An event was scheduled before the current clock time.
    #[error("cannot schedule an event at {requested:.3} h: clock is already at {now:.3} h")]
    InvalidTime { now: f64, requested: f64 },
    /// Two servicing resources claimed the same repair request.
    #[error("repair request {0} is already assigned")]
    DoubleAssignment(RequestId),
    /// Any other internal state contradiction.
    #[error("simulation invariant violated: {0}")]
    Inconsistency(String),
}

/// Daily working-hours window `[start_hour, end_hour)` shared by the whole
/// servicing fleet. Servicing may only start inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkShift {
    /// First working hour of the day (0-23).
    pub start_hour: u32,
    /// End of the working day, exclusive (1-24).
    pub end_hour: u32,
}

impl WorkShift {
    /// Creates a working-hours window.
    ///
    /// # Panics
    ///
    /// Panics if `start_hour >= end_hour` or `end_hour > 24`. Configuration
    /// validation rejects these before the engine is built.
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        assert!(start_hour < end_hour, "workday start must precede end");
        assert!(end_hour <= 24, "workday end must be <= 24");
        Self {
            start_hour,
            end_hour,
        }
    }

    /// A 24-hour window: work never pauses.
    pub fn all_day() -> Self {
        Self::new(0, 24)
    }

    /// Hour-of-day in `[0, 24)` for an absolute simulation time in hours.
    pub fn hour_of(time_h: f64) -> f64 {
        time_h.rem_euclid(24.0)
    }

    /// Day-of-year in `[0, 365)` for an absolute simulation time, repeating
    /// every 365 days.
    pub fn day_of_year(time_h: f64) -> u32 {
        ((time_h / 24.0).floor() as u64 % 365) as u32
    }

    /// Returns `true` when `time_h` falls inside the working window.
    pub fn contains(&self, time_h: f64) -> bool {
        let h = Self::hour_of(time_h);
        h >= f64::from(self.start_hour) && h < f64::from(self.end_hour)
    }

    /// Earliest time at or after `time_h` whose hour-of-day equals the
    /// window start.
    pub fn next_start(&self, time_h: f64) -> f64 {
        let today = (time_h / 24.0).floor() * 24.0 + f64::from(self.start_hour);
        if today >= time_h { today } else { today + 24.0 }
    }

    /// End of the working window on the day containing `time_h`.
    pub fn end_of_day(&self, time_h: f64) -> f64 {
        (time_h / 24.0).floor() * 24.0 + f64::from(self.end_hour)
    }
}
