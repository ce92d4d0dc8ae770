//! Discrete-event simulator for offshore wind farm operations and maintenance.

pub mod config;
/// Event clock, reliability models, request queue, fleet, port, and engine.
pub mod sim;
pub mod telemetry;
pub mod windfarm;
