/// Turbines, substations, and cables with their subassemblies.
pub mod asset;
/// Event clock with a deterministic priority queue.
pub mod clock;
pub mod engine;
pub mod equipment;
/// Timeline event payloads.
pub mod event;
pub mod failure;
/// Log records emitted while a simulation runs.
pub mod log;
pub mod port;
/// Repair request queue and capability matching.
pub mod requests;
pub mod types;
