//! Shared test fixtures for integration tests.

use wfo_sim::config::{
    AssetConfig, EquipmentConfig, FailureConfig, MaintenanceConfig, ScenarioConfig,
    SubassemblyConfig,
};

/// Empty scenario with an around-the-clock workday, so timelines don't
/// depend on shift boundaries unless a test sets them explicitly.
pub fn base_config() -> ScenarioConfig {
    let mut config = ScenarioConfig::empty();
    config.simulation.workday_start = 0;
    config.simulation.workday_end = 24;
    config
}

/// A substation named `OSS1` with no subassemblies.
pub fn substation() -> AssetConfig {
    AssetConfig {
        name: "OSS1".to_string(),
        kind: "substation".to_string(),
        substation: String::new(),
        capacity_kw: 0.0,
        subassemblies: Vec::new(),
    }
}

/// A turbine behind `OSS1` with the given subassemblies.
pub fn turbine(name: &str, capacity_kw: f64, subassemblies: Vec<SubassemblyConfig>) -> AssetConfig {
    AssetConfig {
        name: name.to_string(),
        kind: "turbine".to_string(),
        substation: "OSS1".to_string(),
        capacity_kw,
        subassemblies,
    }
}

/// A subassembly holding one recurring maintenance task and no failures.
pub fn maintained_sub(key: &str, capability: &str, frequency_h: f64, duration_h: f64) -> SubassemblyConfig {
    SubassemblyConfig {
        key: key.to_string(),
        maintenance: vec![MaintenanceConfig {
            frequency_h,
            duration_h,
            materials_cost: 0.0,
            capability: capability.to_string(),
        }],
        failures: Vec::new(),
    }
}

/// A subassembly with a single failure mode and no maintenance.
pub fn failing_sub(key: &str, failure: FailureConfig) -> SubassemblyConfig {
    SubassemblyConfig {
        key: key.to_string(),
        maintenance: Vec::new(),
        failures: vec![failure],
    }
}

/// A failure mode at `level` with the given Weibull parameters.
pub fn failure(
    level: u8,
    shape: f64,
    scale: f64,
    repair_time_h: f64,
    capability: &str,
    operation_reduction: f64,
) -> FailureConfig {
    FailureConfig {
        level,
        shape,
        scale,
        repair_time_h,
        materials_cost: 0.0,
        capability: capability.to_string(),
        operation_reduction,
    }
}

/// A servicing equipment unit with zero-cost defaults; tests override the
/// timing fields they care about.
pub fn equipment(name: &str, capabilities: &[&str], strategy: &str, threshold: f64) -> EquipmentConfig {
    EquipmentConfig {
        name: name.to_string(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        strategy: strategy.to_string(),
        strategy_threshold: threshold,
        charter_days: Vec::new(),
        mobilization_h: 0.0,
        mobilization_cost: 0.0,
        transit_h: 0.0,
        hourly_rate: 0.0,
    }
}
