//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Farm layout: turbines, substations, and cables.
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
    /// Servicing equipment fleet.
    #[serde(default)]
    pub equipment: Vec<EquipmentConfig>,
    /// Port and tugboat parameters for tow-to-port repairs.
    #[serde(default)]
    pub port: PortConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulation horizon in hours (must be > 0).
    pub horizon_h: f64,
    /// Master random seed.
    pub seed: u64,
    /// First working hour of the day, inclusive (0..24).
    pub workday_start: u32,
    /// Last working hour of the day, exclusive (1..=24).
    pub workday_end: u32,
    /// Cadence of periodic dispatch checks in hours (must be > 0).
    pub dispatch_interval_h: f64,
    /// How concurrent failures combine: only `"max-severity"` is supported.
    pub reduction_policy: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_h: 8760.0,
            seed: 42,
            workday_start: 6,
            workday_end: 22,
            dispatch_interval_h: 24.0,
            reduction_policy: "max-severity".to_string(),
        }
    }
}

/// A single physical asset: turbine, substation, or export cable.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    /// Unique asset name (e.g., `"S00T1"`).
    pub name: String,
    /// Asset kind: `"turbine"`, `"substation"`, or `"cable"`.
    pub kind: String,
    /// Name of the substation this asset exports through. Ignored for
    /// substations, which root themselves.
    #[serde(default)]
    pub substation: String,
    /// Rated capacity in kW. Substations and cables typically use 0.
    #[serde(default)]
    pub capacity_kw: f64,
    /// Independently failing subassemblies.
    #[serde(default)]
    pub subassemblies: Vec<SubassemblyConfig>,
}

/// One subassembly with its maintenance tasks and failure modes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubassemblyConfig {
    /// Key unique within the asset (e.g., `"generator"`).
    pub key: String,
    /// Deterministic recurring maintenance tasks.
    #[serde(default)]
    pub maintenance: Vec<MaintenanceConfig>,
    /// Weibull-distributed failure modes, one per severity level.
    #[serde(default)]
    pub failures: Vec<FailureConfig>,
}

/// A recurring scheduled maintenance task.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaintenanceConfig {
    /// Hours between occurrences (must be > 0).
    pub frequency_h: f64,
    /// Hours of on-site work per occurrence.
    pub duration_h: f64,
    /// Materials cost per occurrence.
    #[serde(default)]
    pub materials_cost: f64,
    /// Capability code required to perform the task (e.g., `"CTV"`).
    pub capability: String,
}

/// One Weibull failure mode at a given severity level.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FailureConfig {
    /// Severity level, 1 (least severe) and up. Unique per subassembly.
    pub level: u8,
    /// Weibull shape parameter. Zero disables this failure mode.
    pub shape: f64,
    /// Weibull scale parameter in hours. Zero disables this failure mode.
    pub scale: f64,
    /// On-site (or at-port) repair duration in hours.
    pub repair_time_h: f64,
    /// Materials cost per repair.
    #[serde(default)]
    pub materials_cost: f64,
    /// Capability code required for the repair. `"TOW"` routes the
    /// request to the port instead of the fleet.
    pub capability: String,
    /// Fractional output reduction while failed, in `[0, 1]`.
    pub operation_reduction: f64,
}

/// One servicing equipment unit and its dispatch strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentConfig {
    /// Unique equipment name (e.g., `"CTV-1"`).
    pub name: String,
    /// Capability codes this unit can serve.
    pub capabilities: Vec<String>,
    /// Dispatch strategy: `"scheduled"`, `"requests-threshold"`, or
    /// `"downtime-threshold"`.
    pub strategy: String,
    /// Threshold value for the threshold strategies: a request count or
    /// a downtime fraction. Ignored for `"scheduled"`.
    #[serde(default)]
    pub strategy_threshold: f64,
    /// Inclusive day-of-year charter ranges for `"scheduled"`, repeating
    /// yearly (e.g., `[[120, 240]]`).
    #[serde(default)]
    pub charter_days: Vec<[u32; 2]>,
    /// Hours to mobilize before the unit is on station.
    #[serde(default)]
    pub mobilization_h: f64,
    /// One-off cost charged when mobilization starts.
    #[serde(default)]
    pub mobilization_cost: f64,
    /// One-way transit hours between station and an asset.
    #[serde(default)]
    pub transit_h: f64,
    /// Labor rate applied to servicing hours.
    #[serde(default)]
    pub hourly_rate: f64,
}

/// Port and tugboat parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortConfig {
    /// Number of tugboats (0 disables tow-to-port repairs).
    pub tugs: usize,
    /// One-way tug transit hours between port and the farm.
    pub transit_h: f64,
    /// Hours for one tow leg (site to port, or port to site).
    pub tow_h: f64,
    /// Labor rate applied to at-port repair hours.
    pub hourly_rate: f64,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            tugs: 1,
            transit_h: 4.0,
            tow_h: 12.0,
            hourly_rate: 200.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.horizon_h"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl ScenarioConfig {
    /// A scenario with default global parameters and no assets, equipment,
    /// or layout. Mostly useful as a starting point for tests.
    pub fn empty() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            assets: Vec::new(),
            equipment: Vec::new(),
            port: PortConfig::default(),
        }
    }

    /// The built-in baseline scenario: a three-turbine farm behind one
    /// offshore substation, a small mixed fleet, and a single tugboat.
    pub fn baseline() -> Self {
        let turbine_subassemblies = vec![
            SubassemblyConfig {
                key: "generator".to_string(),
                maintenance: vec![MaintenanceConfig {
                    frequency_h: 2190.0,
                    duration_h: 6.0,
                    materials_cost: 500.0,
                    capability: "CTV".to_string(),
                }],
                failures: vec![
                    FailureConfig {
                        level: 1,
                        shape: 1.0,
                        scale: 6000.0,
                        repair_time_h: 8.0,
                        materials_cost: 1200.0,
                        capability: "CTV".to_string(),
                        operation_reduction: 0.2,
                    },
                    FailureConfig {
                        level: 2,
                        shape: 1.2,
                        scale: 20000.0,
                        repair_time_h: 48.0,
                        materials_cost: 25000.0,
                        capability: "LCN".to_string(),
                        operation_reduction: 1.0,
                    },
                ],
            },
            SubassemblyConfig {
                key: "gearbox".to_string(),
                maintenance: Vec::new(),
                failures: vec![
                    FailureConfig {
                        level: 1,
                        shape: 1.0,
                        scale: 9000.0,
                        repair_time_h: 12.0,
                        materials_cost: 3000.0,
                        capability: "CTV".to_string(),
                        operation_reduction: 0.5,
                    },
                    FailureConfig {
                        level: 3,
                        shape: 1.5,
                        scale: 60000.0,
                        repair_time_h: 96.0,
                        materials_cost: 150000.0,
                        capability: "TOW".to_string(),
                        operation_reduction: 1.0,
                    },
                ],
            },
        ];
        let turbine = |name: &str| AssetConfig {
            name: name.to_string(),
            kind: "turbine".to_string(),
            substation: "OSS1".to_string(),
            capacity_kw: 3000.0,
            subassemblies: turbine_subassemblies.clone(),
        };
        Self {
            simulation: SimulationConfig::default(),
            assets: vec![
                AssetConfig {
                    name: "OSS1".to_string(),
                    kind: "substation".to_string(),
                    substation: String::new(),
                    capacity_kw: 0.0,
                    subassemblies: vec![SubassemblyConfig {
                        key: "transformer".to_string(),
                        maintenance: Vec::new(),
                        failures: vec![FailureConfig {
                            level: 2,
                            shape: 1.1,
                            scale: 40000.0,
                            repair_time_h: 72.0,
                            materials_cost: 80000.0,
                            capability: "LCN".to_string(),
                            operation_reduction: 1.0,
                        }],
                    }],
                },
                turbine("S00T1"),
                turbine("S00T2"),
                turbine("S00T3"),
                AssetConfig {
                    name: "EXP1".to_string(),
                    kind: "cable".to_string(),
                    substation: "OSS1".to_string(),
                    capacity_kw: 0.0,
                    subassemblies: vec![SubassemblyConfig {
                        key: "array_cable".to_string(),
                        maintenance: Vec::new(),
                        failures: vec![FailureConfig {
                            level: 1,
                            shape: 1.0,
                            scale: 30000.0,
                            repair_time_h: 36.0,
                            materials_cost: 40000.0,
                            capability: "CAB".to_string(),
                            operation_reduction: 1.0,
                        }],
                    }],
                },
            ],
            equipment: vec![
                EquipmentConfig {
                    name: "CTV-1".to_string(),
                    capabilities: vec!["CTV".to_string(), "RMT".to_string()],
                    strategy: "requests-threshold".to_string(),
                    strategy_threshold: 1.0,
                    charter_days: Vec::new(),
                    mobilization_h: 0.5,
                    mobilization_cost: 0.0,
                    transit_h: 1.5,
                    hourly_rate: 150.0,
                },
                EquipmentConfig {
                    name: "HLV-1".to_string(),
                    capabilities: vec!["LCN".to_string(), "CAB".to_string(), "DRN".to_string()],
                    strategy: "requests-threshold".to_string(),
                    strategy_threshold: 1.0,
                    charter_days: Vec::new(),
                    mobilization_h: 72.0,
                    mobilization_cost: 100000.0,
                    transit_h: 6.0,
                    hourly_rate: 1500.0,
                },
                EquipmentConfig {
                    name: "SCN-1".to_string(),
                    capabilities: vec!["SCN".to_string(), "CTV".to_string()],
                    strategy: "scheduled".to_string(),
                    strategy_threshold: 0.0,
                    charter_days: vec![[120, 240]],
                    mobilization_h: 24.0,
                    mobilization_cost: 20000.0,
                    transit_h: 4.0,
                    hourly_rate: 600.0,
                },
            ],
            port: PortConfig::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if !s.horizon_h.is_finite() || s.horizon_h <= 0.0 {
            errors.push(ConfigError {
                field: "simulation.horizon_h".into(),
                message: "must be > 0 and finite".into(),
            });
        }
        if s.workday_start >= 24 {
            errors.push(ConfigError {
                field: "simulation.workday_start".into(),
                message: "must be < 24".into(),
            });
        }
        if s.workday_end == 0 || s.workday_end > 24 {
            errors.push(ConfigError {
                field: "simulation.workday_end".into(),
                message: "must be in 1..=24".into(),
            });
        }
        if s.workday_start >= s.workday_end {
            errors.push(ConfigError {
                field: "simulation.workday_start".into(),
                message: "must be < simulation.workday_end".into(),
            });
        }
        if !s.dispatch_interval_h.is_finite() || s.dispatch_interval_h <= 0.0 {
            errors.push(ConfigError {
                field: "simulation.dispatch_interval_h".into(),
                message: "must be > 0 and finite".into(),
            });
        }
        if s.reduction_policy != "max-severity" {
            errors.push(ConfigError {
                field: "simulation.reduction_policy".into(),
                message: format!(
                    "must be \"max-severity\", got \"{}\"",
                    s.reduction_policy
                ),
            });
        }

        let mut names: Vec<&str> = self.assets.iter().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            errors.push(ConfigError {
                field: "assets".into(),
                message: "asset names must be unique".into(),
            });
        }

        for (ai, a) in self.assets.iter().enumerate() {
            let prefix = format!("assets[{ai}]");
            if a.name.is_empty() {
                errors.push(ConfigError {
                    field: format!("{prefix}.name"),
                    message: "must not be empty".into(),
                });
            }
            match a.kind.as_str() {
                "turbine" | "substation" | "cable" => {}
                other => errors.push(ConfigError {
                    field: format!("{prefix}.kind"),
                    message: format!(
                        "must be \"turbine\", \"substation\", or \"cable\", got \"{other}\""
                    ),
                }),
            }
            if a.kind != "substation"
                && !self
                    .assets
                    .iter()
                    .any(|o| o.kind == "substation" && o.name == a.substation)
            {
                errors.push(ConfigError {
                    field: format!("{prefix}.substation"),
                    message: format!("\"{}\" is not a configured substation", a.substation),
                });
            }
            if !a.capacity_kw.is_finite() || a.capacity_kw < 0.0 {
                errors.push(ConfigError {
                    field: format!("{prefix}.capacity_kw"),
                    message: "must be >= 0 and finite".into(),
                });
            }

            let mut keys: Vec<&str> = a.subassemblies.iter().map(|s| s.key.as_str()).collect();
            keys.sort_unstable();
            if keys.windows(2).any(|w| w[0] == w[1]) {
                errors.push(ConfigError {
                    field: format!("{prefix}.subassemblies"),
                    message: "subassembly keys must be unique within an asset".into(),
                });
            }

            for (si, sub) in a.subassemblies.iter().enumerate() {
                let prefix = format!("{prefix}.subassemblies[{si}]");
                if !valid_key(&sub.key) {
                    errors.push(ConfigError {
                        field: format!("{prefix}.key"),
                        message: "must be non-empty alphanumeric/underscore".into(),
                    });
                }
                for (ti, m) in sub.maintenance.iter().enumerate() {
                    let prefix = format!("{prefix}.maintenance[{ti}]");
                    if !m.frequency_h.is_finite() || m.frequency_h <= 0.0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.frequency_h"),
                            message: "must be > 0 and finite".into(),
                        });
                    }
                    if !m.duration_h.is_finite() || m.duration_h < 0.0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.duration_h"),
                            message: "must be >= 0 and finite".into(),
                        });
                    }
                    if !m.materials_cost.is_finite() || m.materials_cost < 0.0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.materials_cost"),
                            message: "must be >= 0 and finite".into(),
                        });
                    }
                }
                let mut levels: Vec<u8> = sub.failures.iter().map(|f| f.level).collect();
                levels.sort_unstable();
                if levels.windows(2).any(|w| w[0] == w[1]) {
                    errors.push(ConfigError {
                        field: format!("{prefix}.failures"),
                        message: "severity levels must be unique within a subassembly".into(),
                    });
                }
                for (fi, f) in sub.failures.iter().enumerate() {
                    let prefix = format!("{prefix}.failures[{fi}]");
                    if f.level == 0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.level"),
                            message: "must be >= 1".into(),
                        });
                    }
                    if !f.shape.is_finite() || f.shape < 0.0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.shape"),
                            message: "must be >= 0 and finite".into(),
                        });
                    }
                    if !f.scale.is_finite() || f.scale < 0.0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.scale"),
                            message: "must be >= 0 and finite".into(),
                        });
                    }
                    if !f.repair_time_h.is_finite() || f.repair_time_h < 0.0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.repair_time_h"),
                            message: "must be >= 0 and finite".into(),
                        });
                    }
                    if !f.materials_cost.is_finite() || f.materials_cost < 0.0 {
                        errors.push(ConfigError {
                            field: format!("{prefix}.materials_cost"),
                            message: "must be >= 0 and finite".into(),
                        });
                    }
                    if !(0.0..=1.0).contains(&f.operation_reduction) {
                        errors.push(ConfigError {
                            field: format!("{prefix}.operation_reduction"),
                            message: "must be in [0, 1]".into(),
                        });
                    }
                }
            }
        }

        for (ei, e) in self.equipment.iter().enumerate() {
            let prefix = format!("equipment[{ei}]");
            if e.name.is_empty() {
                errors.push(ConfigError {
                    field: format!("{prefix}.name"),
                    message: "must not be empty".into(),
                });
            }
            if e.capabilities.is_empty() {
                errors.push(ConfigError {
                    field: format!("{prefix}.capabilities"),
                    message: "must not be empty".into(),
                });
            }
            match e.strategy.as_str() {
                "scheduled" => {
                    if e.charter_days.is_empty() {
                        errors.push(ConfigError {
                            field: format!("{prefix}.charter_days"),
                            message: "scheduled strategy needs at least one charter range".into(),
                        });
                    }
                    for (ri, r) in e.charter_days.iter().enumerate() {
                        if r[0] > r[1] || r[1] > 364 {
                            errors.push(ConfigError {
                                field: format!("{prefix}.charter_days[{ri}]"),
                                message: "must be an ordered day-of-year pair in 0..=364".into(),
                            });
                        }
                    }
                }
                "requests-threshold" => {
                    if !e.strategy_threshold.is_finite()
                        || e.strategy_threshold < 1.0
                        || e.strategy_threshold.fract() != 0.0
                    {
                        errors.push(ConfigError {
                            field: format!("{prefix}.strategy_threshold"),
                            message: "must be a whole number >= 1 for requests-threshold".into(),
                        });
                    }
                }
                "downtime-threshold" => {
                    if !(0.0..=1.0).contains(&e.strategy_threshold) {
                        errors.push(ConfigError {
                            field: format!("{prefix}.strategy_threshold"),
                            message: "must be in [0, 1] for downtime-threshold".into(),
                        });
                    }
                }
                other => errors.push(ConfigError {
                    field: format!("{prefix}.strategy"),
                    message: format!(
                        "must be \"scheduled\", \"requests-threshold\", or \
                         \"downtime-threshold\", got \"{other}\""
                    ),
                }),
            }
            if !e.mobilization_h.is_finite() || e.mobilization_h < 0.0 {
                errors.push(ConfigError {
                    field: format!("{prefix}.mobilization_h"),
                    message: "must be >= 0 and finite".into(),
                });
            }
            if !e.mobilization_cost.is_finite() || e.mobilization_cost < 0.0 {
                errors.push(ConfigError {
                    field: format!("{prefix}.mobilization_cost"),
                    message: "must be >= 0 and finite".into(),
                });
            }
            if !e.transit_h.is_finite() || e.transit_h < 0.0 {
                errors.push(ConfigError {
                    field: format!("{prefix}.transit_h"),
                    message: "must be >= 0 and finite".into(),
                });
            }
            if !e.hourly_rate.is_finite() || e.hourly_rate < 0.0 {
                errors.push(ConfigError {
                    field: format!("{prefix}.hourly_rate"),
                    message: "must be >= 0 and finite".into(),
                });
            }
        }

        if !self.port.transit_h.is_finite() || self.port.transit_h < 0.0 {
            errors.push(ConfigError {
                field: "port.transit_h".into(),
                message: "must be >= 0 and finite".into(),
            });
        }
        if !self.port.tow_h.is_finite() || self.port.tow_h < 0.0 {
            errors.push(ConfigError {
                field: "port.tow_h".into(),
                message: "must be >= 0 and finite".into(),
            });
        }
        if !self.port.hourly_rate.is_finite() || self.port.hourly_rate < 0.0 {
            errors.push(ConfigError {
                field: "port.hourly_rate".into(),
                message: "must be >= 0 and finite".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_valid() {
        let errors = ScenarioConfig::baseline().validate();
        assert!(errors.is_empty(), "baseline invalid: {errors:?}");
    }

    #[test]
    fn empty_is_valid() {
        assert!(ScenarioConfig::empty().validate().is_empty());
    }

    #[test]
    fn from_preset_baseline() {
        let config = ScenarioConfig::from_preset("baseline").unwrap();
        assert_eq!(config.assets.len(), 5);
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("bogus").unwrap_err();
        assert_eq!(err.field, "preset");
        assert!(err.message.contains("baseline"));
    }

    #[test]
    fn toml_round_trip_minimal() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [simulation]
            horizon_h = 720.0
            seed = 7

            [[assets]]
            name = "OSS1"
            kind = "substation"

            [[assets]]
            name = "T1"
            kind = "turbine"
            substation = "OSS1"
            capacity_kw = 5000.0

            [[assets.subassemblies]]
            key = "generator"

            [[assets.subassemblies.failures]]
            level = 1
            shape = 1.0
            scale = 4000.0
            repair_time_h = 8.0
            capability = "CTV"
            operation_reduction = 0.4

            [[equipment]]
            name = "CTV-1"
            capabilities = ["CTV"]
            strategy = "requests-threshold"
            strategy_threshold = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.horizon_h, 720.0);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.assets[1].subassemblies[0].failures[0].level, 1);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn unknown_field_rejected() {
        let err = ScenarioConfig::from_toml_str("[simulation]\nhorizon = 10.0\n").unwrap_err();
        assert_eq!(err.field, "toml");
    }

    #[test]
    fn negative_weibull_shape_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.assets[1].subassemblies[0].failures[0].shape = -1.0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".shape")));
    }

    #[test]
    fn nan_scale_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.assets[1].subassemblies[0].failures[0].scale = f64::NAN;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".scale")));
    }

    #[test]
    fn duplicate_asset_names_rejected() {
        let mut config = ScenarioConfig::baseline();
        let name = config.assets[1].name.clone();
        config.assets[2].name = name;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "assets"));
    }

    #[test]
    fn duplicate_severity_levels_rejected() {
        let mut config = ScenarioConfig::baseline();
        let dup = config.assets[1].subassemblies[0].failures[0].clone();
        config.assets[1].subassemblies[0].failures.push(dup);
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".failures")));
    }

    #[test]
    fn unknown_substation_reference_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.assets[1].substation = "OSS9".to_string();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".substation")));
    }

    #[test]
    fn inverted_workday_rejected() {
        let mut config = ScenarioConfig::empty();
        config.simulation.workday_start = 20;
        config.simulation.workday_end = 8;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.workday_start"));
    }

    #[test]
    fn scheduled_without_charter_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.equipment[2].charter_days.clear();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".charter_days")));
    }

    #[test]
    fn unordered_charter_range_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.equipment[2].charter_days = vec![[240, 120]];
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".charter_days[0]")));
    }

    #[test]
    fn nan_maintenance_duration_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.assets[1].subassemblies[0].maintenance[0].duration_h = f64::NAN;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".duration_h")));
    }

    #[test]
    fn infinite_transit_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.equipment[0].transit_h = f64::INFINITY;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".transit_h")));
    }

    #[test]
    fn infinite_weibull_scale_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.assets[1].subassemblies[0].failures[0].scale = f64::INFINITY;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field.ends_with(".scale")));
    }

    #[test]
    fn nan_hourly_rate_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.port.hourly_rate = f64::NAN;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "port.hourly_rate"));
    }

    #[test]
    fn fractional_requests_threshold_rejected() {
        let mut config = ScenarioConfig::baseline();
        config.equipment[0].strategy_threshold = 3.9;
        let errors = config.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field.ends_with(".strategy_threshold"))
        );
    }
}
