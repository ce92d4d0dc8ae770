//! Simulation engine that orchestrates assets, the request queue, the
//! servicing fleet, and the port on a single event timeline.
//!
//! Every entity process is an explicit state machine multiplexed onto the
//! clock: a "suspended" process is just its next scheduled event. All state
//! mutation happens while handling exactly one event, so a run is fully
//! deterministic for a given configuration and seed.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{ConfigError, ScenarioConfig};
use crate::windfarm::WindFarm;

use super::asset::{Asset, AssetKind, Subassembly};
use super::clock::Clock;
use super::equipment::{DispatchStrategy, EquipmentPhase, ServicingEquipment};
use super::event::{Event, EventKind};
use super::failure::{FailureModel, MaintenanceTask};
use super::log::{LogKind, LogRecord};
use super::port::{Port, TowJob, TugPhase};
use super::requests::{RequestKind, RequestQueue};
use super::types::{Capability, EventId, RequestId, SimError, WorkShift};

/// Discrete-event engine owning all simulation state.
///
/// Build with [`Engine::from_config`]; construction-time errors abort before
/// the clock starts. [`Engine::run`] drains the timeline and returns the
/// time-ordered event log accumulated since the previous call.
pub struct Engine {
    horizon_h: f64,
    shift: WorkShift,
    dispatch_interval_h: f64,
    clock: Clock,
    assets: Vec<Asset>,
    farm: WindFarm,
    queue: RequestQueue,
    fleet: Vec<ServicingEquipment>,
    port: Port,
    rng: StdRng,
    log: Vec<LogRecord>,
    started: bool,
}

fn parse_capability(field: String, code: &str) -> Result<Capability, ConfigError> {
    code.parse().map_err(|e: super::types::UnknownCapability| ConfigError {
        field,
        message: e.to_string(),
    })
}

impl Engine {
    /// Builds an engine from a validated scenario configuration.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found; nothing is simulated.
    pub fn from_config(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        if let Some(error) = config.validate().into_iter().next() {
            return Err(error);
        }

        let mut assets = Vec::with_capacity(config.assets.len());
        for (ai, a) in config.assets.iter().enumerate() {
            let kind = match a.kind.as_str() {
                "turbine" => AssetKind::Turbine,
                "substation" => AssetKind::Substation,
                "cable" => AssetKind::Cable,
                other => {
                    return Err(ConfigError {
                        field: format!("assets[{ai}].kind"),
                        message: format!("unknown asset kind \"{other}\""),
                    });
                }
            };
            let mut subassemblies = Vec::with_capacity(a.subassemblies.len());
            for (si, s) in a.subassemblies.iter().enumerate() {
                let mut maintenance = Vec::with_capacity(s.maintenance.len());
                for (ti, m) in s.maintenance.iter().enumerate() {
                    maintenance.push(MaintenanceTask {
                        frequency_h: m.frequency_h,
                        duration_h: m.duration_h,
                        materials_cost: m.materials_cost,
                        capability: parse_capability(
                            format!("assets[{ai}].subassemblies[{si}].maintenance[{ti}].capability"),
                            &m.capability,
                        )?,
                    });
                }
                let mut failures = Vec::with_capacity(s.failures.len());
                for (fi, f) in s.failures.iter().enumerate() {
                    failures.push(FailureModel {
                        level: f.level,
                        shape: f.shape,
                        scale: f.scale,
                        repair_time_h: f.repair_time_h,
                        materials_cost: f.materials_cost,
                        capability: parse_capability(
                            format!("assets[{ai}].subassemblies[{si}].failures[{fi}].capability"),
                            &f.capability,
                        )?,
                        operation_reduction: f.operation_reduction,
                    });
                }
                subassemblies.push(Subassembly::new(s.key.clone(), maintenance, failures));
            }
            assets.push(Asset::new(a.name.clone(), kind, a.capacity_kw, subassemblies));
        }

        let index: HashMap<&str, usize> = config
            .assets
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.as_str(), i))
            .collect();
        let mut substation_of = Vec::with_capacity(assets.len());
        for (ai, a) in config.assets.iter().enumerate() {
            if assets[ai].kind == AssetKind::Substation {
                substation_of.push(ai);
            } else {
                let target = index.get(a.substation.as_str()).copied().ok_or_else(|| ConfigError {
                    field: format!("assets[{ai}].substation"),
                    message: format!("unknown substation \"{}\"", a.substation),
                })?;
                substation_of.push(target);
            }
        }
        let farm = WindFarm::new(&assets, substation_of);

        let mut fleet = Vec::with_capacity(config.equipment.len());
        for (ei, e) in config.equipment.iter().enumerate() {
            let mut capabilities = Vec::with_capacity(e.capabilities.len());
            for (ci, c) in e.capabilities.iter().enumerate() {
                capabilities.push(parse_capability(
                    format!("equipment[{ei}].capabilities[{ci}]"),
                    c,
                )?);
            }
            let strategy = match e.strategy.as_str() {
                "scheduled" => DispatchStrategy::Scheduled {
                    charter_days: e.charter_days.iter().map(|r| (r[0], r[1])).collect(),
                },
                "requests-threshold" => DispatchStrategy::RequestsThreshold {
                    count: e.strategy_threshold as usize,
                },
                "downtime-threshold" => DispatchStrategy::DowntimeThreshold {
                    fraction: e.strategy_threshold,
                },
                other => {
                    return Err(ConfigError {
                        field: format!("equipment[{ei}].strategy"),
                        message: format!("unknown dispatch strategy \"{other}\""),
                    });
                }
            };
            fleet.push(ServicingEquipment::new(
                e.name.clone(),
                capabilities,
                strategy,
                e.mobilization_h,
                e.mobilization_cost,
                e.transit_h,
                e.hourly_rate,
            ));
        }

        let sim = &config.simulation;
        Ok(Self {
            horizon_h: sim.horizon_h,
            shift: WorkShift::new(sim.workday_start, sim.workday_end),
            dispatch_interval_h: sim.dispatch_interval_h,
            clock: Clock::new(),
            assets,
            farm,
            queue: RequestQueue::new(),
            fleet,
            port: Port::new(
                config.port.tugs,
                config.port.transit_h,
                config.port.tow_h,
                config.port.hourly_rate,
            ),
            rng: StdRng::seed_from_u64(sim.seed),
            log: Vec::new(),
            started: false,
        })
    }

    /// Current simulation time in hours.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Configured simulation horizon in hours.
    pub fn horizon_h(&self) -> f64 {
        self.horizon_h
    }

    /// Read-only view of the assets.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Capacity-weighted downtime fraction at the current instant.
    pub fn weighted_downtime(&self) -> f64 {
        self.farm.weighted_downtime(&self.assets)
    }

    /// Runs the simulation to `until` hours (capped at the configured
    /// horizon) and returns the log records accumulated since the last call.
    ///
    /// # Errors
    ///
    /// Fails only on internal defects ([`SimError`]); runtime resource
    /// shortages are absorbed into simulated downtime instead.
    pub fn run(&mut self, until: Option<f64>) -> Result<Vec<LogRecord>, SimError> {
        if !self.started {
            self.started = true;
            self.initialize()?;
        }
        let horizon = until.unwrap_or(self.horizon_h).min(self.horizon_h);
        while let Some(event) = self.clock.advance_through(horizon) {
            self.handle(event)?;
        }
        Ok(std::mem::take(&mut self.log))
    }

    /// Seeds the timeline: one failure draw per severity level, the first
    /// occurrence of every maintenance task, and the fleet's periodic
    /// dispatch checks.
    fn initialize(&mut self) -> Result<(), SimError> {
        for asset in 0..self.assets.len() {
            for subassembly in 0..self.assets[asset].subassemblies.len() {
                self.schedule_failure_draws(asset, subassembly)?;
                let frequencies: Vec<f64> = self.assets[asset].subassemblies[subassembly]
                    .maintenance
                    .iter()
                    .map(|t| t.frequency_h)
                    .collect();
                for (task, frequency_h) in frequencies.into_iter().enumerate() {
                    self.clock.schedule(
                        frequency_h,
                        EventKind::MaintenanceDue {
                            asset,
                            subassembly,
                            task,
                        },
                    )?;
                }
            }
        }
        for equipment in 0..self.fleet.len() {
            let first = match self.fleet[equipment].strategy {
                DispatchStrategy::Scheduled { .. } => {
                    self.fleet[equipment].next_charter_shift_start(&self.shift, 0.0)
                }
                _ => Some(0.0),
            };
            if let Some(time_h) = first {
                self.clock.schedule(
                    time_h,
                    EventKind::DispatchCheck {
                        equipment,
                        periodic: true,
                    },
                )?;
            }
        }
        Ok(())
    }

    fn handle(&mut self, event: Event) -> Result<(), SimError> {
        match event.kind {
            EventKind::FailureDue {
                asset,
                subassembly,
                level,
            } => self.on_failure_due(event.id, asset, subassembly, level),
            EventKind::MaintenanceDue {
                asset,
                subassembly,
                task,
            } => self.on_maintenance_due(asset, subassembly, task),
            EventKind::DispatchCheck { equipment, periodic } => {
                self.on_dispatch_check(equipment, periodic)
            }
            EventKind::EquipmentPhaseComplete { equipment } => {
                self.on_equipment_phase_complete(equipment)
            }
            EventKind::RepairResume { equipment } => self.on_repair_resume(equipment),
            EventKind::TugPhaseComplete { tug } => self.on_tug_phase_complete(tug),
        }
    }

    fn push_log(&mut self, kind: LogKind) {
        let time_h = self.clock.now();
        self.log.push(LogRecord { time_h, kind });
    }

    fn log_transition(&mut self, equipment: String, from: &'static str, to: &'static str, cost: f64) {
        self.push_log(LogKind::EquipmentTransition {
            equipment,
            from,
            to,
            cost,
        });
    }

    /// Recomputes an asset's operating level and logs the change, if any.
    fn refresh_operating_level(&mut self, asset: usize) {
        let previous = self.assets[asset].operating_level();
        let current = self.assets[asset].recompute_operating_level();
        if (current - previous).abs() > 1e-12 {
            self.push_log(LogKind::OperatingLevel {
                asset: self.assets[asset].name.clone(),
                previous,
                current,
            });
        }
    }

    /// Draws the next failure time for every severity level of a
    /// subassembly and schedules the resulting events.
    fn schedule_failure_draws(&mut self, asset: usize, subassembly: usize) -> Result<(), SimError> {
        let now = self.clock.now();
        let rng = &mut self.rng;
        let draws: Vec<(u8, f64)> = self.assets[asset].subassemblies[subassembly]
            .failures
            .values()
            .filter_map(|m| m.sample_time_to_failure(rng).map(|dt| (m.level, now + dt)))
            .collect();
        let mut pending = Vec::with_capacity(draws.len());
        for (level, time_h) in draws {
            pending.push(self.clock.schedule(
                time_h,
                EventKind::FailureDue {
                    asset,
                    subassembly,
                    level,
                },
            )?);
        }
        self.assets[asset].subassemblies[subassembly].pending_draws = pending;
        Ok(())
    }

    fn cancel_failure_draws(&mut self, asset: usize, subassembly: usize) {
        let pending = std::mem::take(&mut self.assets[asset].subassemblies[subassembly].pending_draws);
        for id in pending {
            self.clock.cancel(id);
        }
    }

    fn on_failure_due(
        &mut self,
        event: EventId,
        asset: usize,
        subassembly: usize,
        level: u8,
    ) -> Result<(), SimError> {
        let now = self.clock.now();
        let (capability, duration_h, materials_cost) = {
            let sub = &self.assets[asset].subassemblies[subassembly];
            let model = sub.failures.get(&level).ok_or_else(|| {
                SimError::Inconsistency(format!(
                    "failure event for unknown severity {level} on \"{}\"",
                    sub.key
                ))
            })?;
            (model.capability, model.repair_time_h, model.materials_cost)
        };
        {
            let sub = &mut self.assets[asset].subassemblies[subassembly];
            sub.pending_draws.retain(|&id| id != event);
            sub.record_failure(level);
        }
        // Degraded-but-running: the reduction applies immediately, not once
        // repaired.
        self.refresh_operating_level(asset);
        let request = self.queue.create(
            asset,
            subassembly,
            RequestKind::Failure { level },
            capability,
            now,
            duration_h,
            materials_cost,
        );
        self.push_log(LogKind::RequestCreated {
            request,
            asset: self.assets[asset].name.clone(),
            subassembly: self.assets[asset].subassemblies[subassembly].key.clone(),
            severity: level,
            capability,
        });
        self.route_request(request, capability)
    }

    fn on_maintenance_due(&mut self, asset: usize, subassembly: usize, task: usize) -> Result<(), SimError> {
        let now = self.clock.now();
        let (capability, duration_h, materials_cost, frequency_h) = {
            let t = self.assets[asset].subassemblies[subassembly]
                .maintenance
                .get(task)
                .ok_or_else(|| {
                    SimError::Inconsistency(format!("maintenance event for unknown task {task}"))
                })?;
            (t.capability, t.duration_h, t.materials_cost, t.frequency_h)
        };
        // Maintenance recurs deterministically, independent of failures.
        self.clock.schedule(
            now + frequency_h,
            EventKind::MaintenanceDue {
                asset,
                subassembly,
                task,
            },
        )?;
        let request = self.queue.create(
            asset,
            subassembly,
            RequestKind::Maintenance { task },
            capability,
            now,
            duration_h,
            materials_cost,
        );
        self.push_log(LogKind::RequestCreated {
            request,
            asset: self.assets[asset].name.clone(),
            subassembly: self.assets[asset].subassemblies[subassembly].key.clone(),
            severity: 0,
            capability,
        });
        self.route_request(request, capability)
    }

    /// Sends a new request down the tow-to-port path or to the fleet.
    fn route_request(&mut self, request: RequestId, capability: Capability) -> Result<(), SimError> {
        if capability == Capability::Tow {
            if self.port.idle_tug().is_none() {
                self.push_log(LogKind::ResourceWait {
                    request,
                    detail: "port at capacity, tow queued".to_string(),
                });
            }
            self.port.enqueue(request);
            self.dispatch_tows()?;
            // The failure behind the tow still moves the operating level,
            // which downtime-threshold strategies react to.
            self.schedule_fleet_checks()
        } else {
            if !self.fleet.iter().any(|e| e.can_serve(capability)) {
                self.push_log(LogKind::ResourceWait {
                    request,
                    detail: format!("no equipment with capability {capability}"),
                });
            }
            self.schedule_fleet_checks()
        }
    }

    /// Fires an immediate ad-hoc dispatch check for every equipment, so
    /// threshold strategies react at the instant their condition changes.
    fn schedule_fleet_checks(&mut self) -> Result<(), SimError> {
        let now = self.clock.now();
        for equipment in 0..self.fleet.len() {
            self.clock.schedule(
                now,
                EventKind::DispatchCheck {
                    equipment,
                    periodic: false,
                },
            )?;
        }
        Ok(())
    }

    fn on_dispatch_check(&mut self, equipment: usize, periodic: bool) -> Result<(), SimError> {
        if periodic {
            if let Some(time_h) = self.next_check_time(equipment) {
                self.clock.schedule(
                    time_h,
                    EventKind::DispatchCheck {
                        equipment,
                        periodic: true,
                    },
                )?;
            }
        }
        let now = self.clock.now();
        match self.fleet[equipment].phase {
            EquipmentPhase::Idle => {
                if self.fleet[equipment].on_station {
                    self.service_next(equipment)?;
                } else if self.should_mobilize(equipment) {
                    self.start_mobilizing(equipment)?;
                }
            }
            EquipmentPhase::Mobilizing | EquipmentPhase::Traveling => {
                // An expired scheduled charter recalls the equipment even
                // mid-transit; the pending leg is cancelled and any claimed
                // request goes back to the queue.
                let eq = &self.fleet[equipment];
                if matches!(eq.strategy, DispatchStrategy::Scheduled { .. })
                    && (!eq.charter_active(now) || !self.shift.contains(now))
                {
                    self.start_returning(equipment)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Time of the next periodic check for this equipment: charter window
    /// boundaries for scheduled strategies, a fixed cadence otherwise.
    fn next_check_time(&self, equipment: usize) -> Option<f64> {
        let now = self.clock.now();
        let eq = &self.fleet[equipment];
        match eq.strategy {
            DispatchStrategy::Scheduled { .. } => {
                if eq.charter_active(now) && self.shift.contains(now) {
                    Some(self.shift.end_of_day(now))
                } else {
                    eq.next_charter_shift_start(&self.shift, now)
                }
            }
            _ => Some(now + self.dispatch_interval_h),
        }
    }

    fn should_mobilize(&self, equipment: usize) -> bool {
        let now = self.clock.now();
        let eq = &self.fleet[equipment];
        match eq.strategy {
            DispatchStrategy::Scheduled { .. } => {
                eq.charter_active(now) && self.shift.contains(now)
            }
            DispatchStrategy::RequestsThreshold { count } => {
                self.queue.open_matchable(&eq.capabilities) >= count
            }
            DispatchStrategy::DowntimeThreshold { fraction } => {
                self.farm.weighted_downtime(&self.assets) >= fraction
            }
        }
    }

    fn start_mobilizing(&mut self, equipment: usize) -> Result<(), SimError> {
        let now = self.clock.now();
        let pending = self.clock.schedule(
            now + self.fleet[equipment].mobilization_h,
            EventKind::EquipmentPhaseComplete { equipment },
        )?;
        let eq = &mut self.fleet[equipment];
        let from = eq.phase.label();
        eq.phase = EquipmentPhase::Mobilizing;
        eq.pending_event = Some(pending);
        let name = eq.name.clone();
        let cost = eq.mobilization_cost;
        self.log_transition(name, from, "mobilizing", cost);
        Ok(())
    }

    /// On-station idle equipment looks for its next job or goes home,
    /// per its strategy.
    fn service_next(&mut self, equipment: usize) -> Result<(), SimError> {
        let now = self.clock.now();
        match self.fleet[equipment].strategy.clone() {
            DispatchStrategy::Scheduled { .. } => {
                let eq = &self.fleet[equipment];
                if !eq.charter_active(now) || !self.shift.contains(now) {
                    return self.start_returning(equipment);
                }
                self.try_claim_and_travel(equipment)?;
                Ok(())
            }
            DispatchStrategy::RequestsThreshold { .. } => {
                // Stays out until its matchable queue is empty.
                if !self.try_claim_and_travel(equipment)? {
                    self.start_returning(equipment)?;
                }
                Ok(())
            }
            DispatchStrategy::DowntimeThreshold { fraction } => {
                if self.farm.weighted_downtime(&self.assets) < fraction {
                    return self.start_returning(equipment);
                }
                self.try_claim_and_travel(equipment)?;
                Ok(())
            }
        }
    }

    /// Atomically matches and claims the best open request; returns whether
    /// a claim was made.
    fn try_claim_and_travel(&mut self, equipment: usize) -> Result<bool, SimError> {
        let request = {
            let eq = &self.fleet[equipment];
            let assets = &self.assets;
            self.queue
                .match_for(&eq.capabilities, |a| assets[a].under_tow())
        };
        let Some(request) = request else {
            return Ok(false);
        };
        self.queue.assign(request)?;
        let now = self.clock.now();
        let pending = self.clock.schedule(
            now + self.fleet[equipment].transit_h,
            EventKind::EquipmentPhaseComplete { equipment },
        )?;
        let eq = &mut self.fleet[equipment];
        eq.assignment = Some(request);
        let from = eq.phase.label();
        eq.phase = EquipmentPhase::Traveling;
        eq.pending_event = Some(pending);
        let name = eq.name.clone();
        self.push_log(LogKind::RequestAssigned {
            request,
            equipment: name.clone(),
        });
        self.log_transition(name, from, "traveling", 0.0);
        Ok(true)
    }

    fn on_equipment_phase_complete(&mut self, equipment: usize) -> Result<(), SimError> {
        self.fleet[equipment].pending_event = None;
        match self.fleet[equipment].phase {
            EquipmentPhase::Mobilizing => {
                {
                    let eq = &mut self.fleet[equipment];
                    eq.phase = EquipmentPhase::Idle;
                    eq.on_station = true;
                }
                let name = self.fleet[equipment].name.clone();
                self.log_transition(name, "mobilizing", "idle", 0.0);
                self.service_next(equipment)
            }
            EquipmentPhase::Traveling => self.arrive_at_asset(equipment),
            EquipmentPhase::Servicing => self.complete_service(equipment),
            EquipmentPhase::Returning => {
                {
                    let eq = &mut self.fleet[equipment];
                    eq.phase = EquipmentPhase::Idle;
                    eq.on_station = false;
                }
                let name = self.fleet[equipment].name.clone();
                self.log_transition(name, "returning", "idle", 0.0);
                // Backlog may have become matchable while the unit was on its
                // way home; re-evaluate now instead of at the next cadence.
                let now = self.clock.now();
                self.clock.schedule(
                    now,
                    EventKind::DispatchCheck {
                        equipment,
                        periodic: false,
                    },
                )?;
                Ok(())
            }
            EquipmentPhase::Idle => Err(SimError::Inconsistency(format!(
                "phase event fired for idle equipment \"{}\"",
                self.fleet[equipment].name
            ))),
        }
    }

    /// Arrival at the asset: start servicing, or park until the next shift
    /// if the working window has closed.
    fn arrive_at_asset(&mut self, equipment: usize) -> Result<(), SimError> {
        let now = self.clock.now();
        let request = self.fleet[equipment].assignment.ok_or_else(|| {
            SimError::Inconsistency(format!(
                "\"{}\" arrived with no assignment",
                self.fleet[equipment].name
            ))
        })?;
        if let Some(r) = self.queue.get(request)
            && self.assets[r.asset].under_tow()
        {
            // The asset left for the port after the claim was made.
            self.push_log(LogKind::ResourceWait {
                request,
                detail: "asset under tow on arrival, claim released".to_string(),
            });
            return self.start_returning(equipment);
        }
        if self.shift.contains(now) {
            return self.start_service(equipment);
        }
        let resume = self.shift.next_start(now);
        let pending = self
            .clock
            .schedule(resume, EventKind::RepairResume { equipment })?;
        self.fleet[equipment].pending_event = Some(pending);
        self.push_log(LogKind::ResourceWait {
            request,
            detail: format!("outside working hours, parked until {resume:.1} h"),
        });
        Ok(())
    }

    fn start_service(&mut self, equipment: usize) -> Result<(), SimError> {
        let request = self.fleet[equipment].assignment.ok_or_else(|| {
            SimError::Inconsistency(format!(
                "\"{}\" began service without an assignment",
                self.fleet[equipment].name
            ))
        })?;
        let (asset, subassembly, duration_h) = {
            let r = self.queue.get(request).ok_or_else(|| {
                SimError::Inconsistency(format!("service start for unknown request {request}"))
            })?;
            (r.asset, r.subassembly, r.duration_h)
        };
        self.queue.start(request)?;
        self.assets[asset].subassemblies[subassembly].begin_repair(request)?;
        let now = self.clock.now();
        let pending = self.clock.schedule(
            now + duration_h,
            EventKind::EquipmentPhaseComplete { equipment },
        )?;
        let eq = &mut self.fleet[equipment];
        let from = eq.phase.label();
        eq.phase = EquipmentPhase::Servicing;
        eq.pending_event = Some(pending);
        let name = eq.name.clone();
        self.push_log(LogKind::RequestStarted {
            request,
            equipment: name.clone(),
        });
        self.log_transition(name, from, "servicing", 0.0);
        Ok(())
    }

    fn complete_service(&mut self, equipment: usize) -> Result<(), SimError> {
        let request = self.fleet[equipment].assignment.take().ok_or_else(|| {
            SimError::Inconsistency(format!(
                "\"{}\" completed service without an assignment",
                self.fleet[equipment].name
            ))
        })?;
        let record = self.queue.complete(request).ok_or_else(|| {
            SimError::Inconsistency(format!("completion of unknown request {request}"))
        })?;
        let labor_cost = record.duration_h * self.fleet[equipment].hourly_rate;
        let name = self.fleet[equipment].name.clone();
        self.push_log(LogKind::RequestCompleted {
            request,
            equipment: name,
            labor_cost,
            materials_cost: record.materials_cost,
        });

        let resolved = match record.kind {
            RequestKind::Failure { level } => Some(level),
            RequestKind::Maintenance { .. } => None,
        };
        self.assets[record.asset].subassemblies[record.subassembly].complete_repair(resolved);
        // Every severity level of the repaired subassembly is redrawn.
        self.cancel_failure_draws(record.asset, record.subassembly);
        self.schedule_failure_draws(record.asset, record.subassembly)?;
        self.refresh_operating_level(record.asset);
        self.schedule_fleet_checks()?;
        // A completed repair may unblock a deferred tow on the same
        // subassembly.
        self.dispatch_tows()?;
        self.service_next(equipment)
    }

    fn on_repair_resume(&mut self, equipment: usize) -> Result<(), SimError> {
        self.fleet[equipment].pending_event = None;
        if self.fleet[equipment].phase != EquipmentPhase::Traveling
            || self.fleet[equipment].assignment.is_none()
        {
            return Err(SimError::Inconsistency(format!(
                "resume fired for \"{}\" with no parked repair",
                self.fleet[equipment].name
            )));
        }
        // Overnight the asset may have been collected for a port repair.
        if let Some(request) = self.fleet[equipment].assignment
            && let Some(r) = self.queue.get(request)
            && self.assets[r.asset].under_tow()
        {
            self.push_log(LogKind::ResourceWait {
                request,
                detail: "asset under tow on arrival, claim released".to_string(),
            });
            return self.start_returning(equipment);
        }
        self.start_service(equipment)
    }

    /// Sends equipment home. If a leg was pending it is cancelled, and a
    /// claimed-but-unstarted request goes back to `Open` without penalty.
    fn start_returning(&mut self, equipment: usize) -> Result<(), SimError> {
        if let Some(pending) = self.fleet[equipment].pending_event.take() {
            self.clock.cancel(pending);
        }
        if let Some(request) = self.fleet[equipment].assignment.take() {
            self.queue.release(request);
            // Releasing the claim may unblock a deferred tow on that asset.
            self.dispatch_tows()?;
        }
        let now = self.clock.now();
        let pending = self.clock.schedule(
            now + self.fleet[equipment].transit_h,
            EventKind::EquipmentPhaseComplete { equipment },
        )?;
        let eq = &mut self.fleet[equipment];
        let from = eq.phase.label();
        eq.phase = EquipmentPhase::Returning;
        eq.pending_event = Some(pending);
        let name = eq.name.clone();
        self.log_transition(name, from, "returning", 0.0);
        Ok(())
    }

    /// Pairs queued tow requests with idle tugs, FIFO, until one runs out.
    ///
    /// A tow whose asset still has a claimed on-site repair is deferred: the
    /// tug stays idle and the request goes back to the end of the queue, to
    /// be retried when a service completes or a tug returns.
    fn dispatch_tows(&mut self) -> Result<(), SimError> {
        while let Some((tug, request)) = self.port.claim_next() {
            let (asset, subassembly, level, duration_h) = {
                let r = self.queue.get(request).ok_or_else(|| {
                    SimError::Inconsistency(format!("tow claim of unknown request {request}"))
                })?;
                let level = match r.kind {
                    RequestKind::Failure { level } => Some(level),
                    RequestKind::Maintenance { .. } => None,
                };
                (r.asset, r.subassembly, level, r.duration_h)
            };
            if self.queue.asset_busy(asset, request) {
                self.port.tugs[tug].phase = TugPhase::Idle;
                self.port.tugs[tug].request = None;
                self.port.enqueue(request);
                self.push_log(LogKind::ResourceWait {
                    request,
                    detail: "tow deferred, on-site repair in flight".to_string(),
                });
                break;
            }
            self.queue.assign(request)?;
            self.port.tugs[tug].job = Some(TowJob {
                asset,
                subassembly,
                level,
                duration_h,
            });
            let now = self.clock.now();
            self.clock
                .schedule(now + self.port.transit_h, EventKind::TugPhaseComplete { tug })?;
            let name = self.port.tugs[tug].name.clone();
            self.push_log(LogKind::RequestAssigned {
                request,
                equipment: name.clone(),
            });
            self.log_transition(name, "idle", "to-site", 0.0);
        }
        Ok(())
    }

    fn on_tug_phase_complete(&mut self, tug: usize) -> Result<(), SimError> {
        let now = self.clock.now();
        let phase = self.port.tugs[tug].phase;
        let job = self.port.tugs[tug].job.ok_or_else(|| {
            SimError::Inconsistency(format!("tow event fired for tug {tug} with no job"))
        });
        match phase {
            TugPhase::ToSite => {
                let job = job?;
                // The asset leaves its position: zero output until it is back.
                self.assets[job.asset].set_under_tow(true);
                self.refresh_operating_level(job.asset);
                self.schedule_fleet_checks()?;
                self.port.tugs[tug].phase = TugPhase::TowIn;
                self.clock
                    .schedule(now + self.port.tow_h, EventKind::TugPhaseComplete { tug })?;
                let name = self.port.tugs[tug].name.clone();
                self.log_transition(name, "to-site", "tow-in", 0.0);
            }
            TugPhase::TowIn => {
                let job = job?;
                let request = self.port.tugs[tug].request.ok_or_else(|| {
                    SimError::Inconsistency(format!("tug {tug} towing without a request"))
                })?;
                self.queue.start(request)?;
                self.assets[job.asset].subassemblies[job.subassembly].begin_repair(request)?;
                self.port.tugs[tug].phase = TugPhase::AtPort;
                self.clock
                    .schedule(now + job.duration_h, EventKind::TugPhaseComplete { tug })?;
                let name = self.port.tugs[tug].name.clone();
                self.push_log(LogKind::RequestStarted {
                    request,
                    equipment: name.clone(),
                });
                self.log_transition(name, "tow-in", "at-port", 0.0);
            }
            TugPhase::AtPort => {
                let job = job?;
                let request = self.port.tugs[tug].request.ok_or_else(|| {
                    SimError::Inconsistency(format!("tug {tug} servicing without a request"))
                })?;
                let record = self.queue.complete(request).ok_or_else(|| {
                    SimError::Inconsistency(format!("completion of unknown request {request}"))
                })?;
                let labor_cost = record.duration_h * self.port.hourly_rate;
                let name = self.port.tugs[tug].name.clone();
                self.push_log(LogKind::RequestCompleted {
                    request,
                    equipment: name.clone(),
                    labor_cost,
                    materials_cost: record.materials_cost,
                });
                self.assets[job.asset].subassemblies[job.subassembly].complete_repair(job.level);
                self.port.tugs[tug].phase = TugPhase::TowOut;
                self.clock
                    .schedule(now + self.port.tow_h, EventKind::TugPhaseComplete { tug })?;
                self.log_transition(name, "at-port", "tow-out", 0.0);
            }
            TugPhase::TowOut => {
                let job = job?;
                self.assets[job.asset].set_under_tow(false);
                self.cancel_failure_draws(job.asset, job.subassembly);
                self.schedule_failure_draws(job.asset, job.subassembly)?;
                self.refresh_operating_level(job.asset);
                self.schedule_fleet_checks()?;
                self.port.tugs[tug].phase = TugPhase::Returning;
                self.clock
                    .schedule(now + self.port.transit_h, EventKind::TugPhaseComplete { tug })?;
                let name = self.port.tugs[tug].name.clone();
                self.log_transition(name, "tow-out", "returning", 0.0);
            }
            TugPhase::Returning => {
                let _ = job;
                self.port.tugs[tug].phase = TugPhase::Idle;
                self.port.tugs[tug].request = None;
                self.port.tugs[tug].job = None;
                let name = self.port.tugs[tug].name.clone();
                self.log_transition(name, "returning", "idle", 0.0);
                self.dispatch_tows()?;
            }
            TugPhase::Idle => {
                return Err(SimError::Inconsistency(format!(
                    "tow event fired for idle tug \"{}\"",
                    self.port.tugs[tug].name
                )));
            }
        }
        Ok(())
    }
}
