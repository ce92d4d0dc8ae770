//! Integration tests for the dispatch strategies and the working shift.

mod common;

use wfo_sim::sim::engine::Engine;
use wfo_sim::sim::log::LogKind;

use common::{base_config, equipment, failing_sub, failure, maintained_sub, substation, turbine};

fn mobilizing_times(log: &[wfo_sim::sim::log::LogRecord]) -> Vec<f64> {
    log.iter()
        .filter_map(|r| match &r.kind {
            LogKind::EquipmentTransition { to, .. } if *to == "mobilizing" => Some(r.time_h),
            _ => None,
        })
        .collect()
}

fn started_times(log: &[wfo_sim::sim::log::LogRecord]) -> Vec<f64> {
    log.iter()
        .filter_map(|r| match &r.kind {
            LogKind::RequestStarted { .. } => Some(r.time_h),
            _ => None,
        })
        .collect()
}

#[test]
fn requests_threshold_waits_for_enough_demand() {
    let mut config = base_config();
    config.simulation.horizon_h = 200.0;
    config.assets = vec![
        substation(),
        turbine("T1", 3000.0, vec![maintained_sub("blades", "CTV", 50.0, 4.0)]),
        turbine("T2", 3000.0, vec![maintained_sub("blades", "CTV", 60.0, 4.0)]),
        turbine("T3", 3000.0, vec![maintained_sub("blades", "CTV", 70.0, 4.0)]),
    ];
    let mut ctv = equipment("CTV-1", &["CTV"], "requests-threshold", 3.0);
    ctv.mobilization_h = 2.0;
    ctv.transit_h = 1.0;
    config.equipment = vec![ctv];

    let mut engine = Engine::from_config(&config).expect("valid config");
    let log = engine.run(Some(71.0)).expect("clean run");

    // Demand arrives at 50, 60, and 70; the threshold of three is only met
    // by the third request.
    assert_eq!(mobilizing_times(&log), vec![70.0]);
}

#[test]
fn downtime_threshold_reacts_to_lost_output() {
    let mut config = base_config();
    config.assets = vec![
        substation(),
        turbine(
            "T1",
            1000.0,
            vec![failing_sub("generator", failure(1, 1.0, 1000.0, 8.0, "DSV", 1.0))],
        ),
        turbine(
            "T2",
            1000.0,
            // The shape/scale sentinel: this turbine never fails.
            vec![failing_sub("generator", failure(1, 0.0, 0.0, 8.0, "DSV", 1.0))],
        ),
    ];
    let mut dsv = equipment("DSV-1", &["DSV"], "downtime-threshold", 0.5);
    dsv.mobilization_h = 1.0;
    dsv.transit_h = 1.0;
    config.equipment = vec![dsv];

    let mut engine = Engine::from_config(&config).expect("valid config");
    let log = engine.run(None).expect("clean run");

    // Losing T1 puts exactly half the farm's capacity offline, so the unit
    // mobilizes at the instant the level drops.
    let first_drop = log
        .iter()
        .find(|r| matches!(r.kind, LogKind::OperatingLevel { .. }))
        .map(|r| r.time_h)
        .expect("a failure fires within the horizon");
    let mobilized = mobilizing_times(&log);
    assert_eq!(mobilized.first(), Some(&first_drop));

    // Once the repair completes the downtime is back under threshold and
    // the unit heads home straight from the job.
    assert!(log.iter().any(|r| matches!(
        &r.kind,
        LogKind::EquipmentTransition { from, to, .. }
            if *from == "servicing" && *to == "returning"
    )));
}

#[test]
fn scheduled_equipment_works_its_charter_shift() {
    let mut config = base_config();
    config.simulation.workday_start = 8;
    config.simulation.workday_end = 16;
    config.simulation.horizon_h = 100.0;
    config.assets = vec![
        substation(),
        turbine("T1", 3000.0, vec![maintained_sub("blades", "CTV", 30.0, 4.0)]),
    ];
    let mut scn = equipment("SCN-1", &["CTV"], "scheduled", 0.0);
    scn.charter_days = vec![[0, 364]];
    scn.transit_h = 2.0;
    config.equipment = vec![scn];

    let mut engine = Engine::from_config(&config).expect("valid config");
    let log = engine.run(Some(36.0)).expect("clean run");

    // The request lands at 30, outside the 8-16 shift of day one. The unit
    // re-mobilizes at the next shift start (32), travels 2 h, and starts at
    // 34.
    assert_eq!(started_times(&log), vec![34.0]);

    // Day one: on station at 08:00 with nothing to do, sent home at 16:00.
    assert!(log.iter().any(|r| r.time_h == 16.0
        && matches!(
            &r.kind,
            LogKind::EquipmentTransition { from, to, .. }
                if *from == "idle" && *to == "returning"
        )));
}

#[test]
fn shift_end_recalls_equipment_mid_transit() {
    let mut config = base_config();
    config.simulation.workday_start = 8;
    config.simulation.workday_end = 16;
    config.simulation.horizon_h = 100.0;
    config.assets = vec![
        substation(),
        turbine("T1", 3000.0, vec![maintained_sub("blades", "CTV", 14.0, 2.0)]),
    ];
    let mut scn = equipment("SCN-1", &["CTV"], "scheduled", 0.0);
    scn.charter_days = vec![[0, 364]];
    scn.transit_h = 4.0;
    config.equipment = vec![scn];

    let mut engine = Engine::from_config(&config).expect("valid config");
    let log = engine.run(Some(37.0)).expect("clean run");

    // The claim is made at 14, two hours before the shift ends, but the
    // 4 h transit would only land at 18. The 16:00 check recalls the unit
    // mid-leg: the arrival event is cancelled and the claim reopens.
    assert!(log.iter().any(|r| r.time_h == 16.0
        && matches!(
            &r.kind,
            LogKind::EquipmentTransition { from, to, .. }
                if *from == "traveling" && *to == "returning"
        )));
    assert!(log.iter().any(|r| r.time_h == 20.0
        && matches!(
            &r.kind,
            LogKind::EquipmentTransition { from, to, .. }
                if *from == "returning" && *to == "idle"
        )));
    // The cancelled arrival leaves no trace at 18.
    assert!(log.iter().all(|r| r.time_h != 18.0));

    // The reopened request is claimed again at the next shift start and
    // finally serviced on arrival.
    let assigned: Vec<(f64, wfo_sim::sim::types::RequestId)> = log
        .iter()
        .filter_map(|r| match &r.kind {
            LogKind::RequestAssigned { request, .. } => Some((r.time_h, *request)),
            _ => None,
        })
        .collect();
    assert_eq!(assigned.len(), 2);
    assert_eq!(assigned[0].1, assigned[1].1);
    assert_eq!((assigned[0].0, assigned[1].0), (14.0, 32.0));
    assert_eq!(started_times(&log), vec![36.0]);
}

#[test]
fn backlog_arriving_during_the_return_leg_is_picked_up_at_home() {
    let mut config = base_config();
    config.simulation.horizon_h = 100.0;
    config.assets = vec![
        substation(),
        turbine("T1", 3000.0, vec![maintained_sub("blades", "CTV", 9.0, 2.0)]),
    ];
    let mut ctv = equipment("CTV-1", &["CTV"], "requests-threshold", 1.0);
    ctv.transit_h = 4.0;
    config.equipment = vec![ctv];

    let mut engine = Engine::from_config(&config).expect("valid config");
    let log = engine.run(Some(23.5)).expect("clean run");

    // First task: due at 9, served at 13, done at 15, home at 19. The next
    // recurrence lands at 18 while the unit is still on its return leg, so
    // it turns straight around at 19 instead of waiting for the 24 h
    // dispatch cadence.
    assert_eq!(mobilizing_times(&log), vec![9.0, 19.0]);
    assert_eq!(started_times(&log), vec![13.0, 23.0]);
}

#[test]
fn out_of_shift_arrival_parks_until_next_morning() {
    let mut config = base_config();
    config.simulation.workday_start = 0;
    config.simulation.workday_end = 10;
    config.simulation.horizon_h = 100.0;
    config.assets = vec![
        substation(),
        turbine("T1", 3000.0, vec![maintained_sub("blades", "CTV", 8.0, 2.0)]),
    ];
    let mut ctv = equipment("CTV-1", &["CTV"], "requests-threshold", 1.0);
    ctv.transit_h = 4.0;
    config.equipment = vec![ctv];

    let mut engine = Engine::from_config(&config).expect("valid config");
    let log = engine.run(Some(25.0)).expect("clean run");

    // Dispatched at 8, arriving at 12 with the shift already over; the crew
    // parks at the turbine and starts at the next shift start, 24.
    assert!(log.iter().any(|r| r.time_h == 12.0
        && matches!(&r.kind, LogKind::ResourceWait { detail, .. } if detail.contains("parked"))));
    assert_eq!(started_times(&log).first(), Some(&24.0));
}
