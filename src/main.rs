//! Wind farm O&M simulator entry point — CLI wiring and config-driven engine
//! construction.

use std::collections::BTreeMap;
use std::process;

use wfo_sim::config::ScenarioConfig;
use wfo_sim::sim::engine::Engine;
use wfo_sim::sim::log::LogKind;
use wfo_sim::telemetry::export_csv;

mod cli;

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("error: {message}");
            cli::print_usage();
            process::exit(2);
        }
    };

    // Load config: --scenario takes priority, then --preset (default baseline)
    let mut scenario = if let Some(ref path) = opts.scenario {
        match ScenarioConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(2);
            }
        }
    } else if let Some(ref name) = opts.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(2);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = opts.seed {
        scenario.simulation.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(2);
    }

    let mut engine = match Engine::from_config(&scenario) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };
    let log = match engine.run(None) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("simulation error: {e}");
            process::exit(1);
        }
    };

    // Run summary
    let mut created = 0usize;
    let mut completed = 0usize;
    let mut labor = 0.0f64;
    let mut materials = 0.0f64;
    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &log {
        *by_kind.entry(record.kind.label()).or_insert(0) += 1;
        match record.kind {
            LogKind::RequestCreated { .. } => created += 1,
            LogKind::RequestCompleted {
                labor_cost,
                materials_cost,
                ..
            } => {
                completed += 1;
                labor += labor_cost;
                materials += materials_cost;
            }
            LogKind::EquipmentTransition { cost, .. } => labor += cost,
            _ => {}
        }
    }

    println!("Simulated {:.0} h across {} assets", engine.horizon_h(), engine.assets().len());
    println!("Repair requests: {created} created, {completed} completed");
    println!("Costs: {labor:.2} labor/charter, {materials:.2} materials");
    println!("Log records:");
    for (label, count) in &by_kind {
        println!("  {label}: {count}");
    }
    for asset in engine.assets() {
        println!("  {}: operating level {:.3}", asset.name, asset.operating_level());
    }

    if let Some(ref path) = opts.log_out {
        if let Err(e) = export_csv(&log, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Event log written to {}", path.display());
    }
}
