//! CSV export for the simulation event log.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::log::{LogKind, LogRecord};

/// Schema v1 column header for CSV log export.
pub const HEADER: &str = "time_h,record,asset,subassembly,request,equipment,severity,\
                          capability,level_previous,level_current,labor_cost,\
                          materials_cost,detail";

/// Exports the event log to a CSV file at the given path.
///
/// Writes a header row followed by one data row per record using the schema
/// v1 column layout. Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `records` - Complete, time-ordered event log
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[LogRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_log_csv(records, buf)
}

/// Writes the event log as CSV to any writer.
///
/// Columns not applicable to a record kind are left empty, so every row has
/// the full schema v1 width.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_log_csv(records: &[LogRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        let mut row = vec![format!("{:.4}", r.time_h), r.kind.label().to_string()];
        row.resize(13, String::new());
        match &r.kind {
            LogKind::OperatingLevel {
                asset,
                previous,
                current,
            } => {
                row[2] = asset.clone();
                row[8] = format!("{previous:.4}");
                row[9] = format!("{current:.4}");
            }
            LogKind::RequestCreated {
                request,
                asset,
                subassembly,
                severity,
                capability,
            } => {
                row[2] = asset.clone();
                row[3] = subassembly.clone();
                row[4] = request.to_string();
                row[6] = severity.to_string();
                row[7] = capability.code().to_string();
            }
            LogKind::RequestAssigned { request, equipment }
            | LogKind::RequestStarted { request, equipment } => {
                row[4] = request.to_string();
                row[5] = equipment.clone();
            }
            LogKind::RequestCompleted {
                request,
                equipment,
                labor_cost,
                materials_cost,
            } => {
                row[4] = request.to_string();
                row[5] = equipment.clone();
                row[10] = format!("{labor_cost:.2}");
                row[11] = format!("{materials_cost:.2}");
            }
            LogKind::EquipmentTransition {
                equipment,
                from,
                to,
                cost,
            } => {
                row[5] = equipment.clone();
                row[10] = format!("{cost:.2}");
                row[12] = format!("{from} -> {to}");
            }
            LogKind::ResourceWait { request, detail } => {
                row[4] = request.to_string();
                row[12] = detail.clone();
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
