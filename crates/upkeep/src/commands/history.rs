use anyhow::Result;

use crate::cli::HistoryArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::history::history;
use upkeep_core::storage;
use upkeep_core::types::{
    DowntimeEvent, MaintenanceRecord, MaintenanceSchedule, Receipt, WorkOrder,
};

pub fn run(ctx: &RuntimeContext, args: &HistoryArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let unit = resolve_equipment(&paths, &args.equipment)?;

    let schedules: Vec<MaintenanceSchedule> = storage::read_collection(&paths.schedules)?;
    let orders: Vec<WorkOrder> = storage::read_collection(&paths.work_orders)?;
    let records: Vec<MaintenanceRecord> = storage::read_collection(&paths.maintenance_records)?;
    let receipts: Vec<Receipt> = storage::read_collection(&paths.receipts)?;
    let downtime: Vec<DowntimeEvent> = storage::read_collection(&paths.downtime)?;

    let entries = history(
        unit.id.as_deref().unwrap_or_default(),
        &schedules,
        &orders,
        &records,
        &receipts,
        &downtime,
    );

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "history",
            "equipment": unit.code,
            "entries": entries,
        }));
    } else if entries.is_empty() {
        print_warning(&format!("No history for {}.", unit.code));
    } else {
        for entry in &entries {
            println!(
                "{}  {:<22} {}",
                entry.at.format("%Y-%m-%d %H:%M"),
                entry.kind.as_str(),
                entry.summary
            );
        }
    }

    Ok(())
}
