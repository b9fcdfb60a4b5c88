use anyhow::Result;
use chrono::Utc;

use crate::cli::ExportArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use upkeep_core::evidence::{find_element, find_evidence};
use upkeep_core::export::{ExportFormat, export_evidence};
use upkeep_core::scoring::{ScoreMode, score_breakdown};
use upkeep_core::storage;
use upkeep_core::types::{
    DowntimeEvent, EquipmentUnit, MaintenanceRecord, MaintenanceSchedule, Receipt, WorkOrder,
};

pub fn run(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    let (cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let element = find_element(&args.element)?;
    let format = ExportFormat::parse(&args.format)?;

    let equipment: Vec<EquipmentUnit> = storage::read_collection(&paths.equipment)?;
    let schedules: Vec<MaintenanceSchedule> = storage::read_collection(&paths.schedules)?;
    let orders: Vec<WorkOrder> = storage::read_collection(&paths.work_orders)?;
    let records: Vec<MaintenanceRecord> = storage::read_collection(&paths.maintenance_records)?;
    let receipts: Vec<Receipt> = storage::read_collection(&paths.receipts)?;
    let downtime: Vec<DowntimeEvent> = storage::read_collection(&paths.downtime)?;

    let scope = args
        .equipment
        .as_deref()
        .map(|key| Ok::<_, anyhow::Error>(resolve_equipment(&paths, key)?.id.unwrap_or_default()))
        .transpose()?;

    let bundle = find_evidence(
        &element,
        &equipment,
        &schedules,
        &orders,
        &records,
        &receipts,
        &downtime,
        scope.as_deref(),
        Utc::now(),
    )?;
    let score = score_breakdown(&element, &bundle, &cfg.scoring, ScoreMode::Export);
    let rendered = export_evidence(&bundle, &score, format)?;

    // The rendered document goes to stdout as-is; --json would double-wrap
    // the JSON format, so it only changes the error path here.
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }

    Ok(())
}
