use anyhow::Result;
use chrono::Utc;

use crate::cli::EvidenceArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::evidence::{find_element, find_evidence};
use upkeep_core::scoring::evidence_summary;
use upkeep_core::storage;
use upkeep_core::types::{
    DowntimeEvent, EquipmentUnit, MaintenanceRecord, MaintenanceSchedule, Receipt, WorkOrder,
};

pub fn run(ctx: &RuntimeContext, args: &EvidenceArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let element = find_element(&args.element)?;

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
    let summary = evidence_summary(&bundle);

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "evidence",
            "summary": summary,
        }));
    } else {
        print_evidence_counts(&element.name, &summary);
    }

    Ok(())
}
