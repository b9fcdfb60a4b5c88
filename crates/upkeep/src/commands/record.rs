use anyhow::Result;
use chrono::Utc;

use crate::cli::RecordArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::id::generate_id;
use upkeep_core::lock::with_file_lock;
use upkeep_core::schedule::mark_completed;
use upkeep_core::storage::{self, StoredRecord};
use upkeep_core::types::{MaintenanceRecord, MaintenanceSchedule, WorkOrder, WorkOrderStatus};
use upkeep_core::workorder::{CompletionDetails, apply_transition};

pub fn run(ctx: &RuntimeContext, args: &RecordArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let unit = resolve_equipment(&paths, &args.equipment)?;
    let performed_at = match &args.date {
        Some(value) => parse_timestamp(value)?,
        None => Utc::now(),
    };

    // Resolve the order up front so the record stores its full ID.
    let order_id = args
        .order
        .as_deref()
        .map(|key| {
            let orders: Vec<WorkOrder> = storage::read_collection(&paths.work_orders)?;
            let current = storage::find_by_id(&orders, key)?;
            Ok::<_, anyhow::Error>((current.id.clone().unwrap_or_else(|| key.to_string()), current.status))
        })
        .transpose()?;

    // The record id is deterministic, so it can be handed to the order
    // transition before the row is written.
    let mut record = MaintenanceRecord {
        id: None,
        equipment_id: unit.id.clone().unwrap_or_default(),
        work_order_id: order_id.as_ref().map(|(id, _)| id.clone()),
        record_type: parse_maintenance_type(&args.record_type)?,
        performed_at,
        work_performed: args.description.clone(),
        is_certification_record: args.certification,
        labor_cost: args.labor_cost,
        parts_cost: args.parts_cost,
        usage_hours_at_service: args.usage_hours,
        performed_by: ctx.actor.name.clone(),
    };
    record.set_id(generate_id(
        MaintenanceRecord::ID_PREFIX,
        &record.id_key(),
    ));
    let record_id = record.id.clone().unwrap_or_default();

    // Linking an order completes it with this record as proof of work.
    // The transition runs first: a rejected edge must not leave behind a
    // record pointing at an order that never completed.
    let mut completed_order = None;
    if let Some((order_id, status)) = &order_id {
        let completion = CompletionDetails {
            maintenance_record_id: Some(record_id.clone()),
            ..Default::default()
        };
        let updated = apply_transition(
            &paths.work_orders,
            order_id,
            *status,
            WorkOrderStatus::Completed,
            Some(&completion),
            &ctx.actor,
            performed_at,
        )?;
        completed_order = Some(updated);
    }
    storage::append_row(&paths.maintenance_records, &mut record)?;

    // Folding into a schedule resets its due cycle from this completion.
    if let Some(schedule_key) = &args.schedule {
        with_file_lock(&paths.schedules, || {
            let mut schedules: Vec<MaintenanceSchedule> =
                storage::read_collection(&paths.schedules)?;
            let idx = storage::find_index_by_id(&schedules, schedule_key)?;
            mark_completed(&mut schedules[idx], performed_at, args.usage_hours);
            storage::write_collection(&paths.schedules, &mut schedules)?;
            Ok(())
        })?;
    }

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "record",
            "record": record,
            "completed_order": completed_order,
        }));
    } else {
        print_success(&format!(
            "Logged maintenance record {record_id} for {}.",
            unit.code
        ));
        if let Some(order) = &completed_order {
            print_success(&format!(
                "Completed work order {}.",
                order.id.as_deref().unwrap_or("?")
            ));
        }
    }

    Ok(())
}
