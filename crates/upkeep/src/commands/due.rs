use anyhow::Result;
use chrono::Utc;

use crate::cli::DueArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::schedule::{self, ScheduleFilter};
use upkeep_core::storage;
use upkeep_core::types::{EquipmentUnit, MaintenanceSchedule, WorkOrder};
use upkeep_core::workorder;

pub fn run(ctx: &RuntimeContext, args: &DueArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let as_of = match &args.as_of {
        Some(value) => parse_timestamp(value)?,
        None => Utc::now(),
    };

    let equipment: Vec<EquipmentUnit> = storage::read_collection(&paths.equipment)?;
    let schedules: Vec<MaintenanceSchedule> = storage::read_collection(&paths.schedules)?;

    let filter = ScheduleFilter {
        equipment_id: args
            .equipment
            .as_deref()
            .map(|key| Ok::<_, anyhow::Error>(resolve_equipment(&paths, key)?.id.unwrap_or_default()))
            .transpose()?,
        maintenance_types: args
            .maintenance_types
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .iter()
            .map(|t| parse_maintenance_type(t))
            .collect::<Result<Vec<_>>>()?,
        active_only: args.active_only,
        overdue_only: args.overdue_only,
        due_within_days: args.due_within,
    };

    let (rows, total) =
        schedule::list_schedules(&schedules, &equipment, &filter, as_of, args.limit, args.offset);

    // Overdue schedules each describe the order they call for; --spawn
    // applies those commands against the store.
    let mut spawned: Vec<WorkOrder> = Vec::new();
    if args.spawn {
        let orders: Vec<WorkOrder> = storage::read_collection(&paths.work_orders)?;
        for row in &rows {
            if let Some(input) = schedule::spawn_work_order(&row.schedule, &row.evaluation, &orders)
            {
                let mut order = workorder::create_work_order(input, &ctx.actor, as_of)?;
                storage::append_row(&paths.work_orders, &mut order)?;
                spawned.push(order);
            }
        }
    }

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "due",
            "as_of": as_of,
            "total": total,
            "offset": args.offset,
            "schedules": rows,
            "spawned": spawned,
        }));
    } else if rows.is_empty() {
        print_warning("No schedules matched.");
    } else {
        for row in &rows {
            let due = row
                .evaluation
                .next_due_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            let hours = row
                .evaluation
                .hours_remaining
                .map(|h| format!(" ({h:.0}h left)"))
                .unwrap_or_default();
            println!(
                "{:<8} {}  {}  due {due}{hours}",
                row.evaluation.status.to_string(),
                row.schedule.id.as_deref().unwrap_or("?"),
                row.schedule.name
            );
        }
        for order in &spawned {
            print_success(&format!(
                "Spawned work order \"{}\" ({}).",
                order.title,
                order.id.as_deref().unwrap_or("?")
            ));
        }
    }

    Ok(())
}
