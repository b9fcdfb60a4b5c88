use anyhow::Result;
use chrono::Utc;

use crate::cli::OrderArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::storage;
use upkeep_core::workorder::{self, WorkOrderInput};

pub fn run(ctx: &RuntimeContext, args: &OrderArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let unit = resolve_equipment(&paths, &args.equipment)?;

    let input = WorkOrderInput {
        equipment_id: unit.id.clone().unwrap_or_default(),
        schedule_id: args.schedule.clone(),
        title: args.title.clone(),
        maintenance_type: parse_maintenance_type(&args.maintenance_type)?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        safety_concern: args.safety,
        approval_required: args.approval_required,
        due_at: args.due.as_deref().map(parse_timestamp).transpose()?,
        assigned_to: args.assigned.clone(),
        estimated_labor_hours: args.est_hours,
        estimated_cost: args.est_cost,
        problem: args.problem.clone(),
    };

    let mut order = workorder::create_work_order(input, &ctx.actor, Utc::now())?;
    storage::append_row(&paths.work_orders, &mut order)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "order",
            "order": order,
        }));
    } else {
        print_success(&format!(
            "Created work order \"{}\" ({}) for {}.",
            order.title,
            order.id.as_deref().unwrap_or("?"),
            unit.code
        ));
    }

    Ok(())
}
