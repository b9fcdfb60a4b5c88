use anyhow::Result;
use chrono::Utc;

use crate::cli::TransitionArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::storage;
use upkeep_core::types::WorkOrder;
use upkeep_core::workorder::{CompletionDetails, apply_transition};

pub fn run(ctx: &RuntimeContext, args: &TransitionArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let target = parse_order_status(&args.target)?;

    // Read first to learn the current status; the store-level apply
    // re-checks it under the lock and rejects a concurrent advance.
    let orders: Vec<WorkOrder> = storage::read_collection(&paths.work_orders)?;
    let current = storage::find_by_id(&orders, &args.order)?;
    let expected = current.status;
    let order_id = current.id.clone().unwrap_or_else(|| args.order.clone());

    let completion = CompletionDetails {
        actual_labor_hours: args.labor_hours,
        actual_cost: args.cost,
        maintenance_record_id: args.record.clone(),
        resolution: args.resolution.clone(),
    };

    let updated = apply_transition(
        &paths.work_orders,
        &order_id,
        expected,
        target,
        Some(&completion),
        &ctx.actor,
        Utc::now(),
    )?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "transition",
            "order": updated,
        }));
    } else {
        print_success(&format!(
            "Work order {} moved {} -> {}.",
            updated.id.as_deref().unwrap_or("?"),
            expected,
            updated.status
        ));
    }

    Ok(())
}
