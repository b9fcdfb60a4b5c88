use anyhow::Result;

use crate::cli::OrdersArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::storage;
use upkeep_core::types::WorkOrder;
use upkeep_core::workorder::{WorkOrderFilter, list_work_orders};

pub fn run(ctx: &RuntimeContext, args: &OrdersArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let orders: Vec<WorkOrder> = storage::read_collection(&paths.work_orders)?;

    let filter = WorkOrderFilter {
        statuses: args
            .status
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .iter()
            .map(|s| parse_order_status(s))
            .collect::<Result<Vec<_>>>()?,
        priorities: args
            .priority
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .iter()
            .map(|p| parse_priority(p))
            .collect::<Result<Vec<_>>>()?,
        assigned_to: args.assigned.clone(),
        due_before: args.due_before.as_deref().map(parse_timestamp).transpose()?,
        equipment_id: args
            .equipment
            .as_deref()
            .map(|key| Ok::<_, anyhow::Error>(resolve_equipment(&paths, key)?.id.unwrap_or_default()))
            .transpose()?,
        safety_concern_only: args.safety_only,
    };

    let (page, total) = list_work_orders(&orders, &filter, args.limit, args.offset);

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "orders",
            "total": total,
            "offset": args.offset,
            "orders": page,
        }));
    } else if page.is_empty() {
        print_warning("No work orders matched.");
    } else {
        for order in &page {
            let safety = if order.safety_concern { " [safety]" } else { "" };
            let due = order
                .due_at
                .map(|d| format!("  due {}", d.format("%Y-%m-%d")))
                .unwrap_or_default();
            println!(
                "{}  {:<11} {:<9} {}{safety}{due}",
                order.id.as_deref().unwrap_or("?"),
                order.status.to_string(),
                order.priority.to_string(),
                order.title
            );
        }
        println!("{} of {total} shown.", page.len());
    }

    Ok(())
}
