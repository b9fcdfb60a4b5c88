use anyhow::Result;
use chrono::{Duration, Utc};

use crate::cli::CostsArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::cost::cost_summary;
use upkeep_core::storage;
use upkeep_core::types::{MaintenanceRecord, Receipt, WorkOrder};

pub fn run(ctx: &RuntimeContext, args: &CostsArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let unit = resolve_equipment(&paths, &args.equipment)?;

    let window_end = match &args.to {
        Some(value) => parse_timestamp(value)?,
        None => Utc::now(),
    };
    let window_start = match &args.from {
        Some(value) => parse_timestamp(value)?,
        None => window_end - Duration::days(365),
    };

    let orders: Vec<WorkOrder> = storage::read_collection(&paths.work_orders)?;
    let records: Vec<MaintenanceRecord> = storage::read_collection(&paths.maintenance_records)?;
    let receipts: Vec<Receipt> = storage::read_collection(&paths.receipts)?;

    let summary = cost_summary(
        &orders,
        &records,
        &receipts,
        unit.id.as_deref().unwrap_or_default(),
        window_start,
        window_end,
    );

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "costs",
            "equipment": unit.code,
            "summary": summary,
        }));
    } else {
        println!("Costs for {} ({} to {}):", unit.code,
            summary.window_start.format("%Y-%m-%d"),
            summary.window_end.format("%Y-%m-%d"));
        println!("  total     {:.2}", summary.total);
        println!("  estimated {:.2}", summary.estimated_total);
        println!("  labor     {:.2}", summary.by_category.labor);
        println!("  parts     {:.2}", summary.by_category.parts);
        println!("  external  {:.2}", summary.by_category.external);
        for bucket in &summary.trend {
            println!("  {}  {:.2}", bucket.month, bucket.total);
        }
    }

    Ok(())
}
