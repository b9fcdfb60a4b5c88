use anyhow::Result;
use chrono::{Duration, Utc};

use crate::cli::AvailabilityArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::downtime::availability;
use upkeep_core::storage;
use upkeep_core::types::DowntimeEvent;

pub fn run(ctx: &RuntimeContext, args: &AvailabilityArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let unit = resolve_equipment(&paths, &args.equipment)?;

    let now = Utc::now();
    let window_end = match &args.to {
        Some(value) => parse_timestamp(value)?,
        None => now,
    };
    let window_start = match &args.from {
        Some(value) => parse_timestamp(value)?,
        None => window_end - Duration::days(365),
    };

    let events: Vec<DowntimeEvent> = storage::read_collection(&paths.downtime)?;
    let stats = availability(
        &events,
        unit.id.as_deref().unwrap_or_default(),
        window_start,
        window_end,
        now,
    )?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "availability",
            "equipment": unit.code,
            "stats": stats,
        }));
    } else {
        println!(
            "Availability for {} ({} to {}):",
            unit.code,
            stats.window_start.format("%Y-%m-%d"),
            stats.window_end.format("%Y-%m-%d")
        );
        println!("  availability {:.1}%", stats.availability_pct);
        println!("  downtime     {:.1}h over {} events", stats.downtime_hours, stats.event_count);
        println!("  breakdowns   {}", stats.breakdown_count);
        println!("  mtbf         {:.1}h", stats.mtbf_hours);
    }

    Ok(())
}
