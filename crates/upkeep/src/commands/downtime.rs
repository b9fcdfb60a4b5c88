use anyhow::Result;
use chrono::Utc;

use crate::cli::DowntimeArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::downtime::{apply_end_downtime, list_downtime, start_downtime};
use upkeep_core::storage;
use upkeep_core::types::DowntimeEvent;

pub fn run(ctx: &RuntimeContext, args: &DowntimeArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;

    if let Some(equipment_key) = &args.start {
        let unit = resolve_equipment(&paths, equipment_key)?;
        let mut event = start_downtime(
            unit.id.as_deref().unwrap_or_default(),
            parse_downtime_reason(&args.reason)?,
            args.detail.clone(),
            Utc::now(),
        );
        storage::append_row(&paths.downtime, &mut event)?;

        if ctx.json {
            output_json(&serde_json::json!({
                "success": true,
                "command": "downtime",
                "event": event,
            }));
        } else {
            print_success(&format!(
                "Started downtime {} on {}.",
                event.id.as_deref().unwrap_or("?"),
                unit.code
            ));
        }
        return Ok(());
    }

    if let Some(event_id) = &args.end {
        let event = apply_end_downtime(&paths.downtime, event_id, Utc::now())?;

        if ctx.json {
            output_json(&serde_json::json!({
                "success": true,
                "command": "downtime",
                "event": event,
            }));
        } else {
            print_success(&format!(
                "Ended downtime {} after {:.1}h.",
                event.id.as_deref().unwrap_or("?"),
                event.duration_hours().unwrap_or(0.0)
            ));
        }
        return Ok(());
    }

    let events: Vec<DowntimeEvent> = storage::read_collection(&paths.downtime)?;
    let equipment_id = args
        .equipment
        .as_deref()
        .map(|key| Ok::<_, anyhow::Error>(resolve_equipment(&paths, key)?.id.unwrap_or_default()))
        .transpose()?;
    let rows = list_downtime(&events, equipment_id.as_deref(), args.include_open);
    let total = rows.len();
    let page: Vec<DowntimeEvent> = rows
        .into_iter()
        .skip(args.offset)
        .take(args.limit.unwrap_or(usize::MAX))
        .collect();

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "downtime",
            "total": total,
            "offset": args.offset,
            "events": page,
        }));
    } else if page.is_empty() {
        print_warning("No downtime events matched.");
    } else {
        for event in &page {
            let duration = event
                .duration_hours()
                .map(|h| format!("{h:.1}h"))
                .unwrap_or_else(|| "open".to_string());
            println!(
                "{}  {}  {}  {}",
                event.id.as_deref().unwrap_or("?"),
                event.started_at.format("%Y-%m-%d %H:%M"),
                event.reason,
                duration
            );
        }
    }

    Ok(())
}
