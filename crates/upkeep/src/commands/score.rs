use anyhow::{Result, bail};
use chrono::Utc;

use crate::cli::ScoreArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::evidence::{find_element, find_evidence};
use upkeep_core::scoring::{ScoreMode, ScoreReport, score_element};
use upkeep_core::storage;
use upkeep_core::types::{
    DowntimeEvent, EquipmentUnit, MaintenanceRecord, MaintenanceSchedule, Receipt, WorkOrder,
};

pub fn run(ctx: &RuntimeContext, args: &ScoreArgs) -> Result<()> {
    let (cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let element = find_element(&args.element)?;
    let mode = match args.mode.as_str() {
        "quick" => ScoreMode::Quick,
        "full" => ScoreMode::Full,
        "summary" => ScoreMode::Summary,
        "export" => ScoreMode::Export,
        other => bail!("Unknown score mode: {other}"),
    };

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
    let report = score_element(&element, &bundle, &cfg.scoring, mode);

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "score",
            "score": report,
        }));
    } else {
        match &report {
            ScoreReport::Scored(score) => {
                println!("{}: {:.1}", element.name, score.overall);
                for sub in &score.sub_scores {
                    let capped = if sub.capped { " (capped)" } else { "" };
                    println!(
                        "  {:<28} {:>5.1}  {} of {}{capped}",
                        sub.name, sub.score, sub.evidence_count, sub.required_count
                    );
                }
                for gap in &score.gaps {
                    print_warning(&format!(
                        "  gap: {} ({})",
                        gap.sub_requirement_id, gap.missing
                    ));
                }
            }
            ScoreReport::Counts(summary) => {
                print_evidence_counts(&element.name, summary);
            }
        }
    }

    Ok(())
}
