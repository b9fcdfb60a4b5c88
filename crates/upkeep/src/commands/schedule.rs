use anyhow::Result;
use chrono::Utc;

use crate::cli::ScheduleArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::schedule::validate_schedule;
use upkeep_core::storage;
use upkeep_core::types::{CalendarInterval, FrequencyTrigger, MaintenanceSchedule};

pub fn run(ctx: &RuntimeContext, args: &ScheduleArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;
    let unit = resolve_equipment(&paths, &args.equipment)?;

    let trigger = FrequencyTrigger {
        calendar: args
            .every
            .map(|every| {
                Ok::<_, anyhow::Error>(CalendarInterval {
                    every,
                    unit: parse_interval_unit(&args.unit)?,
                })
            })
            .transpose()?,
        usage_hours: args.every_hours,
    };

    let mut schedule = MaintenanceSchedule {
        id: None,
        equipment_id: unit.id.clone().unwrap_or_default(),
        name: args.name.clone(),
        maintenance_type: parse_maintenance_type(&args.maintenance_type)?,
        trigger,
        warning_days: args.warning_days,
        warning_hours: args.warning_hours,
        checklist: args.checklist.as_deref().map(split_list).unwrap_or_default(),
        required_parts: args.parts.as_deref().map(split_list).unwrap_or_default(),
        required_certifications: args
            .certifications
            .as_deref()
            .map(split_list)
            .unwrap_or_default(),
        assigned_to: args.assigned.clone(),
        active: true,
        is_regulatory_requirement: args.regulatory,
        created_at: Utc::now(),
        last_completed_at: None,
        last_completed_usage_hours: None,
        created_by: ctx.actor.name.clone(),
    };
    validate_schedule(&schedule)?;
    storage::append_row(&paths.schedules, &mut schedule)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "schedule",
            "schedule": schedule,
        }));
    } else {
        print_success(&format!(
            "Created schedule \"{}\" ({}) for {}.",
            schedule.name,
            schedule.id.as_deref().unwrap_or("?"),
            unit.code
        ));
    }

    Ok(())
}
