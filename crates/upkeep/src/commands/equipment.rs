use anyhow::{Result, bail};
use chrono::Utc;

use crate::cli::EquipmentArgs;
use crate::commands::common::*;
use crate::context::RuntimeContext;
use crate::output::*;
use upkeep_core::lock::with_file_lock;
use upkeep_core::storage;
use upkeep_core::types::{EquipmentStatus, EquipmentUnit};

pub fn run(ctx: &RuntimeContext, args: &EquipmentArgs) -> Result<()> {
    let (_cfg, paths) = open_tenant(ctx, &args.tenant)?;

    if args.add {
        return add_unit(ctx, args, &paths);
    }
    if args.set_hours.is_some() || args.set_status.is_some() {
        return update_unit(ctx, args, &paths);
    }
    list_units(ctx, &paths)
}

fn add_unit(
    ctx: &RuntimeContext,
    args: &EquipmentArgs,
    paths: &upkeep_core::config::TenantPaths,
) -> Result<()> {
    let (Some(code), Some(name), Some(category)) = (&args.code, &args.name, &args.category) else {
        bail!("--add requires --code, --name, and --category.");
    };

    let units: Vec<EquipmentUnit> = storage::read_collection(&paths.equipment)?;
    if units.iter().any(|u| u.code == *code) {
        if ctx.json {
            output_json_error("equipment", &format!("Equipment \"{code}\" already exists."));
            return Ok(());
        }
        bail!("Equipment \"{code}\" already exists.");
    }

    let mut unit = EquipmentUnit {
        id: None,
        code: code.clone(),
        name: name.clone(),
        category: category.clone(),
        current_usage_hours: args.set_hours,
        status: EquipmentStatus::Active,
        created_at: Utc::now(),
    };
    storage::append_row(&paths.equipment, &mut unit)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "equipment",
            "equipment": unit,
        }));
    } else {
        print_success(&format!(
            "Added equipment \"{}\" ({}).",
            unit.code,
            unit.id.as_deref().unwrap_or("?")
        ));
    }
    Ok(())
}

fn update_unit(
    ctx: &RuntimeContext,
    args: &EquipmentArgs,
    paths: &upkeep_core::config::TenantPaths,
) -> Result<()> {
    let Some(code) = &args.code else {
        bail!("--set-hours and --set-status need --code to pick the unit.");
    };
    let new_status = args
        .set_status
        .as_deref()
        .map(parse_equipment_status)
        .transpose()?;

    let updated = with_file_lock(&paths.equipment, || {
        let mut units: Vec<EquipmentUnit> = storage::read_collection(&paths.equipment)?;
        let idx = match units.iter().position(|u| u.code == *code) {
            Some(idx) => idx,
            None => storage::find_index_by_id(&units, code)?,
        };
        if let Some(hours) = args.set_hours {
            units[idx].current_usage_hours = Some(hours);
        }
        if let Some(status) = new_status {
            units[idx].status = status;
        }
        let updated = units[idx].clone();
        storage::write_collection(&paths.equipment, &mut units)?;
        Ok(updated)
    })?;

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "equipment",
            "equipment": updated,
        }));
    } else {
        print_success(&format!("Updated equipment \"{}\".", updated.code));
    }
    Ok(())
}

fn list_units(ctx: &RuntimeContext, paths: &upkeep_core::config::TenantPaths) -> Result<()> {
    let mut units: Vec<EquipmentUnit> = storage::read_collection(&paths.equipment)?;
    units.sort_by(|a, b| a.code.cmp(&b.code));

    if ctx.json {
        output_json(&serde_json::json!({
            "success": true,
            "command": "equipment",
            "equipment": units,
        }));
    } else if units.is_empty() {
        print_warning("No equipment registered.");
    } else {
        for unit in &units {
            let hours = unit
                .current_usage_hours
                .map(|h| format!("{h:.1}h"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{}  {}  {}  [{}]  {}",
                unit.id.as_deref().unwrap_or("?"),
                unit.code,
                unit.name,
                unit.status,
                hours
            );
        }
    }
    Ok(())
}
