use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

use upkeep_core::config::{self, TenantPaths};
use upkeep_core::storage;
use upkeep_core::types::*;

use crate::context::RuntimeContext;

/// Shared per-command preamble: directory check, config, tenant check,
/// resolved collection paths.
pub fn open_tenant(ctx: &RuntimeContext, tenant: &str) -> Result<(UpkeepConfig, TenantPaths)> {
    config::ensure_upkeep_dir(&ctx.cwd)?;
    let cfg = config::read_config(&ctx.cwd)?;
    config::ensure_tenant(&cfg, tenant)?;
    let paths = TenantPaths::resolve(tenant, &ctx.cwd)?;
    Ok((cfg, paths))
}

/// Look a unit up by its code first, then by ID prefix.
pub fn resolve_equipment(paths: &TenantPaths, key: &str) -> Result<EquipmentUnit> {
    let units: Vec<EquipmentUnit> = storage::read_collection(&paths.equipment)?;
    if let Some(unit) = units.iter().find(|u| u.code == key) {
        return Ok(unit.clone());
    }
    Ok(storage::find_by_id(&units, key)?.clone())
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => bail!("Invalid timestamp \"{value}\": {e}"),
    }
}

pub fn parse_maintenance_type(value: &str) -> Result<MaintenanceType> {
    Ok(match value {
        "preventive" => MaintenanceType::Preventive,
        "inspection" => MaintenanceType::Inspection,
        "certification" => MaintenanceType::Certification,
        "other" => MaintenanceType::Other,
        other => bail!("Unknown maintenance type: {other}"),
    })
}

pub fn parse_priority(value: &str) -> Result<Priority> {
    Ok(match value {
        "low" => Priority::Low,
        "medium" => Priority::Medium,
        "high" => Priority::High,
        "emergency" => Priority::Emergency,
        other => bail!("Unknown priority: {other}"),
    })
}

pub fn parse_order_status(value: &str) -> Result<WorkOrderStatus> {
    Ok(match value {
        "requested" => WorkOrderStatus::Requested,
        "approved" => WorkOrderStatus::Approved,
        "scheduled" => WorkOrderStatus::Scheduled,
        "in_progress" => WorkOrderStatus::InProgress,
        "completed" => WorkOrderStatus::Completed,
        "closed" => WorkOrderStatus::Closed,
        "cancelled" => WorkOrderStatus::Cancelled,
        other => bail!("Unknown work order status: {other}"),
    })
}

pub fn parse_equipment_status(value: &str) -> Result<EquipmentStatus> {
    Ok(match value {
        "active" => EquipmentStatus::Active,
        "retired" => EquipmentStatus::Retired,
        "out_of_service" => EquipmentStatus::OutOfService,
        other => bail!("Unknown equipment status: {other}"),
    })
}

pub fn parse_downtime_reason(value: &str) -> Result<DowntimeReason> {
    Ok(match value {
        "breakdown" => DowntimeReason::Breakdown,
        "scheduled_maintenance" => DowntimeReason::ScheduledMaintenance,
        "inspection" => DowntimeReason::Inspection,
        "other" => DowntimeReason::Other,
        other => bail!("Unknown downtime reason: {other}"),
    })
}

pub fn parse_cost_category(value: &str) -> Result<CostCategory> {
    Ok(match value {
        "labor" => CostCategory::Labor,
        "parts" => CostCategory::Parts,
        "external" => CostCategory::External,
        other => bail!("Unknown cost category: {other}"),
    })
}

pub fn parse_interval_unit(value: &str) -> Result<IntervalUnit> {
    Ok(match value {
        "days" => IntervalUnit::Days,
        "weeks" => IntervalUnit::Weeks,
        "months" => IntervalUnit::Months,
        "years" => IntervalUnit::Years,
        other => bail!("Unknown interval unit: {other}"),
    })
}

/// Split a comma-separated flag value, dropping empty segments.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
