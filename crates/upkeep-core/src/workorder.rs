use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpkeepError};
use crate::lock::with_file_lock;
use crate::storage::{self, StoredRecord};
use crate::types::{
    Actor, MaintenanceType, Priority, WorkOrder, WorkOrderNote, WorkOrderStatus,
};

// ── Creation ───────────────────────────────────────────────────────────────

/// Everything a caller (or the schedule engine) supplies to open an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderInput {
    pub equipment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    pub title: String,
    pub maintenance_type: MaintenanceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub safety_concern: bool,
    #[serde(default)]
    pub approval_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_labor_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

pub fn create_work_order(
    input: WorkOrderInput,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<WorkOrder> {
    if input.title.trim().is_empty() {
        return Err(UpkeepError::Validation(
            "work order title must not be empty".to_string(),
        ));
    }
    if input.equipment_id.trim().is_empty() {
        return Err(UpkeepError::Validation(
            "work order needs an equipment reference".to_string(),
        ));
    }
    Ok(WorkOrder {
        id: None,
        equipment_id: input.equipment_id,
        schedule_id: input.schedule_id,
        title: input.title,
        maintenance_type: input.maintenance_type,
        priority: input.priority.unwrap_or(Priority::Medium),
        safety_concern: input.safety_concern,
        approval_required: input.approval_required,
        approved: false,
        status: WorkOrderStatus::Requested,
        requested_at: now,
        scheduled_for: None,
        due_at: input.due_at,
        completed_at: None,
        assigned_to: input.assigned_to,
        estimated_labor_hours: input.estimated_labor_hours,
        actual_labor_hours: None,
        estimated_cost: input.estimated_cost,
        actual_cost: None,
        maintenance_record_id: None,
        problem: input.problem,
        resolution: None,
        notes: Vec::new(),
        requested_by: actor.name.clone(),
    })
}

// ── State machine ──────────────────────────────────────────────────────────

/// Fields supplied alongside a transition to `completed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_labor_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

fn invalid(order: &WorkOrder, target: WorkOrderStatus, reason: &str) -> UpkeepError {
    UpkeepError::InvalidTransition {
        from: order.status.to_string(),
        to: target.to_string(),
        reason: reason.to_string(),
    }
}

/// Apply one edge of the lifecycle graph, returning the updated order.
///
/// Legal edges: requested→approved, requested→scheduled (only without an
/// approval requirement), approved→scheduled, scheduled→in_progress,
/// in_progress→completed, completed→closed, and any non-terminal state
/// →cancelled. Everything else is `InvalidTransition`.
pub fn transition(
    order: &WorkOrder,
    target: WorkOrderStatus,
    completion: Option<&CompletionDetails>,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<WorkOrder> {
    use WorkOrderStatus::*;

    let mut updated = order.clone();

    match (order.status, target) {
        (Requested, Approved) => {
            updated.approved = true;
        }
        (Requested, Scheduled) => {
            if order.approval_required && !order.approved {
                return Err(invalid(
                    order,
                    target,
                    "approval is required before scheduling",
                ));
            }
            updated.scheduled_for = Some(now);
        }
        (Approved, Scheduled) => {
            updated.scheduled_for = Some(now);
        }
        (Scheduled, InProgress) => {}
        (InProgress, Completed) => {
            if let Some(details) = completion {
                updated.actual_labor_hours =
                    details.actual_labor_hours.or(updated.actual_labor_hours);
                updated.actual_cost = details.actual_cost.or(updated.actual_cost);
                updated.maintenance_record_id = details
                    .maintenance_record_id
                    .clone()
                    .or(updated.maintenance_record_id);
                updated.resolution = details.resolution.clone().or(updated.resolution);
            }
            if updated.actual_labor_hours.is_none() && updated.maintenance_record_id.is_none() {
                return Err(invalid(
                    order,
                    target,
                    "completion requires actual labor hours or a linked maintenance record",
                ));
            }
            updated.completed_at = Some(now);
        }
        (Completed, Closed) => {}
        (from, Cancelled) if !from.is_terminal() => {}
        (_, _) => {
            return Err(invalid(order, target, "edge not in the lifecycle graph"));
        }
    }

    updated.status = target;
    updated.notes.push(WorkOrderNote {
        at: now,
        author: actor.name.clone(),
        text: format!("{} -> {}", order.status, target),
    });
    Ok(updated)
}

/// Append a note. The only mutation allowed on a closed or cancelled order.
pub fn append_note(order: &mut WorkOrder, text: &str, actor: &Actor, now: DateTime<Utc>) {
    order.notes.push(WorkOrderNote {
        at: now,
        author: actor.name.clone(),
        text: text.to_string(),
    });
}

// ── Store-level apply (optimistic concurrency) ─────────────────────────────

/// Transition an order inside the collection file, holding the advisory
/// lock for the read-modify-write. `expected` is the status the caller
/// validated against; if the row has moved since, the write is rejected
/// with `ConcurrentModification` instead of silently double-advancing.
pub fn apply_transition(
    path: &Path,
    order_id: &str,
    expected: WorkOrderStatus,
    target: WorkOrderStatus,
    completion: Option<&CompletionDetails>,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<WorkOrder> {
    with_file_lock(path, || {
        let mut orders: Vec<WorkOrder> = storage::read_collection(path)?;
        let idx = storage::find_index_by_id(&orders, order_id)?;
        let current = &orders[idx];
        if current.status != expected {
            return Err(UpkeepError::ConcurrentModification {
                kind: WorkOrder::KIND,
                id: current.id().unwrap_or(order_id).to_string(),
                expected: expected.to_string(),
                actual: current.status.to_string(),
            });
        }
        let updated = transition(current, target, completion, actor, now)?;
        orders[idx] = updated.clone();
        storage::write_collection(path, &mut orders)?;
        Ok(updated)
    })
}

// ── Listing ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct WorkOrderFilter {
    /// Empty means all statuses.
    pub statuses: Vec<WorkOrderStatus>,
    /// Empty means all priorities.
    pub priorities: Vec<Priority>,
    pub assigned_to: Option<String>,
    pub due_before: Option<DateTime<Utc>>,
    pub equipment_id: Option<String>,
    pub safety_concern_only: bool,
}

fn order_sort_key(order: &WorkOrder) -> (bool, u8, DateTime<Utc>) {
    // Safety concerns surface ahead of equal priority; earliest due breaks ties.
    (
        !order.safety_concern,
        order.priority.rank(),
        order.due_at.unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
}

/// Filter, order, and page work orders. Returns the page plus the total
/// match count for caller-side pagination.
pub fn list_work_orders(
    orders: &[WorkOrder],
    filter: &WorkOrderFilter,
    limit: Option<usize>,
    offset: usize,
) -> (Vec<WorkOrder>, usize) {
    let mut matched: Vec<WorkOrder> = orders
        .iter()
        .filter(|o| filter.statuses.is_empty() || filter.statuses.contains(&o.status))
        .filter(|o| filter.priorities.is_empty() || filter.priorities.contains(&o.priority))
        .filter(|o| {
            filter
                .assigned_to
                .as_ref()
                .is_none_or(|a| o.assigned_to.as_ref() == Some(a))
        })
        .filter(|o| {
            filter
                .due_before
                .is_none_or(|cutoff| o.due_at.is_some_and(|due| due < cutoff))
        })
        .filter(|o| {
            filter
                .equipment_id
                .as_ref()
                .is_none_or(|id| o.equipment_id == *id)
        })
        .filter(|o| !filter.safety_concern_only || o.safety_concern)
        .cloned()
        .collect();

    matched.sort_by_key(order_sort_key);
    let total = matched.len();
    let page: Vec<WorkOrder> = matched
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    (page, total)
}
