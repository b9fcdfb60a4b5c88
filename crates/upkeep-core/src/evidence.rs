use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cost::{self, CostSummary};
use crate::downtime::{self, AvailabilityStats};
use crate::error::{Result, UpkeepError};
use crate::schedule::{self, DueStatus};
use crate::types::{
    DowntimeEvent, EquipmentStatus, EquipmentUnit, MaintenanceRecord, MaintenanceSchedule,
    MaintenanceType, Receipt, WorkOrder, WorkOrderStatus,
};

// ── Element catalog ────────────────────────────────────────────────────────

/// Declarative matcher assigning evidence to a sub-requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum EvidenceRule {
    /// Maintenance records of the given type.
    RecordOfType { record_type: MaintenanceType },
    /// Maintenance records flagged as satisfying a certification.
    CertificationRecord,
    /// Completed or closed work orders of the given type.
    CompletedWorkOrder { maintenance_type: MaintenanceType },
    /// Active schedules flagged as a regulatory requirement.
    RegulatorySchedule,
}

impl EvidenceRule {
    /// Human label used in gap annotations.
    pub fn describe(&self) -> String {
        match self {
            Self::RecordOfType { record_type } => {
                format!("{record_type} maintenance records")
            }
            Self::CertificationRecord => "certification records".to_string(),
            Self::CompletedWorkOrder { maintenance_type } => {
                format!("completed {maintenance_type} work orders")
            }
            Self::RegulatorySchedule => "active regulatory maintenance schedules".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubRequirement {
    pub id: String,
    pub name: String,
    /// Evidence items needed for a full score.
    pub required_count: usize,
    pub rule: EvidenceRule,
}

/// One numbered category of a regulatory safety-management audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub name: String,
    pub sub_requirements: Vec<SubRequirement>,
}

fn sub(id: &str, name: &str, required_count: usize, rule: EvidenceRule) -> SubRequirement {
    SubRequirement {
        id: id.to_string(),
        name: name.to_string(),
        required_count,
        rule,
    }
}

/// Built-in audit elements. The preventive-maintenance element is the one
/// the engine was built around; the catalog shape leaves room for more.
pub fn element_catalog() -> Vec<Element> {
    vec![Element {
        id: "preventive-maintenance".to_string(),
        name: "Preventive Maintenance Program".to_string(),
        sub_requirements: vec![
            sub(
                "pm-records",
                "Preventive maintenance performed",
                2,
                EvidenceRule::RecordOfType {
                    record_type: MaintenanceType::Preventive,
                },
            ),
            sub(
                "inspection-records",
                "Equipment inspections performed",
                2,
                EvidenceRule::RecordOfType {
                    record_type: MaintenanceType::Inspection,
                },
            ),
            sub(
                "certifications",
                "Certification requirements satisfied",
                1,
                EvidenceRule::CertificationRecord,
            ),
            sub(
                "pm-work-orders",
                "Preventive work orders completed",
                1,
                EvidenceRule::CompletedWorkOrder {
                    maintenance_type: MaintenanceType::Preventive,
                },
            ),
            sub(
                "regulatory-schedules",
                "Regulatory schedules in place and current",
                1,
                EvidenceRule::RegulatorySchedule,
            ),
        ],
    }]
}

pub fn find_element(element_id: &str) -> Result<Element> {
    element_catalog()
        .into_iter()
        .find(|e| e.id == element_id)
        .ok_or_else(|| UpkeepError::NotFound {
            kind: "audit element",
            id: element_id.to_string(),
        })
}

// ── Evidence bundle ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Record,
    WorkOrder,
    Schedule,
}

impl EvidenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::WorkOrder => "work_order",
            Self::Schedule => "schedule",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceItem {
    pub kind: EvidenceKind,
    pub id: String,
    pub equipment_id: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    /// Due status at evaluation time; only set for schedule evidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_status: Option<DueStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceBucket {
    pub sub_requirement: SubRequirement,
    /// Newest-first, so the leading items are stable "latest evidence".
    pub items: Vec<EvidenceItem>,
    /// True when at least one matched schedule is not overdue. Drives the
    /// overdue-regulatory score cap; meaningless for non-schedule rules.
    pub has_current_schedule: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentAvailability {
    pub equipment_id: String,
    #[serde(flatten)]
    pub stats: AvailabilityStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentCost {
    pub equipment_id: String,
    #[serde(flatten)]
    pub summary: CostSummary,
}

/// Derived aggregate for one tenant/equipment scope. Regenerated on each
/// scoring request; never stored as source of truth.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceBundle {
    pub element_id: String,
    pub generated_at: DateTime<Utc>,
    pub equipment_ids: Vec<String>,
    pub buckets: Vec<EvidenceBucket>,
    /// Items matching no sub-requirement, retained for export transparency.
    pub unclassified: Vec<EvidenceItem>,
    pub availability: Vec<EquipmentAvailability>,
    pub costs: Vec<EquipmentCost>,
}

fn record_item(record: &MaintenanceRecord) -> EvidenceItem {
    EvidenceItem {
        kind: EvidenceKind::Record,
        id: record.id.clone().unwrap_or_default(),
        equipment_id: record.equipment_id.clone(),
        date: record.performed_at,
        summary: record.work_performed.clone(),
        due_status: None,
    }
}

fn order_item(order: &WorkOrder) -> EvidenceItem {
    EvidenceItem {
        kind: EvidenceKind::WorkOrder,
        id: order.id.clone().unwrap_or_default(),
        equipment_id: order.equipment_id.clone(),
        date: order.completed_at.unwrap_or(order.requested_at),
        summary: order.title.clone(),
        due_status: None,
    }
}

fn schedule_item(schedule: &MaintenanceSchedule, status: DueStatus) -> EvidenceItem {
    EvidenceItem {
        kind: EvidenceKind::Schedule,
        id: schedule.id.clone().unwrap_or_default(),
        equipment_id: schedule.equipment_id.clone(),
        date: schedule.last_completed_at.unwrap_or(schedule.created_at),
        summary: schedule.name.clone(),
        due_status: Some(status),
    }
}

fn rule_matches_record(rule: EvidenceRule, record: &MaintenanceRecord) -> bool {
    match rule {
        EvidenceRule::RecordOfType { record_type } => record.record_type == record_type,
        EvidenceRule::CertificationRecord => record.is_certification_record,
        _ => false,
    }
}

fn rule_matches_order(rule: EvidenceRule, order: &WorkOrder) -> bool {
    match rule {
        EvidenceRule::CompletedWorkOrder { maintenance_type } => {
            order.maintenance_type == maintenance_type
                && matches!(
                    order.status,
                    WorkOrderStatus::Completed | WorkOrderStatus::Closed
                )
        }
        _ => false,
    }
}

/// Reporting window for the bundled availability/cost statistics.
const STATS_WINDOW_DAYS: i64 = 365;

/// Scan a tenant's data and assemble the evidence bundle for one element.
///
/// Only active equipment is considered; `equipment_scope` narrows to one
/// unit. Items matching no sub-requirement land in the unclassified bucket
/// rather than being dropped. Empty buckets are the expected state for a
/// newly onboarded tenant, not an error.
#[allow(clippy::too_many_arguments)]
pub fn find_evidence(
    element: &Element,
    equipment: &[EquipmentUnit],
    schedules: &[MaintenanceSchedule],
    orders: &[WorkOrder],
    records: &[MaintenanceRecord],
    receipts: &[Receipt],
    downtime_events: &[DowntimeEvent],
    equipment_scope: Option<&str>,
    as_of: DateTime<Utc>,
) -> Result<EvidenceBundle> {
    let scoped: Vec<&EquipmentUnit> = equipment
        .iter()
        .filter(|e| e.status == EquipmentStatus::Active)
        .filter(|e| equipment_scope.is_none_or(|id| e.id.as_deref() == Some(id)))
        .collect();
    let equipment_ids: Vec<String> = scoped.iter().filter_map(|e| e.id.clone()).collect();
    let in_scope = |id: &str| equipment_ids.iter().any(|e| e == id);

    let mut buckets: Vec<EvidenceBucket> = element
        .sub_requirements
        .iter()
        .map(|s| EvidenceBucket {
            sub_requirement: s.clone(),
            items: Vec::new(),
            has_current_schedule: false,
        })
        .collect();
    let mut unclassified: Vec<EvidenceItem> = Vec::new();

    for record in records.iter().filter(|r| in_scope(&r.equipment_id)) {
        match buckets
            .iter_mut()
            .find(|b| rule_matches_record(b.sub_requirement.rule, record))
        {
            Some(bucket) => bucket.items.push(record_item(record)),
            None => unclassified.push(record_item(record)),
        }
    }

    // Only completed/closed orders count as evidence at all; open work is
    // intent, not proof.
    for order in orders.iter().filter(|o| {
        in_scope(&o.equipment_id)
            && matches!(
                o.status,
                WorkOrderStatus::Completed | WorkOrderStatus::Closed
            )
    }) {
        match buckets
            .iter_mut()
            .find(|b| rule_matches_order(b.sub_requirement.rule, order))
        {
            Some(bucket) => bucket.items.push(order_item(order)),
            None => unclassified.push(order_item(order)),
        }
    }

    for sched in schedules
        .iter()
        .filter(|s| s.active && in_scope(&s.equipment_id))
    {
        let reading = scoped
            .iter()
            .find(|e| e.id.as_deref() == Some(sched.equipment_id.as_str()))
            .and_then(|e| e.current_usage_hours);
        let status = schedule::evaluate(sched, as_of, reading).status;
        if sched.is_regulatory_requirement {
            if let Some(bucket) = buckets
                .iter_mut()
                .find(|b| b.sub_requirement.rule == EvidenceRule::RegulatorySchedule)
            {
                bucket.items.push(schedule_item(sched, status));
                if status != DueStatus::Overdue {
                    bucket.has_current_schedule = true;
                }
                continue;
            }
        }
        unclassified.push(schedule_item(sched, status));
    }

    for bucket in buckets.iter_mut() {
        bucket.items.sort_by(|a, b| b.date.cmp(&a.date));
    }
    unclassified.sort_by(|a, b| b.date.cmp(&a.date));

    let window_start = as_of - Duration::days(STATS_WINDOW_DAYS);
    let mut availability = Vec::new();
    let mut costs = Vec::new();
    for id in &equipment_ids {
        availability.push(EquipmentAvailability {
            equipment_id: id.clone(),
            stats: downtime::availability(downtime_events, id, window_start, as_of, as_of)?,
        });
        costs.push(EquipmentCost {
            equipment_id: id.clone(),
            summary: cost::cost_summary(orders, records, receipts, id, window_start, as_of),
        });
    }

    Ok(EvidenceBundle {
        element_id: element.id.clone(),
        generated_at: as_of,
        equipment_ids,
        buckets,
        unclassified,
        availability,
        costs,
    })
}
