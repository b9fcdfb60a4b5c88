use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{
    DowntimeEvent, MaintenanceRecord, MaintenanceSchedule, Receipt, WorkOrder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    ScheduleCreated,
    WorkOrderRequested,
    WorkOrderCompleted,
    MaintenancePerformed,
    DowntimeStarted,
    DowntimeEnded,
    ReceiptLogged,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScheduleCreated => "schedule_created",
            Self::WorkOrderRequested => "work_order_requested",
            Self::WorkOrderCompleted => "work_order_completed",
            Self::MaintenancePerformed => "maintenance_performed",
            Self::DowntimeStarted => "downtime_started",
            Self::DowntimeEnded => "downtime_ended",
            Self::ReceiptLogged => "receipt_logged",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub kind: HistoryKind,
    pub reference_id: String,
    pub summary: String,
}

fn entry(at: DateTime<Utc>, kind: HistoryKind, id: &Option<String>, summary: String) -> HistoryEntry {
    HistoryEntry {
        at,
        kind,
        reference_id: id.clone().unwrap_or_default(),
        summary,
    }
}

/// One equipment unit's full story, chronologically merged across records,
/// receipts, work orders, downtime, and schedules. Oldest first.
pub fn history(
    equipment_id: &str,
    schedules: &[MaintenanceSchedule],
    orders: &[WorkOrder],
    records: &[MaintenanceRecord],
    receipts: &[Receipt],
    downtime: &[DowntimeEvent],
) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = Vec::new();

    for s in schedules.iter().filter(|s| s.equipment_id == equipment_id) {
        entries.push(entry(
            s.created_at,
            HistoryKind::ScheduleCreated,
            &s.id,
            format!("schedule \"{}\" created", s.name),
        ));
    }

    for o in orders.iter().filter(|o| o.equipment_id == equipment_id) {
        entries.push(entry(
            o.requested_at,
            HistoryKind::WorkOrderRequested,
            &o.id,
            format!("work order \"{}\" requested ({})", o.title, o.priority),
        ));
        if let Some(completed_at) = o.completed_at {
            entries.push(entry(
                completed_at,
                HistoryKind::WorkOrderCompleted,
                &o.id,
                format!("work order \"{}\" completed", o.title),
            ));
        }
    }

    for r in records.iter().filter(|r| r.equipment_id == equipment_id) {
        entries.push(entry(
            r.performed_at,
            HistoryKind::MaintenancePerformed,
            &r.id,
            format!("{}: {}", r.record_type, r.work_performed),
        ));
    }

    for r in receipts.iter().filter(|r| r.equipment_id == equipment_id) {
        entries.push(entry(
            r.date,
            HistoryKind::ReceiptLogged,
            &r.id,
            format!("{} receipt from {} ({:.2})", r.category, r.vendor, r.amount),
        ));
    }

    for d in downtime.iter().filter(|d| d.equipment_id == equipment_id) {
        entries.push(entry(
            d.started_at,
            HistoryKind::DowntimeStarted,
            &d.id,
            format!("downtime started ({})", d.reason),
        ));
        if let Some(ended_at) = d.ended_at {
            entries.push(entry(
                ended_at,
                HistoryKind::DowntimeEnded,
                &d.id,
                format!(
                    "downtime ended after {:.1}h",
                    d.duration_hours().unwrap_or(0.0)
                ),
            ));
        }
    }

    entries.sort_by_key(|e| e.at);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downtime::start_downtime;
    use crate::types::{DowntimeReason, MaintenanceType};
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn timeline_is_merged_and_chronological() {
        let record = MaintenanceRecord {
            id: Some("mr-1".to_string()),
            equipment_id: "eq-a".to_string(),
            work_order_id: None,
            record_type: MaintenanceType::Preventive,
            performed_at: at("2024-06-03T00:00:00Z"),
            work_performed: "Oil change".to_string(),
            is_certification_record: false,
            labor_cost: None,
            parts_cost: None,
            usage_hours_at_service: None,
            performed_by: "kim".to_string(),
        };
        let mut down = start_downtime(
            "eq-a",
            DowntimeReason::Breakdown,
            None,
            at("2024-06-01T00:00:00Z"),
        );
        down.id = Some("dt-1".to_string());
        down.ended_at = Some(at("2024-06-02T00:00:00Z"));

        let entries = history("eq-a", &[], &[], &[record], &[], &[down]);
        let kinds: Vec<HistoryKind> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                HistoryKind::DowntimeStarted,
                HistoryKind::DowntimeEnded,
                HistoryKind::MaintenancePerformed,
            ]
        );
    }

    #[test]
    fn other_equipment_is_excluded() {
        let record = MaintenanceRecord {
            id: Some("mr-1".to_string()),
            equipment_id: "eq-other".to_string(),
            work_order_id: None,
            record_type: MaintenanceType::Inspection,
            performed_at: at("2024-06-03T00:00:00Z"),
            work_performed: "Checked".to_string(),
            is_certification_record: false,
            labor_cost: None,
            parts_cost: None,
            usage_hours_at_service: None,
            performed_by: "kim".to_string(),
        };
        assert!(history("eq-a", &[], &[], &[record], &[], &[]).is_empty());
    }
}
