use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Enums ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Active,
    Retired,
    OutOfService,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Retired => "retired",
            Self::OutOfService => "out_of_service",
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceType {
    Preventive,
    Inspection,
    Certification,
    Other,
}

impl MaintenanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preventive => "preventive",
            Self::Inspection => "inspection",
            Self::Certification => "certification",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Emergency,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }

    /// Rank for listing order; lower sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Requested,
    Approved,
    Scheduled,
    InProgress,
    Completed,
    Closed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Approved => "approved",
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DowntimeReason {
    Breakdown,
    ScheduledMaintenance,
    Inspection,
    Other,
}

impl DowntimeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakdown => "breakdown",
            Self::ScheduledMaintenance => "scheduled_maintenance",
            Self::Inspection => "inspection",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DowntimeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Labor,
    Parts,
    External,
}

impl CostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Labor => "labor",
            Self::Parts => "parts",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Supporting types ───────────────────────────────────────────────────────

/// The identity performing an operation. Authorization happens in the
/// surrounding system before the core is invoked; this is recorded for
/// the audit trail only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Actor {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalendarInterval {
    pub every: u32,
    pub unit: IntervalUnit,
}

/// Recurrence trigger for a schedule. At least one of the two must be set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct FrequencyTrigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarInterval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_hours: Option<f64>,
}

impl FrequencyTrigger {
    pub fn is_empty(&self) -> bool {
        self.calendar.is_none() && self.usage_hours.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderNote {
    pub at: DateTime<Utc>,
    pub author: String,
    pub text: String,
}

// ── Persisted records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentUnit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_usage_hours: Option<f64>,
    pub status: EquipmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub equipment_id: String,
    pub name: String,
    pub maintenance_type: MaintenanceType,
    pub trigger: FrequencyTrigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_parts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_certifications: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub active: bool,
    pub is_regulatory_requirement: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed_usage_hours: Option<f64>,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub equipment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    pub title: String,
    pub maintenance_type: MaintenanceType,
    pub priority: Priority,
    pub safety_concern: bool,
    pub approval_required: bool,
    pub approved: bool,
    pub status: WorkOrderStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_labor_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_labor_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<WorkOrderNote>,
    pub requested_by: String,
}

/// A completed unit of work. Immutable once created; corrections are
/// additive, not destructive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub equipment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_order_id: Option<String>,
    pub record_type: MaintenanceType,
    pub performed_at: DateTime<Utc>,
    pub work_performed: String,
    pub is_certification_record: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_hours_at_service: Option<f64>,
    pub performed_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowntimeEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub equipment_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub reason: DowntimeReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DowntimeEvent {
    /// Closed-interval duration in hours; None while the event is open.
    pub fn duration_hours(&self) -> Option<f64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_seconds() as f64 / 3600.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub equipment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_record_id: Option<String>,
    pub vendor: String,
    pub category: CostCategory,
    pub amount: f64,
    pub date: DateTime<Utc>,
}

// ── Config ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingMode {
    Equal,
    Evidence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Sub-requirements scoring below this land in the gaps list.
    pub gap_threshold: f64,
    /// Cap applied to a sub-requirement backed by an overdue regulatory
    /// schedule.
    pub overdue_cap: f64,
    pub weighting: WeightingMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpkeepConfig {
    pub version: String,
    pub tenants: Vec<String>,
    pub scoring: ScoringPolicy,
}

impl Default for UpkeepConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            tenants: Vec::new(),
            scoring: ScoringPolicy {
                gap_threshold: 70.0,
                overdue_cap: 50.0,
                weighting: WeightingMode::Equal,
            },
        }
    }
}
