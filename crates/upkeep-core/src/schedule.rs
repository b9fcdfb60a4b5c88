use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpkeepError};
use crate::types::{
    CalendarInterval, EquipmentUnit, IntervalUnit, MaintenanceSchedule, MaintenanceType, Priority,
    WorkOrder,
};
use crate::workorder::WorkOrderInput;

// ── Evaluation ─────────────────────────────────────────────────────────────

/// Due status ordered by urgency: `Ok < Warning < Overdue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Ok,
    Warning,
    Overdue,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for DueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvaluation {
    pub status: DueStatus,
    /// Projected calendar due date. None for usage-hours-only schedules,
    /// which have no projectable date without a consumption-rate model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_at: Option<DateTime<Utc>>,
    /// Usage hours left before the usage trigger fires. Negative once past
    /// due. None when no trigger or no current reading exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<f64>,
}

fn add_interval(base: DateTime<Utc>, interval: CalendarInterval) -> DateTime<Utc> {
    match interval.unit {
        IntervalUnit::Days => base + Duration::days(interval.every as i64),
        IntervalUnit::Weeks => base + Duration::weeks(interval.every as i64),
        IntervalUnit::Months => base
            .checked_add_months(Months::new(interval.every))
            .unwrap_or(base),
        IntervalUnit::Years => base
            .checked_add_months(Months::new(interval.every.saturating_mul(12)))
            .unwrap_or(base),
    }
}

/// Approximate interval length in days, used to validate warning leads.
fn interval_days(interval: CalendarInterval) -> i64 {
    let every = interval.every as i64;
    match interval.unit {
        IntervalUnit::Days => every,
        IntervalUnit::Weeks => every * 7,
        IntervalUnit::Months => every * 30,
        IntervalUnit::Years => every * 365,
    }
}

/// Evaluate a schedule's due status at a point in time.
///
/// Calendar trigger: next due = last completion (or creation if never
/// completed) + interval. Usage trigger: next due hours = hours at last
/// completion + interval hours; skipped entirely when no current reading
/// is supplied. With both triggers configured the more urgent status wins.
pub fn evaluate(
    schedule: &MaintenanceSchedule,
    as_of: DateTime<Utc>,
    current_usage_hours: Option<f64>,
) -> ScheduleEvaluation {
    let mut status = DueStatus::Ok;
    let mut next_due_at = None;
    let mut hours_remaining = None;

    if let Some(interval) = schedule.trigger.calendar {
        let base = schedule.last_completed_at.unwrap_or(schedule.created_at);
        let next_due = add_interval(base, interval);
        let calendar_status = if as_of > next_due {
            DueStatus::Overdue
        } else if schedule
            .warning_days
            .is_some_and(|lead| next_due - as_of <= Duration::days(lead))
        {
            DueStatus::Warning
        } else {
            DueStatus::Ok
        };
        status = status.max(calendar_status);
        next_due_at = Some(next_due);
    }

    if let Some(interval_hours) = schedule.trigger.usage_hours {
        if let Some(current) = current_usage_hours {
            let next_due_hours =
                schedule.last_completed_usage_hours.unwrap_or(0.0) + interval_hours;
            let usage_status = if current > next_due_hours {
                DueStatus::Overdue
            } else if schedule
                .warning_hours
                .is_some_and(|lead| next_due_hours - current <= lead)
            {
                DueStatus::Warning
            } else {
                DueStatus::Ok
            };
            status = status.max(usage_status);
            hours_remaining = Some(next_due_hours - current);
        }
    }

    ScheduleEvaluation {
        status,
        next_due_at,
        hours_remaining,
    }
}

// ── Validation ─────────────────────────────────────────────────────────────

pub fn validate_schedule(schedule: &MaintenanceSchedule) -> Result<()> {
    if schedule.name.trim().is_empty() {
        return Err(UpkeepError::Validation(
            "schedule name must not be empty".to_string(),
        ));
    }
    if schedule.trigger.is_empty() {
        return Err(UpkeepError::Validation(
            "schedule needs at least one frequency trigger (calendar or usage hours)".to_string(),
        ));
    }
    if let Some(lead) = schedule.warning_days {
        if lead < 0 {
            return Err(UpkeepError::Validation(
                "warning lead (days) must not be negative".to_string(),
            ));
        }
        match schedule.trigger.calendar {
            Some(interval) if lead < interval_days(interval) => {}
            Some(_) => {
                return Err(UpkeepError::Validation(
                    "warning lead (days) must be strictly less than the calendar interval"
                        .to_string(),
                ));
            }
            None => {
                return Err(UpkeepError::Validation(
                    "warning days require a calendar trigger".to_string(),
                ));
            }
        }
    }
    if let Some(lead) = schedule.warning_hours {
        if lead < 0.0 {
            return Err(UpkeepError::Validation(
                "warning lead (hours) must not be negative".to_string(),
            ));
        }
        match schedule.trigger.usage_hours {
            Some(interval_hours) if lead < interval_hours => {}
            Some(_) => {
                return Err(UpkeepError::Validation(
                    "warning lead (hours) must be strictly less than the usage-hours interval"
                        .to_string(),
                ));
            }
            None => {
                return Err(UpkeepError::Validation(
                    "warning hours require a usage-hours trigger".to_string(),
                ));
            }
        }
    }
    Ok(())
}

// ── Listing ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub equipment_id: Option<String>,
    /// Empty means all maintenance types.
    pub maintenance_types: Vec<MaintenanceType>,
    pub active_only: bool,
    pub overdue_only: bool,
    pub due_within_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedSchedule {
    pub schedule: MaintenanceSchedule,
    pub evaluation: ScheduleEvaluation,
}

fn usage_reading<'a>(
    equipment: &'a [EquipmentUnit],
    equipment_id: &str,
) -> Option<&'a EquipmentUnit> {
    equipment
        .iter()
        .find(|e| e.id.as_deref() == Some(equipment_id))
}

/// Evaluate, filter, and page schedules, ordered by urgency: overdue first,
/// then warning by soonest due date, then ok. Returns the page plus the
/// total match count for caller-side pagination.
pub fn list_schedules(
    schedules: &[MaintenanceSchedule],
    equipment: &[EquipmentUnit],
    filter: &ScheduleFilter,
    as_of: DateTime<Utc>,
    limit: Option<usize>,
    offset: usize,
) -> (Vec<EvaluatedSchedule>, usize) {
    let mut rows: Vec<EvaluatedSchedule> = schedules
        .iter()
        .filter(|s| {
            filter
                .equipment_id
                .as_ref()
                .is_none_or(|id| s.equipment_id == *id)
        })
        .filter(|s| {
            filter.maintenance_types.is_empty()
                || filter.maintenance_types.contains(&s.maintenance_type)
        })
        .filter(|s| !filter.active_only || s.active)
        .map(|s| {
            let reading =
                usage_reading(equipment, &s.equipment_id).and_then(|e| e.current_usage_hours);
            EvaluatedSchedule {
                schedule: s.clone(),
                evaluation: evaluate(s, as_of, reading),
            }
        })
        .filter(|row| !filter.overdue_only || row.evaluation.status == DueStatus::Overdue)
        .filter(|row| {
            filter.due_within_days.is_none_or(|days| {
                row.evaluation.status == DueStatus::Overdue
                    || row
                        .evaluation
                        .next_due_at
                        .is_some_and(|due| due <= as_of + Duration::days(days))
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.evaluation
            .status
            .cmp(&a.evaluation.status)
            .then_with(|| {
                let a_due = a.evaluation.next_due_at.unwrap_or(DateTime::<Utc>::MAX_UTC);
                let b_due = b.evaluation.next_due_at.unwrap_or(DateTime::<Utc>::MAX_UTC);
                a_due.cmp(&b_due)
            })
    });
    let total = rows.len();
    let page: Vec<EvaluatedSchedule> = rows
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    (page, total)
}

// ── Overdue collaboration point ────────────────────────────────────────────

/// Describe the work order an overdue schedule calls for, without creating
/// it. Returns None unless the schedule just went overdue and no open order
/// already traces back to it; applying the command is the caller's call.
pub fn spawn_work_order(
    schedule: &MaintenanceSchedule,
    evaluation: &ScheduleEvaluation,
    existing_orders: &[WorkOrder],
) -> Option<WorkOrderInput> {
    if evaluation.status != DueStatus::Overdue || !schedule.active {
        return None;
    }
    let already_open = existing_orders.iter().any(|o| {
        o.schedule_id.as_deref() == schedule.id.as_deref()
            && schedule.id.is_some()
            && !o.status.is_terminal()
            && o.status != crate::types::WorkOrderStatus::Completed
    });
    if already_open {
        return None;
    }
    Some(WorkOrderInput {
        equipment_id: schedule.equipment_id.clone(),
        schedule_id: schedule.id.clone(),
        title: schedule.name.clone(),
        maintenance_type: schedule.maintenance_type,
        priority: Some(if schedule.is_regulatory_requirement {
            Priority::High
        } else {
            Priority::Medium
        }),
        safety_concern: false,
        approval_required: false,
        due_at: evaluation.next_due_at,
        assigned_to: schedule.assigned_to.clone(),
        estimated_labor_hours: None,
        estimated_cost: None,
        problem: None,
    })
}

/// Fold a completion back into the schedule so the next evaluation
/// projects from it.
pub fn mark_completed(
    schedule: &mut MaintenanceSchedule,
    completed_at: DateTime<Utc>,
    usage_hours: Option<f64>,
) {
    schedule.last_completed_at = Some(completed_at);
    if usage_hours.is_some() {
        schedule.last_completed_usage_hours = usage_hours;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrequencyTrigger;
    use pretty_assertions::assert_eq;

    fn base_schedule() -> MaintenanceSchedule {
        MaintenanceSchedule {
            id: Some("ms-aaaaaa".to_string()),
            equipment_id: "eq-abc123".to_string(),
            name: "90-day service".to_string(),
            maintenance_type: MaintenanceType::Preventive,
            trigger: FrequencyTrigger {
                calendar: Some(CalendarInterval {
                    every: 90,
                    unit: IntervalUnit::Days,
                }),
                usage_hours: None,
            },
            warning_days: Some(7),
            warning_hours: None,
            checklist: Vec::new(),
            required_parts: Vec::new(),
            required_certifications: Vec::new(),
            assigned_to: None,
            active: true,
            is_regulatory_requirement: false,
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            last_completed_at: None,
            last_completed_usage_hours: None,
            created_by: "pat".to_string(),
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn calendar_boundaries() {
        let schedule = base_schedule();
        // Next due = created + 90 days = 2024-03-31T00:00:00Z
        let next_due = at("2024-03-31T00:00:00Z");

        let eval = evaluate(&schedule, next_due - Duration::days(1), None);
        assert_ne!(eval.status, DueStatus::Overdue);
        assert_eq!(eval.next_due_at, Some(next_due));

        let eval = evaluate(&schedule, next_due + Duration::days(1), None);
        assert_eq!(eval.status, DueStatus::Overdue);
    }

    #[test]
    fn warning_window_scenario() {
        // Interval 90 days, warning 7 days, last completed 84 days ago:
        // due in 6 days, inside the warning lead.
        let mut schedule = base_schedule();
        let today = at("2024-06-01T00:00:00Z");
        schedule.last_completed_at = Some(today - Duration::days(84));

        let eval = evaluate(&schedule, today, None);
        assert_eq!(eval.status, DueStatus::Warning);
        assert_eq!(eval.next_due_at, Some(today + Duration::days(6)));
    }

    #[test]
    fn no_warning_lead_goes_straight_to_overdue() {
        let mut schedule = base_schedule();
        schedule.warning_days = None;
        schedule.last_completed_at = Some(at("2024-06-01T00:00:00Z") - Duration::days(89));

        let eval = evaluate(&schedule, at("2024-06-01T00:00:00Z"), None);
        assert_eq!(eval.status, DueStatus::Ok);
    }

    #[test]
    fn usage_trigger_skipped_without_reading() {
        let mut schedule = base_schedule();
        schedule.trigger.usage_hours = Some(250.0);
        schedule.last_completed_usage_hours = Some(1000.0);
        schedule.last_completed_at = Some(at("2024-06-01T00:00:00Z"));

        // Way past due on hours, but no reading supplied: calendar decides.
        let eval = evaluate(&schedule, at("2024-06-02T00:00:00Z"), None);
        assert_eq!(eval.status, DueStatus::Ok);
        assert_eq!(eval.hours_remaining, None);

        let eval = evaluate(&schedule, at("2024-06-02T00:00:00Z"), Some(1300.0));
        assert_eq!(eval.status, DueStatus::Overdue);
        assert_eq!(eval.hours_remaining, Some(-50.0));
    }

    #[test]
    fn both_triggers_more_urgent_wins() {
        let mut schedule = base_schedule();
        schedule.trigger.usage_hours = Some(250.0);
        schedule.warning_hours = Some(25.0);
        schedule.last_completed_at = Some(at("2024-06-01T00:00:00Z"));
        schedule.last_completed_usage_hours = Some(1000.0);

        let as_of = at("2024-06-10T00:00:00Z"); // calendar ok

        let calendar_only = evaluate(&schedule, as_of, None);
        assert_eq!(calendar_only.status, DueStatus::Ok);

        // Usage inside warning lead: overall lifts to warning.
        let eval = evaluate(&schedule, as_of, Some(1230.0));
        assert_eq!(eval.status, DueStatus::Warning);
        assert!(eval.status >= calendar_only.status);

        // Usage past due: overall lifts to overdue.
        let eval = evaluate(&schedule, as_of, Some(1251.0));
        assert_eq!(eval.status, DueStatus::Overdue);
    }

    #[test]
    fn month_interval_projects_by_calendar_month() {
        let mut schedule = base_schedule();
        schedule.trigger.calendar = Some(CalendarInterval {
            every: 6,
            unit: IntervalUnit::Months,
        });
        schedule.warning_days = None;
        schedule.last_completed_at = Some(at("2024-01-31T00:00:00Z"));

        let eval = evaluate(&schedule, at("2024-02-01T00:00:00Z"), None);
        // Jan 31 + 6 months clamps to Jul 31.
        assert_eq!(eval.next_due_at, Some(at("2024-07-31T00:00:00Z")));
    }

    #[test]
    fn validation_rejects_empty_trigger_and_bad_leads() {
        let mut schedule = base_schedule();
        schedule.trigger = FrequencyTrigger::default();
        schedule.warning_days = None;
        assert!(validate_schedule(&schedule).is_err());

        let mut schedule = base_schedule();
        schedule.warning_days = Some(90);
        assert!(validate_schedule(&schedule).is_err());

        let mut schedule = base_schedule();
        schedule.trigger.usage_hours = Some(100.0);
        schedule.warning_hours = Some(100.0);
        assert!(validate_schedule(&schedule).is_err());

        assert!(validate_schedule(&base_schedule()).is_ok());
    }

    #[test]
    fn validation_rejects_negative_leads() {
        let mut schedule = base_schedule();
        schedule.warning_days = Some(-5);
        let err = validate_schedule(&schedule).unwrap_err();
        assert!(err.to_string().contains("negative"));

        let mut schedule = base_schedule();
        schedule.trigger.usage_hours = Some(250.0);
        schedule.warning_hours = Some(-1.0);
        assert!(validate_schedule(&schedule).is_err());
    }

    #[test]
    fn listing_orders_by_urgency_then_due_date() {
        let today = at("2024-06-01T00:00:00Z");
        let mut overdue = base_schedule();
        overdue.name = "overdue".to_string();
        overdue.last_completed_at = Some(today - Duration::days(100));

        let mut warning_soon = base_schedule();
        warning_soon.name = "warning-soon".to_string();
        warning_soon.last_completed_at = Some(today - Duration::days(88));

        let mut warning_later = base_schedule();
        warning_later.name = "warning-later".to_string();
        warning_later.last_completed_at = Some(today - Duration::days(84));

        let mut fine = base_schedule();
        fine.name = "fine".to_string();
        fine.last_completed_at = Some(today - Duration::days(10));

        let schedules = vec![
            fine.clone(),
            warning_later.clone(),
            overdue.clone(),
            warning_soon.clone(),
        ];
        let (rows, total) =
            list_schedules(&schedules, &[], &ScheduleFilter::default(), today, None, 0);
        assert_eq!(total, 4);
        let names: Vec<&str> = rows.iter().map(|r| r.schedule.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["overdue", "warning-soon", "warning-later", "fine"]
        );

        let (rows, _) = list_schedules(
            &schedules,
            &[],
            &ScheduleFilter {
                overdue_only: true,
                ..Default::default()
            },
            today,
            None,
            0,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].schedule.name, "overdue");

        let (rows, _) = list_schedules(
            &schedules,
            &[],
            &ScheduleFilter {
                due_within_days: Some(3),
                ..Default::default()
            },
            today,
            None,
            0,
        );
        // Overdue + warning-soon (due in 2 days).
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn listing_pages_after_ordering() {
        let today = at("2024-06-01T00:00:00Z");
        let mut overdue = base_schedule();
        overdue.name = "overdue".to_string();
        overdue.last_completed_at = Some(today - Duration::days(100));

        let mut warning = base_schedule();
        warning.name = "warning".to_string();
        warning.last_completed_at = Some(today - Duration::days(88));

        let mut fine = base_schedule();
        fine.name = "fine".to_string();
        fine.last_completed_at = Some(today - Duration::days(10));

        let schedules = vec![fine, warning, overdue];
        let (page, total) = list_schedules(
            &schedules,
            &[],
            &ScheduleFilter::default(),
            today,
            Some(1),
            1,
        );
        // The page cuts into the urgency-ordered list, not the raw input.
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].schedule.name, "warning");

        let (page, total) =
            list_schedules(&schedules, &[], &ScheduleFilter::default(), today, None, 5);
        assert_eq!(total, 3);
        assert!(page.is_empty());
    }

    #[test]
    fn spawn_emits_once_per_overdue_cycle() {
        let today = at("2024-06-01T00:00:00Z");
        let mut schedule = base_schedule();
        schedule.last_completed_at = Some(today - Duration::days(100));
        let eval = evaluate(&schedule, today, None);
        assert_eq!(eval.status, DueStatus::Overdue);

        let input = spawn_work_order(&schedule, &eval, &[]).unwrap();
        assert_eq!(input.schedule_id.as_deref(), Some("ms-aaaaaa"));
        assert_eq!(input.title, "90-day service");

        // An open order for the schedule suppresses a second spawn.
        let order = crate::workorder::create_work_order(
            input,
            &crate::types::Actor::named("engine"),
            today,
        )
        .unwrap();
        assert!(spawn_work_order(&schedule, &eval, std::slice::from_ref(&order)).is_none());

        // Completion resets the cycle.
        mark_completed(&mut schedule, today, Some(1200.0));
        let eval = evaluate(&schedule, today, None);
        assert_eq!(eval.status, DueStatus::Ok);
        assert!(spawn_work_order(&schedule, &eval, &[order]).is_none());
        assert_eq!(schedule.last_completed_usage_hours, Some(1200.0));
    }
}
