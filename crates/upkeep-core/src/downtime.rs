use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, UpkeepError};
use crate::lock::with_file_lock;
use crate::storage::{self, StoredRecord};
use crate::types::{DowntimeEvent, DowntimeReason};

// ── Recording ──────────────────────────────────────────────────────────────

pub fn start_downtime(
    equipment_id: &str,
    reason: DowntimeReason,
    detail: Option<String>,
    now: DateTime<Utc>,
) -> DowntimeEvent {
    DowntimeEvent {
        id: None,
        equipment_id: equipment_id.to_string(),
        started_at: now,
        ended_at: None,
        reason,
        detail,
    }
}

/// Close an open event. Double-close is `AlreadyClosed`; the interval must
/// stay unambiguous, so an end before the start is rejected too.
pub fn end_downtime(event: &DowntimeEvent, ended_at: DateTime<Utc>) -> Result<DowntimeEvent> {
    if event.ended_at.is_some() {
        return Err(UpkeepError::AlreadyClosed {
            kind: DowntimeEvent::KIND,
            id: event.id.clone().unwrap_or_default(),
        });
    }
    if ended_at < event.started_at {
        return Err(UpkeepError::Validation(
            "downtime end must not precede its start".to_string(),
        ));
    }
    Ok(DowntimeEvent {
        ended_at: Some(ended_at),
        ..event.clone()
    })
}

/// Close an event inside the collection file under the advisory lock,
/// rereading the row so a concurrent close surfaces as `AlreadyClosed`.
pub fn apply_end_downtime(
    path: &Path,
    event_id: &str,
    ended_at: DateTime<Utc>,
) -> Result<DowntimeEvent> {
    with_file_lock(path, || {
        let mut events: Vec<DowntimeEvent> = storage::read_collection(path)?;
        let idx = storage::find_index_by_id(&events, event_id)?;
        let updated = end_downtime(&events[idx], ended_at)?;
        events[idx] = updated.clone();
        storage::write_collection(path, &mut events)?;
        Ok(updated)
    })
}

// ── Listing ────────────────────────────────────────────────────────────────

/// Events for one equipment unit, newest-first. `include_open` controls
/// whether unresolved events (no end timestamp) appear.
pub fn list_downtime(
    events: &[DowntimeEvent],
    equipment_id: Option<&str>,
    include_open: bool,
) -> Vec<DowntimeEvent> {
    let mut rows: Vec<DowntimeEvent> = events
        .iter()
        .filter(|e| equipment_id.is_none_or(|id| e.equipment_id == id))
        .filter(|e| include_open || e.ended_at.is_some())
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    rows
}

// ── Availability ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityStats {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Fraction of the window spent up, as a percentage.
    pub availability_pct: f64,
    pub downtime_hours: f64,
    pub event_count: usize,
    pub breakdown_count: usize,
    /// Window duration / max(1, breakdown count).
    pub mtbf_hours: f64,
}

fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

/// Availability over a reporting window. Each event's overlap with the
/// window is clipped to the window; open events are clipped at the window
/// end or `now`, whichever comes first.
pub fn availability(
    events: &[DowntimeEvent],
    equipment_id: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<AvailabilityStats> {
    if window_end <= window_start {
        return Err(UpkeepError::Validation(
            "availability window end must be after its start".to_string(),
        ));
    }

    let window_hours = hours_between(window_start, window_end);
    let mut downtime_hours = 0.0;
    let mut event_count = 0;
    let mut breakdown_count = 0;

    for event in events.iter().filter(|e| e.equipment_id == equipment_id) {
        let effective_end = event.ended_at.unwrap_or_else(|| now.min(window_end));
        let clipped_start = event.started_at.max(window_start);
        let clipped_end = effective_end.min(window_end);
        if clipped_end <= clipped_start {
            continue; // no overlap with the window
        }
        downtime_hours += hours_between(clipped_start, clipped_end);
        event_count += 1;
        if event.reason == DowntimeReason::Breakdown {
            breakdown_count += 1;
        }
    }

    let availability_pct = (1.0 - downtime_hours / window_hours) * 100.0;
    let mtbf_hours = window_hours / breakdown_count.max(1) as f64;

    Ok(AvailabilityStats {
        window_start,
        window_end,
        availability_pct,
        downtime_hours,
        event_count,
        breakdown_count,
        mtbf_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn closed_event(start: &str, end: &str, reason: DowntimeReason) -> DowntimeEvent {
        DowntimeEvent {
            id: Some("dt-aaaaaa".to_string()),
            equipment_id: "eq-abc123".to_string(),
            started_at: at(start),
            ended_at: Some(at(end)),
            reason,
            detail: None,
        }
    }

    #[test]
    fn double_close_rejected() {
        let open = start_downtime(
            "eq-abc123",
            DowntimeReason::Breakdown,
            Some("hydraulic leak".to_string()),
            at("2024-06-01T08:00:00Z"),
        );
        let closed = end_downtime(&open, at("2024-06-01T12:00:00Z")).unwrap();
        assert_eq!(closed.duration_hours(), Some(4.0));

        let err = end_downtime(&closed, at("2024-06-01T13:00:00Z")).unwrap_err();
        assert!(matches!(err, UpkeepError::AlreadyClosed { .. }));
    }

    #[test]
    fn end_before_start_rejected() {
        let open = start_downtime(
            "eq-abc123",
            DowntimeReason::Other,
            None,
            at("2024-06-01T08:00:00Z"),
        );
        assert!(end_downtime(&open, at("2024-06-01T07:00:00Z")).is_err());
    }

    #[test]
    fn availability_clips_to_window() {
        // 4h inside the window, 2h hanging over each edge.
        let events = vec![
            closed_event(
                "2024-05-31T22:00:00Z",
                "2024-06-01T02:00:00Z",
                DowntimeReason::Breakdown,
            ),
            closed_event(
                "2024-06-01T22:00:00Z",
                "2024-06-02T02:00:00Z",
                DowntimeReason::ScheduledMaintenance,
            ),
        ];
        let stats = availability(
            &events,
            "eq-abc123",
            at("2024-06-01T00:00:00Z"),
            at("2024-06-02T00:00:00Z"),
            at("2024-06-03T00:00:00Z"),
        )
        .unwrap();
        assert_eq!(stats.downtime_hours, 4.0);
        assert_eq!(stats.event_count, 2);
        assert_eq!(stats.breakdown_count, 1);
        assert_eq!(stats.availability_pct, (1.0 - 4.0 / 24.0) * 100.0);
        assert_eq!(stats.mtbf_hours, 24.0);
    }

    #[test]
    fn open_event_clipped_at_window_end() {
        // Opened at T, never closed; window ends 10h later.
        let open = start_downtime(
            "eq-abc123",
            DowntimeReason::Breakdown,
            None,
            at("2024-06-01T00:00:00Z"),
        );
        let stats = availability(
            &[open],
            "eq-abc123",
            at("2024-05-31T00:00:00Z"),
            at("2024-06-01T10:00:00Z"),
            at("2024-06-05T00:00:00Z"),
        )
        .unwrap();
        assert_eq!(stats.downtime_hours, 10.0);
    }

    #[test]
    fn open_event_clipped_at_now_when_earlier() {
        let open = start_downtime(
            "eq-abc123",
            DowntimeReason::Breakdown,
            None,
            at("2024-06-01T00:00:00Z"),
        );
        let stats = availability(
            &[open],
            "eq-abc123",
            at("2024-06-01T00:00:00Z"),
            at("2024-06-02T00:00:00Z"),
            at("2024-06-01T06:00:00Z"),
        )
        .unwrap();
        assert_eq!(stats.downtime_hours, 6.0);
    }

    #[test]
    fn adding_downtime_never_raises_availability() {
        let window_start = at("2024-06-01T00:00:00Z");
        let window_end = at("2024-06-08T00:00:00Z");
        let now = at("2024-06-09T00:00:00Z");

        let mut events = vec![closed_event(
            "2024-06-02T00:00:00Z",
            "2024-06-02T05:00:00Z",
            DowntimeReason::Breakdown,
        )];
        let before = availability(&events, "eq-abc123", window_start, window_end, now)
            .unwrap()
            .availability_pct;

        events.push(closed_event(
            "2024-06-04T00:00:00Z",
            "2024-06-04T03:00:00Z",
            DowntimeReason::Inspection,
        ));
        let after = availability(&events, "eq-abc123", window_start, window_end, now)
            .unwrap()
            .availability_pct;
        assert!(after < before);
    }

    #[test]
    fn mtbf_counts_only_breakdowns() {
        let events = vec![
            closed_event(
                "2024-06-01T00:00:00Z",
                "2024-06-01T01:00:00Z",
                DowntimeReason::Breakdown,
            ),
            closed_event(
                "2024-06-02T00:00:00Z",
                "2024-06-02T01:00:00Z",
                DowntimeReason::Breakdown,
            ),
            closed_event(
                "2024-06-03T00:00:00Z",
                "2024-06-03T01:00:00Z",
                DowntimeReason::ScheduledMaintenance,
            ),
        ];
        let stats = availability(
            &events,
            "eq-abc123",
            at("2024-06-01T00:00:00Z"),
            at("2024-06-05T00:00:00Z"),
            at("2024-06-06T00:00:00Z"),
        )
        .unwrap();
        assert_eq!(stats.breakdown_count, 2);
        assert_eq!(stats.mtbf_hours, 96.0 / 2.0);
    }

    #[test]
    fn listing_newest_first_and_open_flag() {
        let open = start_downtime(
            "eq-abc123",
            DowntimeReason::Breakdown,
            None,
            at("2024-06-05T00:00:00Z"),
        );
        let older = closed_event(
            "2024-06-01T00:00:00Z",
            "2024-06-01T04:00:00Z",
            DowntimeReason::Other,
        );
        let events = vec![older, open];

        let rows = list_downtime(&events, Some("eq-abc123"), true);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ended_at.is_none());

        let rows = list_downtime(&events, Some("eq-abc123"), false);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].ended_at.is_some());
    }

    #[test]
    fn apply_end_detects_double_close_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("downtime.jsonl");

        let mut event = start_downtime(
            "eq-abc123",
            DowntimeReason::Breakdown,
            None,
            at("2024-06-01T00:00:00Z"),
        );
        storage::append_row(&path, &mut event).unwrap();
        let id = event.id.clone().unwrap();

        apply_end_downtime(&path, &id, at("2024-06-01T04:00:00Z")).unwrap();
        let err = apply_end_downtime(&path, &id, at("2024-06-01T05:00:00Z")).unwrap_err();
        assert!(matches!(err, UpkeepError::AlreadyClosed { .. }));
    }
}
