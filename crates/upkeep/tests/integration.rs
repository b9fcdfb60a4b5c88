use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn upkeep() -> Command {
    Command::cargo_bin("upkeep").unwrap()
}

fn init_site() -> TempDir {
    let dir = TempDir::new().unwrap();
    upkeep()
        .args(["init"])
        .current_dir(dir.path())
        .assert()
        .success();
    dir
}

fn init_site_with_tenant(tenant: &str) -> TempDir {
    let dir = init_site();
    upkeep()
        .args(["add", tenant])
        .current_dir(dir.path())
        .assert()
        .success();
    dir
}

fn add_equipment(dir: &TempDir, tenant: &str, code: &str) {
    upkeep()
        .args([
            "equipment", tenant, "--add", "--code", code, "--name", "Forklift 3", "--category",
            "forklift",
        ])
        .current_dir(dir.path())
        .assert()
        .success();
}

fn run_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = upkeep()
        .arg("--json")
        .args(args)
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn create_order(dir: &TempDir, tenant: &str, code: &str, title: &str) -> String {
    let json = run_json(dir, &["order", tenant, code, title]);
    json["order"]["id"].as_str().unwrap().to_string()
}

fn transition(dir: &TempDir, tenant: &str, order_id: &str, target: &str, extra: &[&str]) {
    upkeep()
        .args(["transition", tenant, order_id, target])
        .args(extra)
        .current_dir(dir.path())
        .assert()
        .success();
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. SITE INITIALIZATION AND TENANTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn init_creates_upkeep_directory() {
    let dir = TempDir::new().unwrap();
    upkeep()
        .args(["init"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(dir.path().join(".upkeep").is_dir());
    assert!(dir.path().join(".upkeep/upkeep.config.yaml").is_file());
    assert!(dir.path().join(".upkeep/records").is_dir());
}

#[test]
fn init_is_idempotent() {
    let dir = init_site();
    upkeep()
        .args(["init"])
        .current_dir(dir.path())
        .assert()
        .success();

    assert!(dir.path().join(".upkeep/upkeep.config.yaml").is_file());
}

#[test]
fn commands_fail_without_init() {
    let dir = TempDir::new().unwrap();
    upkeep()
        .args(["add", "acme"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("upkeep init"));
}

#[test]
fn add_rejects_duplicate_tenant() {
    let dir = init_site_with_tenant("acme");
    upkeep()
        .args(["add", "acme"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_rejects_invalid_tenant_name() {
    let dir = init_site();
    upkeep()
        .args(["add", "bad name"])
        .current_dir(dir.path())
        .assert()
        .failure();
}

#[test]
fn unknown_tenant_error_lists_registered_ones() {
    let dir = init_site_with_tenant("acme");
    upkeep()
        .args(["equipment", "ghost"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("acme"));
}

#[test]
fn tenants_are_isolated() {
    let dir = init_site_with_tenant("north");
    upkeep()
        .args(["add", "south"])
        .current_dir(dir.path())
        .assert()
        .success();
    add_equipment(&dir, "north", "FORK-01");

    let north = run_json(&dir, &["equipment", "north"]);
    let south = run_json(&dir, &["equipment", "south"]);
    assert_eq!(north["equipment"].as_array().unwrap().len(), 1);
    assert_eq!(south["equipment"].as_array().unwrap().len(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. EQUIPMENT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn equipment_add_list_and_update() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    let json = run_json(&dir, &["equipment", "acme"]);
    assert_eq!(json["equipment"][0]["code"], "FORK-01");
    assert_eq!(json["equipment"][0]["status"], "active");

    let json = run_json(
        &dir,
        &["equipment", "acme", "--code", "FORK-01", "--set-hours", "1250.5"],
    );
    assert_eq!(json["equipment"]["current_usage_hours"], 1250.5);

    let json = run_json(
        &dir,
        &[
            "equipment",
            "acme",
            "--code",
            "FORK-01",
            "--set-status",
            "out_of_service",
        ],
    );
    assert_eq!(json["equipment"]["status"], "out_of_service");
}

#[test]
fn equipment_rejects_duplicate_code() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    upkeep()
        .args([
            "equipment", "acme", "--add", "--code", "FORK-01", "--name", "Dup", "--category",
            "forklift",
        ])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. SCHEDULES AND DUE EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn schedule_create_and_due_listing() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    let json = run_json(
        &dir,
        &[
            "schedule",
            "acme",
            "FORK-01",
            "90-day service",
            "--every",
            "90",
            "--unit",
            "days",
            "--warning-days",
            "7",
            "--regulatory",
        ],
    );
    assert!(json["schedule"]["id"].as_str().unwrap().starts_with("ms-"));
    assert_eq!(json["schedule"]["is_regulatory_requirement"], true);

    // Freshly created: next due in 90 days, so status is ok.
    let json = run_json(&dir, &["due", "acme"]);
    assert_eq!(json["schedules"][0]["evaluation"]["status"], "ok");
}

#[test]
fn schedule_rejects_missing_trigger_and_bad_lead() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    upkeep()
        .args(["schedule", "acme", "FORK-01", "no trigger"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("trigger"));

    upkeep()
        .args([
            "schedule",
            "acme",
            "FORK-01",
            "bad lead",
            "--every",
            "30",
            "--warning-days",
            "30",
        ])
        .current_dir(dir.path())
        .assert()
        .failure();
}

#[test]
fn overdue_schedule_spawns_one_order() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    run_json(
        &dir,
        &[
            "schedule",
            "acme",
            "FORK-01",
            "Weekly check",
            "--every",
            "7",
            "--unit",
            "days",
        ],
    );

    // Evaluated well past the interval, the schedule is overdue.
    let json = run_json(
        &dir,
        &["due", "acme", "--as-of", "2999-01-01T00:00:00Z", "--spawn"],
    );
    assert_eq!(json["schedules"][0]["evaluation"]["status"], "overdue");
    assert_eq!(json["spawned"].as_array().unwrap().len(), 1);
    assert_eq!(json["spawned"][0]["title"], "Weekly check");

    // A second evaluation finds the open order and spawns nothing.
    let json = run_json(
        &dir,
        &["due", "acme", "--as-of", "2999-01-01T00:00:00Z", "--spawn"],
    );
    assert_eq!(json["spawned"].as_array().unwrap().len(), 0);

    let json = run_json(&dir, &["orders", "acme"]);
    assert_eq!(json["total"], 1);
}

#[test]
fn due_listing_paginates_after_ordering() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    for (name, every) in [("A", "10"), ("B", "20"), ("C", "30")] {
        run_json(
            &dir,
            &["schedule", "acme", "FORK-01", name, "--every", every],
        );
    }

    let json = run_json(&dir, &["due", "acme", "--limit", "2"]);
    assert_eq!(json["total"], 3);
    assert_eq!(json["schedules"].as_array().unwrap().len(), 2);
    // Soonest due first: the 10-day schedule leads the page.
    assert_eq!(json["schedules"][0]["schedule"]["name"], "A");

    let json = run_json(&dir, &["due", "acme", "--limit", "2", "--offset", "2"]);
    assert_eq!(json["total"], 3);
    assert_eq!(json["schedules"].as_array().unwrap().len(), 1);
    assert_eq!(json["schedules"][0]["schedule"]["name"], "C");
}

#[test]
fn schedule_rejects_negative_warning_lead() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    upkeep()
        .args([
            "schedule",
            "acme",
            "FORK-01",
            "negative lead",
            "--every",
            "30",
            "--warning-days=-5",
        ])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("negative"));
}

#[test]
fn usage_hours_schedule_needs_a_reading() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    run_json(
        &dir,
        &[
            "schedule",
            "acme",
            "FORK-01",
            "250h service",
            "--every-hours",
            "250",
        ],
    );

    // No meter reading recorded: the usage trigger stays quiet.
    let json = run_json(&dir, &["due", "acme"]);
    assert_eq!(json["schedules"][0]["evaluation"]["status"], "ok");

    run_json(
        &dir,
        &["equipment", "acme", "--code", "FORK-01", "--set-hours", "300"],
    );
    let json = run_json(&dir, &["due", "acme"]);
    assert_eq!(json["schedules"][0]["evaluation"]["status"], "overdue");
    assert_eq!(
        json["schedules"][0]["evaluation"]["hours_remaining"]
            .as_f64()
            .unwrap(),
        -50.0
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// 4. WORK ORDER LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn order_walks_the_full_lifecycle() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    let id = create_order(&dir, "acme", "FORK-01", "Replace filter");

    transition(&dir, "acme", &id, "scheduled", &[]);
    transition(&dir, "acme", &id, "in_progress", &[]);
    transition(&dir, "acme", &id, "completed", &["--labor-hours", "2.5"]);
    transition(&dir, "acme", &id, "closed", &[]);

    let json = run_json(&dir, &["orders", "acme", "--status", "closed"]);
    assert_eq!(json["total"], 1);
    assert_eq!(json["orders"][0]["actual_labor_hours"], 2.5);
    // Every transition left an audit note.
    assert_eq!(json["orders"][0]["notes"].as_array().unwrap().len(), 4);
}

#[test]
fn illegal_transition_is_rejected() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    let id = create_order(&dir, "acme", "FORK-01", "Replace filter");

    upkeep()
        .args(["transition", "acme", &id, "completed"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requested"));
}

#[test]
fn approval_gate_blocks_scheduling() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    let json = run_json(
        &dir,
        &[
            "order",
            "acme",
            "FORK-01",
            "Inspect rack",
            "--approval-required",
        ],
    );
    let id = json["order"]["id"].as_str().unwrap().to_string();

    upkeep()
        .args(["transition", "acme", &id, "scheduled"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("approval"));

    transition(&dir, "acme", &id, "approved", &[]);
    transition(&dir, "acme", &id, "scheduled", &[]);
}

#[test]
fn completion_requires_hours_or_record() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    let id = create_order(&dir, "acme", "FORK-01", "Replace belt");
    transition(&dir, "acme", &id, "scheduled", &[]);
    transition(&dir, "acme", &id, "in_progress", &[]);

    upkeep()
        .args(["transition", "acme", &id, "completed"])
        .current_dir(dir.path())
        .assert()
        .failure();

    transition(&dir, "acme", &id, "completed", &["--labor-hours", "1.0"]);
}

#[test]
fn cancelled_order_is_terminal() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    let id = create_order(&dir, "acme", "FORK-01", "Obsolete job");

    transition(&dir, "acme", &id, "cancelled", &[]);
    upkeep()
        .args(["transition", "acme", &id, "scheduled"])
        .current_dir(dir.path())
        .assert()
        .failure();
}

#[test]
fn orders_listing_sorts_safety_and_priority_first() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    run_json(&dir, &["order", "acme", "FORK-01", "Routine"]);
    run_json(
        &dir,
        &["order", "acme", "FORK-01", "Urgent", "--priority", "emergency"],
    );
    run_json(&dir, &["order", "acme", "FORK-01", "Guard rail", "--safety"]);

    let json = run_json(&dir, &["orders", "acme"]);
    assert_eq!(json["orders"][0]["title"], "Guard rail");
    assert_eq!(json["orders"][1]["title"], "Urgent");

    let json = run_json(&dir, &["orders", "acme", "--limit", "1", "--offset", "1"]);
    assert_eq!(json["total"], 3);
    assert_eq!(json["orders"].as_array().unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// 5. RECORDS, RECEIPTS, AND COSTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn record_completes_linked_order_and_resets_schedule() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    let schedule = run_json(
        &dir,
        &[
            "schedule", "acme", "FORK-01", "Weekly check", "--every", "7",
        ],
    );
    let schedule_id = schedule["schedule"]["id"].as_str().unwrap().to_string();

    let id = create_order(&dir, "acme", "FORK-01", "Weekly check");
    transition(&dir, "acme", &id, "scheduled", &[]);
    transition(&dir, "acme", &id, "in_progress", &[]);

    let json = run_json(
        &dir,
        &[
            "record",
            "acme",
            "FORK-01",
            "Oil change, filters",
            "--labor-cost",
            "80",
            "--parts-cost",
            "40",
            "--order",
            &id,
            "--schedule",
            &schedule_id,
        ],
    );
    assert_eq!(json["completed_order"]["status"], "completed");
    assert_eq!(
        json["completed_order"]["maintenance_record_id"],
        json["record"]["id"]
    );

    // The completion folded into the schedule.
    let json = run_json(&dir, &["due", "acme"]);
    assert!(json["schedules"][0]["schedule"]["last_completed_at"].is_string());
}

#[test]
fn rejected_order_completion_leaves_no_record_behind() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    // Still in requested: completing it via a record must be rejected.
    let id = create_order(&dir, "acme", "FORK-01", "Replace filter");

    upkeep()
        .args([
            "record",
            "acme",
            "FORK-01",
            "Oil change",
            "--date",
            "2024-06-01T00:00:00Z",
            "--order",
            &id,
        ])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requested"));

    // Nothing was persisted, so the collection file was never created.
    let records_file = dir.path().join(".upkeep/records/acme/maintenance_records.jsonl");
    assert!(!records_file.exists());

    // A retry after the order advances persists exactly one record.
    transition(&dir, "acme", &id, "scheduled", &[]);
    transition(&dir, "acme", &id, "in_progress", &[]);
    let json = run_json(
        &dir,
        &[
            "record",
            "acme",
            "FORK-01",
            "Oil change",
            "--date",
            "2024-06-01T00:00:00Z",
            "--order",
            &id,
        ],
    );
    assert_eq!(json["completed_order"]["status"], "completed");
    let rows = std::fs::read_to_string(&records_file).unwrap();
    assert_eq!(rows.lines().count(), 1);
}

#[test]
fn costs_rollup_spans_records_receipts_and_orders() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    run_json(
        &dir,
        &[
            "record", "acme", "FORK-01", "Oil change", "--labor-cost", "80", "--parts-cost", "40",
        ],
    );
    run_json(
        &dir,
        &["receipt", "acme", "FORK-01", "PartsCo", "25", "--category", "parts"],
    );

    let json = run_json(&dir, &["costs", "acme", "FORK-01"]);
    assert_eq!(json["summary"]["total"].as_f64().unwrap(), 145.0);
    assert_eq!(json["summary"]["by_category"]["labor"].as_f64().unwrap(), 80.0);
    assert_eq!(json["summary"]["by_category"]["parts"].as_f64().unwrap(), 65.0);
    assert_eq!(json["summary"]["trend"].as_array().unwrap().len(), 12);
}

// ═══════════════════════════════════════════════════════════════════════════════
// 6. DOWNTIME AND AVAILABILITY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn downtime_start_end_and_double_close() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    let json = run_json(&dir, &["downtime", "acme", "--start", "FORK-01"]);
    let id = json["event"]["id"].as_str().unwrap().to_string();

    // Open events only appear with --include-open.
    let json = run_json(&dir, &["downtime", "acme"]);
    assert_eq!(json["total"], 0);
    let json = run_json(&dir, &["downtime", "acme", "--include-open"]);
    assert_eq!(json["total"], 1);

    run_json(&dir, &["downtime", "acme", "--end", &id]);
    upkeep()
        .args(["downtime", "acme", "--end", &id])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already closed"));
}

#[test]
fn availability_reflects_recorded_downtime() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    let json = run_json(&dir, &["availability", "acme", "FORK-01"]);
    assert_eq!(json["stats"]["availability_pct"].as_f64().unwrap(), 100.0);
    assert_eq!(json["stats"]["breakdown_count"], 0);

    let start = run_json(&dir, &["downtime", "acme", "--start", "FORK-01"]);
    let id = start["event"]["id"].as_str().unwrap().to_string();
    run_json(&dir, &["downtime", "acme", "--end", &id]);

    let json = run_json(&dir, &["availability", "acme", "FORK-01"]);
    assert!(json["stats"]["availability_pct"].as_f64().unwrap() <= 100.0);
    assert_eq!(json["stats"]["breakdown_count"], 1);
    assert_eq!(json["stats"]["event_count"], 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// 7. HISTORY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn history_merges_all_trails() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");
    run_json(
        &dir,
        &["schedule", "acme", "FORK-01", "Weekly check", "--every", "7"],
    );
    run_json(&dir, &["record", "acme", "FORK-01", "Oil change"]);
    run_json(&dir, &["receipt", "acme", "FORK-01", "PartsCo", "25"]);

    let json = run_json(&dir, &["history", "acme", "FORK-01"]);
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    let kinds: Vec<&str> = entries
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"schedule_created"));
    assert!(kinds.contains(&"maintenance_performed"));
    assert!(kinds.contains(&"receipt_logged"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// 8. SCORING, EVIDENCE, AND EXPORT
// ═══════════════════════════════════════════════════════════════════════════════

fn seed_compliant_tenant(dir: &TempDir) {
    add_equipment(dir, "acme", "FORK-01");
    run_json(
        dir,
        &[
            "schedule", "acme", "FORK-01", "Quarterly PM", "--every", "90", "--regulatory",
        ],
    );
    run_json(dir, &["record", "acme", "FORK-01", "PM round 1"]);
    run_json(dir, &["record", "acme", "FORK-01", "PM round 2"]);
    run_json(
        dir,
        &["record", "acme", "FORK-01", "Visual check", "--type", "inspection"],
    );
    run_json(
        dir,
        &["record", "acme", "FORK-01", "Fork check", "--type", "inspection"],
    );
    run_json(
        dir,
        &[
            "record",
            "acme",
            "FORK-01",
            "Annual certification",
            "--type",
            "certification",
            "--certification",
        ],
    );

    let id = create_order(dir, "acme", "FORK-01", "PM work");
    transition(dir, "acme", &id, "scheduled", &[]);
    transition(dir, "acme", &id, "in_progress", &[]);
    transition(dir, "acme", &id, "completed", &["--labor-hours", "2.0"]);
}

#[test]
fn empty_tenant_scores_zero_with_gaps() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    let json = run_json(&dir, &["score", "acme"]);
    assert_eq!(json["score"]["overall"].as_f64().unwrap(), 0.0);
    assert_eq!(json["score"]["gaps"].as_array().unwrap().len(), 5);
}

#[test]
fn full_evidence_scores_one_hundred() {
    let dir = init_site_with_tenant("acme");
    seed_compliant_tenant(&dir);

    let json = run_json(&dir, &["score", "acme"]);
    assert_eq!(json["score"]["overall"].as_f64().unwrap(), 100.0);
    assert!(json["score"]["gaps"].as_array().unwrap().is_empty());
    assert_eq!(json["score"]["sub_scores"].as_array().unwrap().len(), 5);
}

#[test]
fn quick_mode_keeps_headline_only() {
    let dir = init_site_with_tenant("acme");
    seed_compliant_tenant(&dir);

    let json = run_json(&dir, &["score", "acme", "--mode", "quick"]);
    assert_eq!(json["score"]["overall"].as_f64().unwrap(), 100.0);
    assert!(json["score"]["sub_scores"].as_array().unwrap().is_empty());
}

#[test]
fn summary_mode_reports_counts_without_scores() {
    let dir = init_site_with_tenant("acme");
    seed_compliant_tenant(&dir);

    let json = run_json(&dir, &["score", "acme", "--mode", "summary"]);
    let counts = json["score"]["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 5);
    let pm = counts
        .iter()
        .find(|c| c["sub_requirement_id"] == "pm-records")
        .unwrap();
    assert_eq!(pm["evidence_count"], 2);
    // No scoring ran: neither the headline nor the breakdown is present.
    assert!(json["score"]["overall"].is_null());
    assert!(json["score"]["sub_scores"].is_null());
}

#[test]
fn new_record_shows_up_in_next_score() {
    let dir = init_site_with_tenant("acme");
    add_equipment(&dir, "acme", "FORK-01");

    let before = run_json(&dir, &["score", "acme"]);
    run_json(&dir, &["record", "acme", "FORK-01", "PM round 1"]);
    let after = run_json(&dir, &["score", "acme"]);
    assert!(
        after["score"]["overall"].as_f64().unwrap()
            > before["score"]["overall"].as_f64().unwrap()
    );
}

#[test]
fn evidence_summary_counts_buckets() {
    let dir = init_site_with_tenant("acme");
    seed_compliant_tenant(&dir);

    let json = run_json(&dir, &["evidence", "acme"]);
    let counts = json["summary"]["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 5);
    let pm = counts
        .iter()
        .find(|c| c["sub_requirement_id"] == "pm-records")
        .unwrap();
    assert_eq!(pm["evidence_count"], 2);
}

#[test]
fn unknown_element_fails() {
    let dir = init_site_with_tenant("acme");
    upkeep()
        .args(["score", "acme", "--element", "ghost"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn export_formats_render() {
    let dir = init_site_with_tenant("acme");
    seed_compliant_tenant(&dir);

    let output = upkeep()
        .args(["export", "acme", "--format", "json"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["evidence"]["element_id"], "preventive-maintenance");
    assert!(doc["score"]["overall"].is_number());

    upkeep()
        .args(["export", "acme", "--format", "csv"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "sub_requirement,kind,id,equipment_id,date,summary",
        ));

    upkeep()
        .args(["export", "acme", "--format", "html"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("<html>"));
}
