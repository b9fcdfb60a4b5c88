use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "upkeep",
    about = "Maintenance scheduling and compliance-evidence scoring",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output as structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Acting user recorded on writes.
    #[arg(long, global = true, default_value = "cli")]
    pub actor: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an .upkeep directory
    Init,

    /// Register a new tenant
    Add(AddArgs),

    /// Add, update, or list equipment units
    Equipment(EquipmentArgs),

    /// Create a maintenance schedule
    Schedule(ScheduleArgs),

    /// Evaluate schedules and list them by urgency
    Due(DueArgs),

    /// Create a work order
    Order(OrderArgs),

    /// List work orders
    Orders(OrdersArgs),

    /// Transition a work order through its lifecycle
    Transition(TransitionArgs),

    /// Log a completed maintenance record
    Record(RecordArgs),

    /// Log a cost receipt
    Receipt(ReceiptArgs),

    /// Start, end, or list downtime events
    Downtime(DowntimeArgs),

    /// Cost rollup for one equipment unit
    Costs(CostsArgs),

    /// Availability statistics for one equipment unit
    Availability(AvailabilityArgs),

    /// Combined chronological history for one equipment unit
    History(HistoryArgs),

    /// Compliance score for an audit element
    Score(ScoreArgs),

    /// Evidence counts for an audit element
    Evidence(EvidenceArgs),

    /// Export evidence and score for external consumption
    Export(ExportArgs),
}

// ── Argument structs ───────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Tenant name to register
    pub tenant: String,
}

#[derive(Args, Debug)]
pub struct EquipmentArgs {
    /// Tenant scope
    pub tenant: String,

    /// Add a new unit (requires --code, --name, --category)
    #[arg(long)]
    pub add: bool,

    /// Equipment code (unique per tenant)
    #[arg(long)]
    pub code: Option<String>,

    /// Human-readable name
    #[arg(long)]
    pub name: Option<String>,

    /// Type/category (e.g. forklift, crane)
    #[arg(long)]
    pub category: Option<String>,

    /// Record a usage-hours meter reading for --code
    #[arg(long)]
    pub set_hours: Option<f64>,

    /// Change operational status for --code
    #[arg(long, value_parser = ["active", "retired", "out_of_service"])]
    pub set_status: Option<String>,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Tenant scope
    pub tenant: String,

    /// Equipment code or id
    pub equipment: String,

    /// Schedule name
    pub name: String,

    /// Maintenance type
    #[arg(long = "type", default_value = "preventive", value_parser = ["preventive", "inspection", "certification", "other"])]
    pub maintenance_type: String,

    /// Calendar interval count (with --unit)
    #[arg(long)]
    pub every: Option<u32>,

    /// Calendar interval unit
    #[arg(long, default_value = "days", value_parser = ["days", "weeks", "months", "years"])]
    pub unit: String,

    /// Usage-hours interval
    #[arg(long)]
    pub every_hours: Option<f64>,

    /// Warning lead in days before the calendar due date
    #[arg(long)]
    pub warning_days: Option<i64>,

    /// Warning lead in hours before the usage due point
    #[arg(long)]
    pub warning_hours: Option<f64>,

    /// Comma-separated checklist tasks
    #[arg(long)]
    pub checklist: Option<String>,

    /// Comma-separated required parts
    #[arg(long)]
    pub parts: Option<String>,

    /// Comma-separated required certifications
    #[arg(long)]
    pub certifications: Option<String>,

    /// Assignment target
    #[arg(long)]
    pub assigned: Option<String>,

    /// Flag the schedule as a regulatory requirement
    #[arg(long)]
    pub regulatory: bool,
}

#[derive(Args, Debug)]
pub struct DueArgs {
    /// Tenant scope
    pub tenant: String,

    /// Restrict to one equipment code or id
    #[arg(long)]
    pub equipment: Option<String>,

    /// Comma-separated maintenance types
    #[arg(long = "type")]
    pub maintenance_types: Option<String>,

    /// Only schedules currently overdue
    #[arg(long)]
    pub overdue_only: bool,

    /// Only schedules due within N days (overdue included)
    #[arg(long)]
    pub due_within: Option<i64>,

    /// Skip deactivated schedules
    #[arg(long)]
    pub active_only: bool,

    /// Create work orders for newly overdue schedules
    #[arg(long)]
    pub spawn: bool,

    /// Evaluate as of this RFC3339 timestamp instead of now
    #[arg(long)]
    pub as_of: Option<String>,

    /// Page size
    #[arg(long)]
    pub limit: Option<usize>,

    /// Page offset
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Tenant scope
    pub tenant: String,

    /// Equipment code or id
    pub equipment: String,

    /// Work order title
    pub title: String,

    /// Maintenance type
    #[arg(long = "type", default_value = "preventive", value_parser = ["preventive", "inspection", "certification", "other"])]
    pub maintenance_type: String,

    /// Priority
    #[arg(long, value_parser = ["low", "medium", "high", "emergency"])]
    pub priority: Option<String>,

    /// Flag as a safety concern
    #[arg(long)]
    pub safety: bool,

    /// Require approval before scheduling
    #[arg(long)]
    pub approval_required: bool,

    /// Due date (RFC3339)
    #[arg(long)]
    pub due: Option<String>,

    /// Assignment target
    #[arg(long)]
    pub assigned: Option<String>,

    /// Estimated labor hours
    #[arg(long)]
    pub est_hours: Option<f64>,

    /// Estimated cost
    #[arg(long)]
    pub est_cost: Option<f64>,

    /// Problem description
    #[arg(long)]
    pub problem: Option<String>,

    /// Originating schedule id
    #[arg(long)]
    pub schedule: Option<String>,
}

#[derive(Args, Debug)]
pub struct OrdersArgs {
    /// Tenant scope
    pub tenant: String,

    /// Comma-separated status filter
    #[arg(long)]
    pub status: Option<String>,

    /// Comma-separated priority filter
    #[arg(long)]
    pub priority: Option<String>,

    /// Filter by assignee
    #[arg(long)]
    pub assigned: Option<String>,

    /// Only orders due before this RFC3339 timestamp
    #[arg(long)]
    pub due_before: Option<String>,

    /// Restrict to one equipment code or id
    #[arg(long)]
    pub equipment: Option<String>,

    /// Only safety-concern orders
    #[arg(long)]
    pub safety_only: bool,

    /// Page size
    #[arg(long)]
    pub limit: Option<usize>,

    /// Page offset
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Tenant scope
    pub tenant: String,

    /// Work order id (prefix allowed)
    pub order: String,

    /// Target state
    #[arg(value_parser = ["approved", "scheduled", "in_progress", "completed", "closed", "cancelled"])]
    pub target: String,

    /// Actual labor hours (required to complete, unless --record is given)
    #[arg(long)]
    pub labor_hours: Option<f64>,

    /// Actual cost
    #[arg(long)]
    pub cost: Option<f64>,

    /// Link a maintenance record id on completion
    #[arg(long)]
    pub record: Option<String>,

    /// Resolution text on completion
    #[arg(long)]
    pub resolution: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Tenant scope
    pub tenant: String,

    /// Equipment code or id
    pub equipment: String,

    /// Work performed
    pub description: String,

    /// Record type
    #[arg(long = "type", default_value = "preventive", value_parser = ["preventive", "inspection", "certification", "other"])]
    pub record_type: String,

    /// Date performed (RFC3339, defaults to now)
    #[arg(long)]
    pub date: Option<String>,

    /// Mark as satisfying a certification requirement
    #[arg(long)]
    pub certification: bool,

    /// Labor cost
    #[arg(long)]
    pub labor_cost: Option<f64>,

    /// Parts cost
    #[arg(long)]
    pub parts_cost: Option<f64>,

    /// Usage-hours reading at service time
    #[arg(long)]
    pub usage_hours: Option<f64>,

    /// Complete this work order with the new record linked
    #[arg(long)]
    pub order: Option<String>,

    /// Fold the completion into this schedule id
    #[arg(long)]
    pub schedule: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReceiptArgs {
    /// Tenant scope
    pub tenant: String,

    /// Equipment code or id
    pub equipment: String,

    /// Vendor name
    pub vendor: String,

    /// Amount
    pub amount: f64,

    /// Cost category
    #[arg(long, default_value = "parts", value_parser = ["labor", "parts", "external"])]
    pub category: String,

    /// Receipt date (RFC3339, defaults to now)
    #[arg(long)]
    pub date: Option<String>,

    /// Linked maintenance record id
    #[arg(long)]
    pub record: Option<String>,
}

#[derive(Args, Debug)]
pub struct DowntimeArgs {
    /// Tenant scope
    pub tenant: String,

    /// Start a downtime event for this equipment code or id
    #[arg(long)]
    pub start: Option<String>,

    /// Reason for --start
    #[arg(long, default_value = "breakdown", value_parser = ["breakdown", "scheduled_maintenance", "inspection", "other"])]
    pub reason: String,

    /// Free-text detail for --start
    #[arg(long)]
    pub detail: Option<String>,

    /// End (close) this downtime event id
    #[arg(long)]
    pub end: Option<String>,

    /// Restrict listing to one equipment code or id
    #[arg(long)]
    pub equipment: Option<String>,

    /// Include unresolved events in the listing
    #[arg(long)]
    pub include_open: bool,

    /// Page size
    #[arg(long)]
    pub limit: Option<usize>,

    /// Page offset
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Args, Debug)]
pub struct CostsArgs {
    /// Tenant scope
    pub tenant: String,

    /// Equipment code or id
    pub equipment: String,

    /// Window start (RFC3339, defaults to one year back)
    #[arg(long)]
    pub from: Option<String>,

    /// Window end (RFC3339, defaults to now)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args, Debug)]
pub struct AvailabilityArgs {
    /// Tenant scope
    pub tenant: String,

    /// Equipment code or id
    pub equipment: String,

    /// Window start (RFC3339, defaults to one year back)
    #[arg(long)]
    pub from: Option<String>,

    /// Window end (RFC3339, defaults to now)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Tenant scope
    pub tenant: String,

    /// Equipment code or id
    pub equipment: String,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Tenant scope
    pub tenant: String,

    /// Audit element id
    #[arg(long, default_value = "preventive-maintenance")]
    pub element: String,

    /// Scoring mode
    #[arg(long, default_value = "full", value_parser = ["quick", "full", "summary", "export"])]
    pub mode: String,

    /// Restrict to one equipment code or id
    #[arg(long)]
    pub equipment: Option<String>,
}

#[derive(Args, Debug)]
pub struct EvidenceArgs {
    /// Tenant scope
    pub tenant: String,

    /// Audit element id
    #[arg(long, default_value = "preventive-maintenance")]
    pub element: String,

    /// Restrict to one equipment code or id
    #[arg(long)]
    pub equipment: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Tenant scope
    pub tenant: String,

    /// Audit element id
    #[arg(long, default_value = "preventive-maintenance")]
    pub element: String,

    /// Output format
    #[arg(long, default_value = "json", value_parser = ["json", "csv", "html"])]
    pub format: String,

    /// Restrict to one equipment code or id
    #[arg(long)]
    pub equipment: Option<String>,
}
