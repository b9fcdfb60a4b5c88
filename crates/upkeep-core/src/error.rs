use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpkeepError {
    #[error("No .upkeep/ directory found. Run `upkeep init` first.")]
    NotInitialized,

    #[error("Tenant \"{tenant}\" not found in config. Available tenants: {available}")]
    TenantNotFound { tenant: String, available: String },

    #[error(
        "Invalid tenant name: \"{0}\". Only alphanumeric characters, hyphens, and underscores are allowed."
    )]
    InvalidTenantName(String),

    #[error("Tenant \"{0}\" already exists.")]
    TenantAlreadyExists(String),

    #[error("{kind} \"{id}\" not found in tenant scope.")]
    NotFound { kind: &'static str, id: String },

    #[error(
        "Ambiguous identifier \"{id}\" matches {count} rows: {ids}. Use more characters to disambiguate."
    )]
    AmbiguousId {
        id: String,
        count: usize,
        ids: String,
    },

    #[error("Invalid work order transition: {from} -> {to}. {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error(
        "Concurrent modification of {kind} \"{id}\": expected state {expected}, found {actual}."
    )]
    ConcurrentModification {
        kind: &'static str,
        id: String,
        expected: String,
        actual: String,
    },

    #[error("{kind} \"{id}\" is already closed.")]
    AlreadyClosed { kind: &'static str, id: String },

    #[error(
        "Timed out waiting for lock on {0}. If no other upkeep process is running, delete the lock file manually."
    )]
    LockTimeout(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, UpkeepError>;
