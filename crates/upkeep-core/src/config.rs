use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpkeepError};
use crate::types::UpkeepConfig;

const UPKEEP_DIR: &str = ".upkeep";
const CONFIG_FILE: &str = "upkeep.config.yaml";
const RECORDS_DIR: &str = "records";

/// Collection file names under a tenant's records directory.
pub const EQUIPMENT: &str = "equipment";
pub const SCHEDULES: &str = "schedules";
pub const WORK_ORDERS: &str = "work_orders";
pub const MAINTENANCE_RECORDS: &str = "maintenance_records";
pub const DOWNTIME: &str = "downtime";
pub const RECEIPTS: &str = "receipts";

pub fn get_upkeep_dir(cwd: &Path) -> PathBuf {
    cwd.join(UPKEEP_DIR)
}

pub fn get_config_path(cwd: &Path) -> PathBuf {
    get_upkeep_dir(cwd).join(CONFIG_FILE)
}

pub fn get_records_dir(cwd: &Path) -> PathBuf {
    get_upkeep_dir(cwd).join(RECORDS_DIR)
}

pub fn get_tenant_dir(tenant: &str, cwd: &Path) -> Result<PathBuf> {
    validate_tenant_name(tenant)?;
    Ok(get_records_dir(cwd).join(tenant))
}

pub fn get_collection_path(tenant: &str, collection: &str, cwd: &Path) -> Result<PathBuf> {
    Ok(get_tenant_dir(tenant, cwd)?.join(format!("{collection}.jsonl")))
}

pub fn validate_tenant_name(tenant: &str) -> Result<()> {
    let re = regex::Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").unwrap();
    if !re.is_match(tenant) {
        return Err(UpkeepError::InvalidTenantName(tenant.to_string()));
    }
    Ok(())
}

pub fn read_config(cwd: &Path) -> Result<UpkeepConfig> {
    let config_path = get_config_path(cwd);
    let content = fs::read_to_string(&config_path)?;
    let config: UpkeepConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

pub fn write_config(config: &UpkeepConfig, cwd: &Path) -> Result<()> {
    let config_path = get_config_path(cwd);
    let content = serde_yaml::to_string(config)?;
    fs::write(&config_path, content)?;
    Ok(())
}

/// Create the .upkeep/ layout with a default config. Idempotent for the
/// directory tree; an existing config is left untouched.
pub fn init_upkeep_dir(cwd: &Path) -> Result<()> {
    fs::create_dir_all(get_records_dir(cwd))?;
    let config_path = get_config_path(cwd);
    if !config_path.is_file() {
        write_config(&UpkeepConfig::default(), cwd)?;
    }
    Ok(())
}

pub fn ensure_upkeep_dir(cwd: &Path) -> Result<()> {
    if !get_upkeep_dir(cwd).is_dir() {
        return Err(UpkeepError::NotInitialized);
    }
    Ok(())
}

/// Resolved collection paths for one tenant.
#[derive(Debug, Clone)]
pub struct TenantPaths {
    pub equipment: PathBuf,
    pub schedules: PathBuf,
    pub work_orders: PathBuf,
    pub maintenance_records: PathBuf,
    pub downtime: PathBuf,
    pub receipts: PathBuf,
}

impl TenantPaths {
    pub fn resolve(tenant: &str, cwd: &Path) -> Result<Self> {
        Ok(Self {
            equipment: get_collection_path(tenant, EQUIPMENT, cwd)?,
            schedules: get_collection_path(tenant, SCHEDULES, cwd)?,
            work_orders: get_collection_path(tenant, WORK_ORDERS, cwd)?,
            maintenance_records: get_collection_path(tenant, MAINTENANCE_RECORDS, cwd)?,
            downtime: get_collection_path(tenant, DOWNTIME, cwd)?,
            receipts: get_collection_path(tenant, RECEIPTS, cwd)?,
        })
    }
}

/// Check the tenant is registered; error lists the registered ones.
pub fn ensure_tenant(config: &UpkeepConfig, tenant: &str) -> Result<()> {
    if config.tenants.iter().any(|t| t == tenant) {
        return Ok(());
    }
    Err(UpkeepError::TenantNotFound {
        tenant: tenant.to_string(),
        available: if config.tenants.is_empty() {
            "(none)".to_string()
        } else {
            config.tenants.join(", ")
        },
    })
}
