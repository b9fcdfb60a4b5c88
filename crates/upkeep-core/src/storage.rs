use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, UpkeepError};
use crate::id::generate_id;
use crate::types::{
    DowntimeEvent, EquipmentUnit, MaintenanceRecord, MaintenanceSchedule, Receipt, WorkOrder,
};

/// A row persisted in a tenant collection. IDs are assigned lazily on
/// first write from a deterministic, type-qualified key.
pub trait StoredRecord: Serialize + DeserializeOwned {
    const KIND: &'static str;
    const ID_PREFIX: &'static str;

    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: String);
    /// Key hashed into the row ID. Must be unique within the collection.
    fn id_key(&self) -> String;
}

impl StoredRecord for EquipmentUnit {
    const KIND: &'static str = "equipment";
    const ID_PREFIX: &'static str = "eq";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
    fn id_key(&self) -> String {
        format!("equipment:{}", self.code)
    }
}

impl StoredRecord for MaintenanceSchedule {
    const KIND: &'static str = "schedule";
    const ID_PREFIX: &'static str = "ms";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
    fn id_key(&self) -> String {
        format!("schedule:{}:{}", self.equipment_id, self.name)
    }
}

impl StoredRecord for WorkOrder {
    const KIND: &'static str = "work order";
    const ID_PREFIX: &'static str = "wo";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
    fn id_key(&self) -> String {
        format!(
            "work_order:{}:{}:{}",
            self.equipment_id,
            self.title,
            self.requested_at.to_rfc3339()
        )
    }
}

impl StoredRecord for MaintenanceRecord {
    const KIND: &'static str = "maintenance record";
    const ID_PREFIX: &'static str = "mr";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
    fn id_key(&self) -> String {
        format!(
            "record:{}:{}:{}",
            self.equipment_id,
            self.performed_at.to_rfc3339(),
            self.work_performed
        )
    }
}

impl StoredRecord for DowntimeEvent {
    const KIND: &'static str = "downtime event";
    const ID_PREFIX: &'static str = "dt";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
    fn id_key(&self) -> String {
        format!(
            "downtime:{}:{}",
            self.equipment_id,
            self.started_at.to_rfc3339()
        )
    }
}

impl StoredRecord for Receipt {
    const KIND: &'static str = "receipt";
    const ID_PREFIX: &'static str = "rc";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
    fn id_key(&self) -> String {
        format!(
            "receipt:{}:{}:{}:{}",
            self.equipment_id,
            self.vendor,
            self.date.to_rfc3339(),
            self.amount
        )
    }
}

/// Read all rows from a JSONL collection file.
/// Returns an empty vec if the file doesn't exist.
pub fn read_collection<T: StoredRecord>(file_path: &Path) -> Result<Vec<T>> {
    let content = match fs::read_to_string(file_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut rows = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let row: T = serde_json::from_str(trimmed)?;
        rows.push(row);
    }

    Ok(rows)
}

/// Append a single row to a JSONL collection. Generates an ID if missing.
pub fn append_row<T: StoredRecord>(file_path: &Path, row: &mut T) -> Result<()> {
    if row.id().is_none() {
        row.set_id(generate_id(T::ID_PREFIX, &row.id_key()));
    }
    let mut line = serde_json::to_string(row)?;
    line.push('\n');

    if let Some(dir) = file_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Atomically rewrite a JSONL collection (temp file + rename).
pub fn write_collection<T: StoredRecord>(file_path: &Path, rows: &mut [T]) -> Result<()> {
    for row in rows.iter_mut() {
        if row.id().is_none() {
            row.set_id(generate_id(T::ID_PREFIX, &row.id_key()));
        }
    }

    let dir = file_path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;

    for row in rows.iter() {
        let line = serde_json::to_string(row)?;
        writeln!(tmp, "{line}")?;
    }

    tmp.flush()?;

    // Persist atomically (rename)
    tmp.persist(file_path).map_err(std::io::Error::other)?;

    Ok(())
}

/// Find a row by full ID or unambiguous prefix.
pub fn find_by_id<'a, T: StoredRecord>(rows: &'a [T], id: &str) -> Result<&'a T> {
    let matches: Vec<&T> = rows
        .iter()
        .filter(|r| r.id().is_some_and(|rid| rid.starts_with(id)))
        .collect();
    match matches.len() {
        0 => Err(UpkeepError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }),
        1 => Ok(matches[0]),
        n => Err(UpkeepError::AmbiguousId {
            id: id.to_string(),
            count: n,
            ids: matches
                .iter()
                .filter_map(|r| r.id())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Like [`find_by_id`], but returns the row index for in-place updates.
pub fn find_index_by_id<T: StoredRecord>(rows: &[T], id: &str) -> Result<usize> {
    let matches: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.id().is_some_and(|rid| rid.starts_with(id)))
        .map(|(i, _)| i)
        .collect();
    match matches.len() {
        0 => Err(UpkeepError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }),
        1 => Ok(matches[0]),
        n => Err(UpkeepError::AmbiguousId {
            id: id.to_string(),
            count: n,
            ids: matches
                .iter()
                .filter_map(|&i| rows[i].id())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
