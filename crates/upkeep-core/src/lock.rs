use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use crate::error::{Result, UpkeepError};

const LOCK_STALE_MS: u64 = 30_000;
const LOCK_RETRY_INTERVAL_MS: u64 = 50;
const LOCK_TIMEOUT_MS: u64 = 5_000;

fn lock_path(file_path: &Path) -> PathBuf {
    let mut p = file_path.as_os_str().to_owned();
    p.push(".lock");
    PathBuf::from(p)
}

fn is_stale_lock(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => match meta.modified() {
            Ok(modified) => {
                let age = SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO);
                age.as_millis() > LOCK_STALE_MS as u128
            }
            Err(_) => false,
        },
        Err(_) => false,
    }
}

fn acquire_lock(path: &Path) -> Result<()> {
    let deadline = Instant::now() + Duration::from_millis(LOCK_TIMEOUT_MS);

    loop {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if is_stale_lock(path) {
                    let _ = fs::remove_file(path);
                    continue;
                }

                if Instant::now() >= deadline {
                    return Err(UpkeepError::LockTimeout(path.display().to_string()));
                }

                thread::sleep(Duration::from_millis(LOCK_RETRY_INTERVAL_MS));
            }
            Err(e) => return Err(UpkeepError::Io(e)),
        }
    }
}

fn release_lock(path: &Path) {
    let _ = fs::remove_file(path);
}

/// Execute a closure while holding an advisory file lock on a collection.
///
/// Work-order transitions and downtime-close are read-modify-write cycles;
/// callers reread the row inside the lock and compare against the state
/// they validated, so a concurrent writer surfaces as
/// `ConcurrentModification` instead of a silent overwrite.
pub fn with_file_lock<T, F>(file_path: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let lp = lock_path(file_path);
    acquire_lock(&lp)?;
    let result = f();
    release_lock(&lp);
    result
}
