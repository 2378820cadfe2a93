use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::models::ProgressSnapshot;

/// Version of the persisted snapshot blob. Bump when the shape changes
/// and add a branch to `migrate`.
pub const SNAPSHOT_VERSION: i64 = 1;

/// The local durable blob store: whole-snapshot save on every mutation,
/// whole-snapshot load at startup.
pub trait SnapshotStore {
    fn save(&self, snapshot: &ProgressSnapshot) -> Result<()>;
    fn load(&self) -> Result<Option<ProgressSnapshot>>;
}

#[derive(Serialize, Deserialize)]
struct PersistedSnapshot {
    version: i64,
    snapshot: ProgressSnapshot,
}

fn migrate(persisted: PersistedSnapshot) -> Result<ProgressSnapshot> {
    match persisted.version {
        SNAPSHOT_VERSION => Ok(persisted.snapshot),
        v if v > SNAPSHOT_VERSION => {
            bail!("Snapshot version {v} is newer than supported version {SNAPSHOT_VERSION}")
        }
        v => bail!("Unknown snapshot version {v}"),
    }
}

/// Snapshot store backed by a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        let persisted = PersistedSnapshot {
            version: SNAPSHOT_VERSION,
            snapshot: snapshot.clone(),
        };
        let payload = serde_json::to_vec_pretty(&persisted)?;
        std::fs::write(&self.path, payload)
            .with_context(|| format!("Failed to write snapshot: {}", self.path.display()))?;
        Ok(())
    }

    fn load(&self) -> Result<Option<ProgressSnapshot>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read snapshot: {}", self.path.display())
                });
            }
        };
        let persisted: PersistedSnapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse snapshot: {}", self.path.display()))?;
        Ok(Some(migrate(persisted)?))
    }
}

/// In-memory snapshot store for tests and embedding. `fail_saves` makes
/// every save return an error so callers can exercise the best-effort
/// persistence contract.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Option<ProgressSnapshot>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The last snapshot successfully saved, if any.
    pub fn saved(&self) -> Option<ProgressSnapshot> {
        self.inner.lock().expect("memory store poisoned").clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            bail!("Simulated storage failure");
        }
        *self.inner.lock().expect("memory store poisoned") = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<ProgressSnapshot>> {
        Ok(self.inner.lock().expect("memory store poisoned").clone())
    }
}
