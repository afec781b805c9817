use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::errors::StoreError;
use super::snapshot::Snapshot;

// ============================================================================
// Snapshot Backends - durable home of the local store
// ============================================================================
//
// A backend stores two things:
// 1. The snapshot blob (both collections, always written whole)
// 2. A single string flag holding the preferred data mode
//
// FileBackend writes to a temporary sibling and renames it into place, so a
// reader only ever sees the previous blob or the new one.
//
// ============================================================================

pub trait SnapshotBackend: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    fn load_mode_flag(&self) -> Result<Option<String>, StoreError>;

    fn save_mode_flag(&self, flag: &str) -> Result<(), StoreError>;

    /// Human-readable location for logs and error messages
    fn location(&self) -> String;
}

fn parse_snapshot(raw: &str, location: &str) -> Result<Snapshot, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
        location: location.to_string(),
        reason: e.to_string(),
    })
}

fn encode_snapshot(snapshot: &Snapshot, location: &str) -> Result<String, StoreError> {
    serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Corrupt {
        location: location.to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// File Backend
// ============================================================================

pub struct FileBackend {
    path: PathBuf,
    mode_path: PathBuf,
}

impl FileBackend {
    /// The mode flag lives next to the blob as `<file>.mode`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut mode_path = path.clone().into_os_string();
        mode_path.push(".mode");
        Self {
            path,
            mode_path: PathBuf::from(mode_path),
        }
    }

    fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(contents.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StoreError::io(&tmp, e))?;
        drop(file);

        fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        match Self::read_optional(&self.path)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_snapshot(&raw, &self.location()).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let encoded = encode_snapshot(snapshot, &self.location())?;
        Self::write_atomic(&self.path, &encoded)
    }

    fn load_mode_flag(&self) -> Result<Option<String>, StoreError> {
        Ok(Self::read_optional(&self.mode_path)?
            .map(|flag| flag.trim().to_string())
            .filter(|flag| !flag.is_empty()))
    }

    fn save_mode_flag(&self, flag: &str) -> Result<(), StoreError> {
        Self::write_atomic(&self.mode_path, flag)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// Memory Backend - ephemeral sessions and tests
// ============================================================================

#[derive(Default)]
pub struct MemoryBackend {
    blob: Mutex<Option<String>>,
    mode_flag: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-serialized blob, as if read from disk
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(raw.into())),
            ..Self::default()
        }
    }

    pub fn with_mode_flag(self, flag: impl Into<String>) -> Self {
        *self.mode_flag.lock().unwrap_or_else(|p| p.into_inner()) = Some(flag.into());
        self
    }

    /// Make every subsequent save fail with an I/O error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self) -> Option<String> {
        self.blob.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::io(
                self.location(),
                std::io::Error::new(std::io::ErrorKind::Other, "writes disabled"),
            ));
        }
        Ok(())
    }
}

impl SnapshotBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let blob = self.blob.lock().unwrap_or_else(|p| p.into_inner());
        blob.as_deref()
            .map(|raw| parse_snapshot(raw, &self.location()))
            .transpose()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.check_writable()?;
        let encoded = encode_snapshot(snapshot, &self.location())?;
        *self.blob.lock().unwrap_or_else(|p| p.into_inner()) = Some(encoded);
        Ok(())
    }

    fn load_mode_flag(&self) -> Result<Option<String>, StoreError> {
        Ok(self.mode_flag.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn save_mode_flag(&self, flag: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.mode_flag.lock().unwrap_or_else(|p| p.into_inner()) = Some(flag.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
