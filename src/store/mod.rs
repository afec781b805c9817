// ============================================================================
// Local Entity Store
// ============================================================================
//
// Structure:
// - backend.rs      - where the snapshot blob and mode flag live (file / memory)
// - snapshot.rs     - the persisted shape and per-kind collection access
// - entity_store.rs - CRUD and upsert over the snapshot
//
// ============================================================================

mod backend;
mod entity_store;
mod errors;
mod snapshot;

pub use backend::{FileBackend, MemoryBackend, SnapshotBackend};
pub use entity_store::EntityStore;
pub use errors::StoreError;
pub use snapshot::{Collection, Snapshot};
