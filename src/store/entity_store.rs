use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::backend::{MemoryBackend, SnapshotBackend};
use super::errors::StoreError;
use super::snapshot::{Collection, Snapshot};
use crate::calendar::Calendar;
use crate::clock::Clock;
use crate::domain::Entity;
use crate::query::{matches_filters, FieldFilter};

// ============================================================================
// Entity Store - local persistence of catalog items and orders
// ============================================================================
//
// Responsibilities:
// 1. Own the in-memory snapshot of both collections
// 2. Normalize patches into complete entities (create / upsert / merge)
// 3. Write the whole snapshot back after every mutation
// 4. Roll the in-memory state back if that write fails
//
// Access is synchronous; callers serialize through a single owner.
//
// ============================================================================

pub struct EntityStore {
    backend: Box<dyn SnapshotBackend>,
    snapshot: Snapshot,
    clock: Arc<dyn Clock>,
    calendar: Calendar,
}

impl EntityStore {
    /// Open a store, reading whatever the backend already holds
    pub fn open(backend: Box<dyn SnapshotBackend>, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let snapshot = backend.load()?.unwrap_or_default();

        tracing::info!(
            location = %backend.location(),
            products = snapshot.products.len(),
            orders = snapshot.orders.len(),
            "Opened local entity store"
        );

        Ok(Self {
            backend,
            snapshot,
            clock,
            calendar: Calendar::utc(),
        })
    }

    /// Empty store that never touches disk
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            snapshot: Snapshot::default(),
            clock,
            calendar: Calendar::utc(),
        }
    }

    /// Calendar used for date-derived fields such as order numbers
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Re-read the backend, discarding the in-memory state
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.snapshot = self.backend.load()?.unwrap_or_default();
        Ok(())
    }

    pub fn all<E: Collection>(&self) -> &[E] {
        E::collection(&self.snapshot)
    }

    pub fn list<E: Collection>(&self, filters: &[FieldFilter]) -> Vec<E> {
        self.all::<E>()
            .iter()
            .filter(|entity| matches_filters(*entity, filters))
            .cloned()
            .collect()
    }

    pub fn get<E: Collection>(&self, id: &str) -> Option<E> {
        self.all::<E>().iter().find(|e| e.id() == id).cloned()
    }

    /// Create from a partial. A patch carrying an existing id merges into it,
    /// so the collection never holds two entities with the same id.
    pub fn create<E: Collection>(&mut self, patch: E::Patch) -> Result<E, StoreError> {
        let id = E::patch_id(&patch)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.upsert::<E>(&id, patch)
    }

    /// Merge a partial into an existing entity, creating it when absent
    pub fn update<E: Collection>(&mut self, id: &str, patch: E::Patch) -> Result<E, StoreError> {
        self.upsert::<E>(id, patch)
    }

    /// `Ok(false)` when nothing had that id; state is left untouched
    pub fn delete<E: Collection>(&mut self, id: &str) -> Result<bool, StoreError> {
        let collection = self.all::<E>();
        let Some(index) = collection.iter().position(|e| e.id() == id) else {
            tracing::debug!(kind = %E::KIND, id = %id, "Delete of unknown id");
            return Ok(false);
        };

        let mut next = collection.to_vec();
        next.remove(index);
        self.write_collection::<E>(next)?;

        tracing::debug!(kind = %E::KIND, id = %id, "Deleted entity");
        Ok(true)
    }

    pub fn load_mode_flag(&self) -> Result<Option<String>, StoreError> {
        self.backend.load_mode_flag()
    }

    pub fn save_mode_flag(&self, flag: &str) -> Result<(), StoreError> {
        self.backend.save_mode_flag(flag)
    }

    fn upsert<E: Collection>(&mut self, id: &str, patch: E::Patch) -> Result<E, StoreError> {
        let now = self.clock.now();
        let mut next = self.all::<E>().to_vec();

        let entity = match next.iter().position(|e| e.id() == id) {
            Some(index) => {
                let mut entity = next.remove(index);
                entity.merge(patch, now)?;
                entity.check_unique(&next, &self.calendar)?;
                next.insert(index, entity.clone());
                tracing::debug!(kind = %E::KIND, id = %id, "Updated entity");
                entity
            }
            None => {
                let mut entity = E::from_patch(id.to_string(), patch, now)?;
                entity.check_unique(&next, &self.calendar)?;
                next.push(entity.clone());
                tracing::debug!(kind = %E::KIND, id = %id, "Created entity");
                entity
            }
        };

        self.write_collection::<E>(next)?;
        Ok(entity)
    }

    fn write_collection<E: Collection>(&mut self, next: Vec<E>) -> Result<(), StoreError> {
        let previous = std::mem::replace(E::collection_mut(&mut self.snapshot), next);

        if let Err(e) = self.backend.save(&self.snapshot) {
            *E::collection_mut(&mut self.snapshot) = previous;
            tracing::error!(
                kind = %E::KIND,
                location = %self.backend.location(),
                error = %e,
                "Failed to persist snapshot, in-memory state rolled back"
            );
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{CatalogItem, CatalogItemPatch, Order, OrderPatch, ValidationError};
    use crate::store::FileBackend;
    use chrono::TimeZone;
    use serde_json::json;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()))
    }

    fn item_patch(value: serde_json::Value) -> CatalogItemPatch {
        serde_json::from_value(value).unwrap()
    }

    fn order_patch(value: serde_json::Value) -> OrderPatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_create_then_get_returns_normalized_entity() {
        let mut store = EntityStore::in_memory(clock());
        let created: CatalogItem = store
            .create(item_patch(json!({"name": "Flour", "price": "3.20", "stock": "15"})))
            .unwrap();

        let fetched: CatalogItem = store.get(&created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.price, 3.2);
        assert_eq!(fetched.stock, 15);
        assert_eq!(fetched.reorder_level, 10);
        assert!(!fetched.id.is_empty());
    }

    #[test]
    fn test_create_with_existing_id_does_not_duplicate() {
        let mut store = EntityStore::in_memory(clock());
        store.create::<CatalogItem>(item_patch(json!({"_id": "p1", "name": "A"}))).unwrap();
        store.create::<CatalogItem>(item_patch(json!({"_id": "p1", "price": 9}))).unwrap();

        assert_eq!(store.all::<CatalogItem>().len(), 1);
        let item: CatalogItem = store.get("p1").unwrap();
        assert_eq!(item.name, "A");
        assert_eq!(item.price, 9.0);
    }

    #[test]
    fn test_update_missing_id_upserts() {
        let mut store = EntityStore::in_memory(clock());
        let item: CatalogItem = store.update("p9", item_patch(json!({"name": "Late"}))).unwrap();

        assert_eq!(item.id, "p9");
        assert_eq!(store.get::<CatalogItem>("p9").unwrap().name, "Late");
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let clock = clock();
        let mut store = EntityStore::in_memory(clock.clone());
        let created: CatalogItem = store.create(item_patch(json!({"name": "Milk"}))).unwrap();

        clock.advance(chrono::Duration::minutes(3));
        let updated: CatalogItem = store.update(&created.id, item_patch(json!({"stock": 4}))).unwrap();

        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[test]
    fn test_delete_twice_is_idempotent() {
        let mut store = EntityStore::in_memory(clock());
        store.create::<CatalogItem>(item_patch(json!({"_id": "p1"}))).unwrap();
        store.create::<CatalogItem>(item_patch(json!({"_id": "p2"}))).unwrap();

        assert!(store.delete::<CatalogItem>("p1").unwrap());
        let after_first = store.snapshot().clone();

        assert!(!store.delete::<CatalogItem>("p1").unwrap());
        assert_eq!(store.snapshot(), &after_first);
        assert_eq!(store.all::<CatalogItem>().len(), 1);
    }

    #[test]
    fn test_validation_failure_leaves_state_untouched() {
        let mut store = EntityStore::in_memory(clock());
        store.create::<CatalogItem>(item_patch(json!({"_id": "p1", "price": 5}))).unwrap();
        let before = store.snapshot().clone();

        let result = store.update::<CatalogItem>("p1", item_patch(json!({"price": -5})));
        assert!(matches!(result, Err(StoreError::Validation(ValidationError::Negative { .. }))));
        assert_eq!(store.snapshot(), &before);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let backend = Arc::new(MemoryBackend::new());
        let mut store = EntityStore::open(Box::new(SharedBackend(backend.clone())), clock()).unwrap();
        store.create::<CatalogItem>(item_patch(json!({"_id": "p1"}))).unwrap();

        backend.set_fail_writes(true);
        let result = store.create::<CatalogItem>(item_patch(json!({"_id": "p2"})));
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert_eq!(store.all::<CatalogItem>().len(), 1);
        assert!(store.get::<CatalogItem>("p2").is_none());
    }

    #[test]
    fn test_order_numbers_are_unique() {
        let mut store = EntityStore::in_memory(clock());
        let first: Order = store.create(order_patch(json!({}))).unwrap();
        let second: Order = store.create(order_patch(json!({}))).unwrap();
        assert_ne!(first.order_number, second.order_number);

        let result = store.create::<Order>(order_patch(json!({"orderNumber": first.order_number})));
        assert!(matches!(result, Err(StoreError::Validation(ValidationError::DuplicateOrderNumber(_)))));
    }

    #[test]
    fn test_updating_order_keeps_its_own_number() {
        let mut store = EntityStore::in_memory(clock());
        let order: Order = store.create(order_patch(json!({"orderNumber": "ORD-7"}))).unwrap();
        let updated: Order = store
            .update(&order.id, order_patch(json!({"orderNumber": "ORD-7", "status": "confirmed"})))
            .unwrap();
        assert_eq!(updated.order_number, "ORD-7");
    }

    #[test]
    fn test_list_applies_filters() {
        let mut store = EntityStore::in_memory(clock());
        store.create::<CatalogItem>(item_patch(json!({"name": "A", "category": "tea"}))).unwrap();
        store.create::<CatalogItem>(item_patch(json!({"name": "B", "category": "coffee"}))).unwrap();

        let filters = vec![FieldFilter::equals("category", "tea")];
        let tea: Vec<CatalogItem> = store.list(&filters);
        assert_eq!(tea.len(), 1);
        assert_eq!(tea[0].name, "A");

        assert_eq!(store.list::<CatalogItem>(&[]).len(), 2);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let id = {
            let mut store = EntityStore::open(Box::new(FileBackend::new(&path)), clock()).unwrap();
            let order: Order = store
                .create(order_patch(json!({"items": [{"name": "Mug", "price": 4, "quantity": 2}]})))
                .unwrap();
            order.id
        };

        let store = EntityStore::open(Box::new(FileBackend::new(&path)), clock()).unwrap();
        let order: Order = store.get(&id).unwrap();
        assert_eq!(order.pricing.total, 8.0);

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["products"].is_array());
        assert_eq!(raw["orders"][0]["_id"], id.as_str());
    }

    #[test]
    fn test_open_corrupt_state_fails() {
        let result = EntityStore::open(Box::new(MemoryBackend::with_raw("[1,2")), clock());
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_order_numbers_use_store_calendar() {
        let late = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 23, 30, 0).unwrap()));
        let mut store = EntityStore::in_memory(late).with_calendar(Calendar::with_offset_minutes(120).unwrap());

        let order: Order = store.create(order_patch(json!({}))).unwrap();
        assert_eq!(order.order_number, "ORD-20240511-0001");
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let backend = Arc::new(MemoryBackend::new());
        let mut reader = EntityStore::open(Box::new(SharedBackend(backend.clone())), clock()).unwrap();
        let mut writer = EntityStore::open(Box::new(SharedBackend(backend)), clock()).unwrap();

        writer.create::<CatalogItem>(item_patch(json!({"_id": "p1", "name": "Tea"}))).unwrap();
        assert!(reader.get::<CatalogItem>("p1").is_none());

        reader.reload().unwrap();
        assert_eq!(reader.get::<CatalogItem>("p1").unwrap().name, "Tea");
    }

    /// Lets a test keep a handle on the backend the store owns
    struct SharedBackend(Arc<MemoryBackend>);

    impl SnapshotBackend for SharedBackend {
        fn load(&self) -> Result<Option<Snapshot>, StoreError> {
            self.0.load()
        }
        fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
            self.0.save(snapshot)
        }
        fn load_mode_flag(&self) -> Result<Option<String>, StoreError> {
            self.0.load_mode_flag()
        }
        fn save_mode_flag(&self, flag: &str) -> Result<(), StoreError> {
            self.0.save_mode_flag(flag)
        }
        fn location(&self) -> String {
            self.0.location()
        }
    }
}
