// ============================================================================
// Domain Layer - Catalog Items and Orders
// ============================================================================
//
// Each entity kind has its own subdirectory with:
// - Value objects
// - The typed entity
// - A typed patch and the explicit merge that applies it
//
// The Entity trait is what the store, the query engine and the controller
// are generic over. Nothing here knows how entities are persisted.
//
// ============================================================================

pub mod catalog;
pub mod errors;
pub mod lenient;
pub mod order;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::Calendar;

pub use catalog::{CatalogItem, CatalogItemPatch, ItemStatus};
pub use errors::ValidationError;
pub use order::{
    Fulfillment, FulfillmentStatus, LineItem, Order, OrderPatch, OrderStatus, Payment,
    PaymentStatus, Pricing, TimelineEvent,
};

/// The two collections the layer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    CatalogItem,
    Order,
}

impl EntityKind {
    /// Collection key used in list responses and in the persisted blob
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::CatalogItem => "products",
            EntityKind::Order => "orders",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::CatalogItem => write!(f, "catalog item"),
            EntityKind::Order => write!(f, "order"),
        }
    }
}

/// A single field read off an entity for filtering and sorting
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Time(DateTime<Utc>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }
}

/// Read-only view the query engine works against
pub trait Queryable {
    /// Look up a field by name; dotted paths reach into nested blocks
    fn field(&self, path: &str) -> Option<FieldValue>;

    /// Fields a free-text search is matched against
    fn search_text(&self) -> Vec<&str>;

    fn created_at(&self) -> DateTime<Utc>;
}

/// A persisted entity kind with a typed partial-update shape
pub trait Entity: Queryable + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Patch: DeserializeOwned + Default + Clone + fmt::Debug + Send;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Identifier carried inside a patch, if the caller supplied one
    fn patch_id(patch: &Self::Patch) -> Option<&str>;

    /// Build a complete entity from a patch, filling defaults
    fn from_patch(id: String, patch: Self::Patch, now: DateTime<Utc>) -> Result<Self, ValidationError>;

    /// Apply only the fields present in the patch and refresh `updatedAt`
    fn merge(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> Result<(), ValidationError>;

    /// Enforce collection-wide invariants against the other stored entities.
    /// Anything derived from a calendar date uses `calendar`.
    fn check_unique(&mut self, _others: &[Self], _calendar: &Calendar) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// `updatedAt` never moves backwards, even if the clock does
pub(crate) fn touch(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    previous.max(now)
}
