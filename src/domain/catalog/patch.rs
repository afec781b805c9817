use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::value_objects::ItemStatus;
use crate::domain::lenient;

/// Partial catalog item as sent by create/update callers.
///
/// Absent fields are left alone on merge. Numeric fields accept numbers or
/// numeric strings; unparseable values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemPatch {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub reorder_level: Option<i64>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub daily_sales: Option<i64>,
    /// Only honoured when the item is first created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
