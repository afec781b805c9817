use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patch::CatalogItemPatch;
use super::value_objects::{ItemStatus, DEFAULT_REORDER_LEVEL};
use crate::domain::errors::{non_negative, non_negative_count, ValidationError};
use crate::domain::lenient::js_number;
use crate::domain::{touch, Entity, EntityKind, FieldValue, Queryable};

// ============================================================================
// Catalog Item
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "js_number")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub stock: u64,
    pub reorder_level: u64,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub daily_sales: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }
}

impl Entity for CatalogItem {
    type Patch = CatalogItemPatch;

    const KIND: EntityKind = EntityKind::CatalogItem;

    fn id(&self) -> &str {
        &self.id
    }

    fn patch_id(patch: &CatalogItemPatch) -> Option<&str> {
        patch.id.as_deref()
    }

    fn from_patch(id: String, patch: CatalogItemPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }

        let created_at = patch.created_at.unwrap_or(now);
        let mut item = CatalogItem {
            id,
            name: String::new(),
            price: 0.0,
            category: None,
            sku: None,
            tags: Vec::new(),
            stock: 0,
            reorder_level: DEFAULT_REORDER_LEVEL,
            status: ItemStatus::Active,
            daily_sales: 0,
            created_at,
            updated_at: created_at,
        };
        item.merge(patch, now)?;
        Ok(item)
    }

    fn merge(&mut self, patch: CatalogItemPatch, now: DateTime<Utc>) -> Result<(), ValidationError> {
        // Validate everything first so a rejected patch leaves the item untouched
        let price = patch.price.map(|p| non_negative("price", p)).transpose()?;
        let stock = patch.stock.map(|s| non_negative_count("stock", s)).transpose()?;
        let reorder_level = patch
            .reorder_level
            .map(|r| non_negative_count("reorderLevel", r))
            .transpose()?;
        let daily_sales = patch
            .daily_sales
            .map(|d| non_negative_count("dailySales", d))
            .transpose()?;

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if patch.category.is_some() {
            self.category = patch.category;
        }
        if patch.sku.is_some() {
            self.sku = patch.sku;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(stock) = stock {
            self.stock = stock;
        }
        if let Some(reorder_level) = reorder_level {
            self.reorder_level = reorder_level;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(daily_sales) = daily_sales {
            self.daily_sales = daily_sales;
        }

        self.updated_at = touch(self.updated_at, now);
        Ok(())
    }
}

impl Queryable for CatalogItem {
    fn field(&self, path: &str) -> Option<FieldValue> {
        match path {
            "_id" | "id" => Some(FieldValue::text(&self.id)),
            "name" => Some(FieldValue::text(&self.name)),
            "price" => Some(FieldValue::Number(self.price)),
            "category" => self.category.as_deref().map(FieldValue::text),
            "sku" => self.sku.as_deref().map(FieldValue::text),
            "stock" => Some(FieldValue::Number(self.stock as f64)),
            "reorderLevel" => Some(FieldValue::Number(self.reorder_level as f64)),
            "status" => Some(FieldValue::text(self.status.as_str())),
            "dailySales" => Some(FieldValue::Number(self.daily_sales as f64)),
            "createdAt" => Some(FieldValue::Time(self.created_at)),
            "updatedAt" => Some(FieldValue::Time(self.updated_at)),
            _ => None,
        }
    }

    fn search_text(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.category.as_deref());
        fields.extend(self.sku.as_deref());
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
