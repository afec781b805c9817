use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::Entity;

/// `{current, pages, total, limit}` - identical on both paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current: u64,
    pub pages: u64,
    pub total: u64,
    pub limit: i64,
}

/// One page of entities
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Serializes as `{ "<collection>": [...], "pagination": {...} }`,
/// e.g. `{ "orders": [...], "pagination": {...} }`
impl<E: Entity> Serialize for Page<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(E::KIND.collection_name(), &self.items)?;
        map.serialize_entry("pagination", &self.pagination)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalogItem, CatalogItemPatch};
    use chrono::Utc;

    #[test]
    fn test_page_serializes_under_collection_name() {
        let item = CatalogItem::from_patch("p1".into(), CatalogItemPatch::default(), Utc::now()).unwrap();
        let page = Page {
            items: vec![item],
            pagination: Pagination {
                current: 1,
                pages: 1,
                total: 1,
                limit: 10,
            },
        };

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["products"][0]["_id"], "p1");
        assert_eq!(value["pagination"]["pages"], 1);
        assert_eq!(value.as_object().unwrap().len(), 2);
    }
}
