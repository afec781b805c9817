use serde::{Deserialize, Serialize};

use crate::domain::{CatalogItem, Entity, Order};

/// Everything the local store persists, written as one blob:
/// `{ "products": [...], "orders": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<CatalogItem>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Maps an entity kind onto its collection inside the snapshot
pub trait Collection: Entity {
    fn collection(snapshot: &Snapshot) -> &Vec<Self>;
    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

impl Collection for CatalogItem {
    fn collection(snapshot: &Snapshot) -> &Vec<Self> {
        &snapshot.products
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.products
    }
}

impl Collection for Order {
    fn collection(snapshot: &Snapshot) -> &Vec<Self> {
        &snapshot.orders
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.orders
    }
}
