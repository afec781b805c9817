use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Catalog Value Objects
// ============================================================================

/// Lifecycle status of a catalog item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Active,
    Inactive,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reorder threshold applied when a new item does not set one
pub const DEFAULT_REORDER_LEVEL: u64 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_status_serialization() {
        assert_eq!(serde_json::to_string(&ItemStatus::Active).unwrap(), "\"active\"");
        let status: ItemStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, ItemStatus::Inactive);
    }

    #[test]
    fn test_item_status_default_is_active() {
        assert_eq!(ItemStatus::default(), ItemStatus::Active);
    }
}
