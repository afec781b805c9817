// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (LineItem, Pricing, Payment, Fulfillment, statuses)
// - Patches (partial create/update input)
// - The Order entity and its explicit merge
//
// ============================================================================

pub mod entity;
pub mod patch;
pub mod value_objects;

pub use entity::*;
pub use patch::*;
pub use value_objects::*;
