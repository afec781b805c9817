// ============================================================================
// Catalog Domain - products sold through the storefront
// ============================================================================

pub mod entity;
pub mod patch;
pub mod value_objects;

pub use entity::*;
pub use patch::*;
pub use value_objects::*;
