use thiserror::Error;

use crate::domain::{EntityKind, ValidationError};
use crate::store::StoreError;

/// Failures of the local path. Remote failures never surface here.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ControllerError {
    /// Caused by the caller's input rather than by local state
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ControllerError::Validation(_) | ControllerError::Store(StoreError::Validation(_))
        )
    }
}
