use super::EntityKind;

// ============================================================================
// Entity Validation Errors
// ============================================================================
//
// Raised while normalizing a patch into a typed entity. Anything reported
// here is a caller mistake, never a storage problem.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("Identifier cannot be empty")]
    EmptyId,

    #[error("Order number already in use: {0}")]
    DuplicateOrderNumber(String),

    #[error("Malformed {kind} payload: {reason}")]
    Malformed { kind: EntityKind, reason: String },
}

impl ValidationError {
    pub fn malformed(kind: EntityKind, err: impl std::fmt::Display) -> Self {
        ValidationError::Malformed {
            kind,
            reason: err.to_string(),
        }
    }
}

/// Reject negative floats, keeping the field name for the error message
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

/// Reject negative integers and narrow to u64
pub(crate) fn non_negative_count(field: &'static str, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value).map_err(|_| ValidationError::Negative {
        field,
        value: value as f64,
    })
}
