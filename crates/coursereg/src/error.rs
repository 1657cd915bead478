//! Error types shared by the store, the evaluator and the schedule mutator.

use thiserror::Error;

/// Errors that can occur while reading or mutating registration data.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// A requirement must be measured in hours or in classes, never both or neither
    #[error("Invalid requirement '{name}': exactly one of required_hours/required_classes must be set")]
    InvalidRequirement { name: String },

    /// A remove-section request did not designate a section
    #[error("No section specified for removal")]
    NoSectionSpecified,

    /// A referenced row does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A stored course query could not be decoded or compiled
    #[error("Invalid course query: {message}")]
    InvalidQuery { message: String },

    /// Input rejected before it reached the store
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The underlying SQLite call failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading seed files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the connection lock
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl RegistrarError {
    /// Shorthand for a [`RegistrarError::NotFound`].
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        RegistrarError::NotFound { entity, id }
    }

    /// Returns true if this error refers to a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistrarError::NotFound { .. })
    }

    /// Returns true if the caller sent something we refuse to act on.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RegistrarError::InvalidRequirement { .. }
                | RegistrarError::NoSectionSpecified
                | RegistrarError::InvalidQuery { .. }
                | RegistrarError::InvalidInput { .. }
        )
    }
}

pub type Result<T, E = RegistrarError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(RegistrarError::not_found("Schedule", 3).is_not_found());
        assert!(RegistrarError::NoSectionSpecified.is_client_error());
        assert!(!RegistrarError::LockPoisoned.is_client_error());
        assert_eq!(
            RegistrarError::not_found("Section", 12).to_string(),
            "Section 12 not found"
        );
    }
}
