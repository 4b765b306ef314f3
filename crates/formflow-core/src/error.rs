//! Error types for the FormFlow application.

use thiserror::Error;

/// A shared error type for the entire FormFlow workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum FormError {
    /// Network failure or non-success status without a structured detail
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The collaborator service was reachable but reported an explicit error
    #[error("Collaborator error: {detail}")]
    Collaborator { detail: String },

    /// Operation attempted without its required inputs (no fields, no document)
    #[error("Precondition not met: {0}")]
    Precondition(String),

    /// A session bootstrap or chat round-trip is still in flight
    #[error("A request is already in flight")]
    RequestInFlight,

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FormError {
    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Collaborator error
    pub fn collaborator(detail: impl Into<String>) -> Self {
        Self::Collaborator {
            detail: detail.into(),
        }
    }

    /// Creates a Precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a Collaborator error
    pub fn is_collaborator(&self) -> bool {
        matches!(self, Self::Collaborator { .. })
    }

    /// Check if this error means another request is still running
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::RequestInFlight)
    }

    /// Returns the human-readable detail for display in the transcript.
    ///
    /// Collaborator errors surface the service-reported detail verbatim;
    /// every other variant falls back to its `Display` form.
    pub fn detail(&self) -> String {
        match self {
            Self::Collaborator { detail } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FormError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FormError>`.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_detail_is_surfaced_verbatim() {
        let err = FormError::collaborator("Example file not found on server.");
        assert_eq!(err.detail(), "Example file not found on server.");
        assert!(err.is_collaborator());
    }

    #[test]
    fn transport_detail_uses_display_form() {
        let err = FormError::transport("connection refused");
        assert_eq!(err.detail(), "Transport failure: connection refused");
        assert!(err.is_transport());
    }

    #[test]
    fn busy_check_matches_only_in_flight() {
        assert!(FormError::RequestInFlight.is_busy());
        assert!(!FormError::precondition("no fields").is_busy());
    }
}
