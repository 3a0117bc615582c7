//! Contact storage error types
//!
//! Errors raised while a storage talks to its backend. Storages that are
//! read-path only (such as the team directory) never surface these to the
//! combined search; they log them and contribute nothing instead.

use thiserror::Error;

/// Error that can occur while a storage serves a contact request.
#[derive(Debug, Error)]
pub enum ContactsError {
    /// No connection is available; an earlier attempt to connect failed or
    /// the storage is disabled.
    #[error("directory connection unavailable")]
    ConnectionUnavailable,

    /// Failed to establish a connection to the backend.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend rejected the configured bind credentials.
    #[error("authentication failed: invalid bind credentials")]
    AuthenticationFailed,

    /// A search request failed.
    #[error("search failed: {message}")]
    SearchFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A raw entry lacks the attribute used as the contact identifier.
    #[error("entry '{dn}' has no value for identifier attribute '{attribute}'")]
    EntryMissingUid { dn: String, attribute: String },

    /// Storage configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl ContactsError {
    /// Check if this error is transient and a later request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ContactsError::ConnectionFailed { .. } | ContactsError::SearchFailed { .. }
        )
    }

    /// Get an error code for classification in logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            ContactsError::ConnectionUnavailable => "CONNECTION_UNAVAILABLE",
            ContactsError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ContactsError::AuthenticationFailed => "AUTH_FAILED",
            ContactsError::SearchFailed { .. } => "SEARCH_FAILED",
            ContactsError::EntryMissingUid { .. } => "ENTRY_MISSING_UID",
            ContactsError::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ContactsError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ContactsError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a search failed error.
    pub fn search_failed(message: impl Into<String>) -> Self {
        ContactsError::SearchFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a search failed error with source.
    pub fn search_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ContactsError::SearchFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ContactsError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for contact storage operations.
pub type ContactsResult<T> = Result<T, ContactsError>;
