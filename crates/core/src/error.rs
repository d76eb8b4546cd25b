//! Domain-level error taxonomy.
//!
//! [`CoreError`] carries everything a caller needs to map the failure to
//! an HTTP status or a stream error frame. The HTTP mapping itself lives
//! in the API crate; this crate stays transport-agnostic.

/// A domain-level error.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup came up empty.
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// The request payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// The request conflicts with existing state (e.g. a different
    /// generation is already in flight for this user).
    #[error("{0}")]
    Conflict(String),

    /// No authenticated identity.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this resource.
    #[error("{0}")]
    Forbidden(String),

    /// A required collaborator is not configured (e.g. no executor to
    /// dispatch generation jobs to).
    #[error("{0}")]
    Configuration(String),

    /// A wall-clock budget expired before the operation finished.
    #[error("{0}")]
    Timeout(String),

    /// The external executor reported a failure.
    #[error("{0}")]
    Upstream(String),

    /// Anything else. The message is logged server-side and never shown
    /// to clients verbatim.
    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] with a displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
