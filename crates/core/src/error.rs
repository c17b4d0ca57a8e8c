use crate::types::DbId;

/// Domain error taxonomy shared by every catalog operation.
///
/// Each variant is terminal for the operation that raised it. The API layer
/// maps [`CoreError::kind`] to a transport status; the core only guarantees a
/// distinguishable kind plus a human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed time-code or identifier.
    #[error("Format error: {0}")]
    Format(String),

    /// Interval outside `[0, 3600]` or `start >= end`.
    #[error("Range error: {0}")]
    Range(String),

    /// Candidate interval conflicts with an existing one.
    #[error("Overlap error: {0}")]
    Overlap(String),

    /// Candidate interval does not start where the timeline ends.
    #[error("Gap error: {0}")]
    Gap(String),

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// The value exists but is not legal for the requested type.
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// Duplicate active entity under a uniqueness invariant.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The episode revision moved between snapshot and commit.
    #[error("Concurrent write detected on episode {episode_id}")]
    ConcurrentWrite { episode_id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for results carrying a [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] keyed by anything displayable.
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Stable machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format(_) => "FORMAT_ERROR",
            Self::Range(_) => "RANGE_ERROR",
            Self::Overlap(_) => "OVERLAP_ERROR",
            Self::Gap(_) => "GAP_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NotAllowed(_) => "NOT_ALLOWED",
            Self::Conflict(_) | Self::ConcurrentWrite { .. } => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
