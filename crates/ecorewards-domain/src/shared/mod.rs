use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(UserId);
define_id!(TierId);
define_id!(ActivityTypeId);
define_id!(ActivityEventId);
define_id!(SharingEventId);
define_id!(AchievementId);
define_id!(ResetRecordId);
define_id!(DrawId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    UserNotFound = 2001,
    ActivityTypeNotFound = 2002,
    TierNotFound = 2003,
    AchievementNotFound = 2004,

    // Business Logic (3xxx)
    ConcurrencyConflict = 3001,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    DatabaseConstraintViolation = 4002,
    SerializationError = 4003,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    ExternalServiceError = 5002,
    TimeoutError = 5003,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::UserNotFound
            | ErrorCode::ActivityTypeNotFound
            | ErrorCode::TierNotFound
            | ErrorCode::AchievementNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::ConcurrencyConflict
            | ErrorCode::ExternalServiceError
            | ErrorCode::TimeoutError => ErrorSeverity::Warning,

            ErrorCode::RepositoryError
            | ErrorCode::DatabaseConstraintViolation
            | ErrorCode::SerializationError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ConcurrencyConflict
                | ErrorCode::ExternalServiceError
                | ErrorCode::TimeoutError
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Activity type not found: {0}")]
    ActivityTypeNotFound(String),

    #[error("Subscription tier not found: {0}")]
    TierNotFound(String),

    #[error("Achievement not found: {0}")]
    AchievementNotFound(String),

    /// Lost a reset/unlock race. Callers treat this as success-no-op.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::UserNotFound(_) => ErrorCode::UserNotFound,
            DomainError::ActivityTypeNotFound(_) => ErrorCode::ActivityTypeNotFound,
            DomainError::TierNotFound(_) => ErrorCode::TierNotFound,
            DomainError::AchievementNotFound(_) => ErrorCode::AchievementNotFound,
            DomainError::ConcurrencyConflict(_) => ErrorCode::ConcurrencyConflict,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::ExternalService(_) => ErrorCode::ExternalServiceError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
