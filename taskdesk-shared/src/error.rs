/// Domain error kinds
///
/// Every rule in the authorization and task-lifecycle engine reports failure
/// through [`DomainError`]. The core never recovers from these internally;
/// callers map each kind to a transport-level response.
///
/// | Kind | Meaning | HTTP |
/// |---|---|---|
/// | `Unauthenticated` | no actor | 401 |
/// | `Forbidden` | actor known, action denied by policy | 403 |
/// | `Validation` | malformed input (role, status, date, missing field) | 422 |
/// | `NotFound` | referenced entity absent | 404 |
/// | `RuleViolation` | well-formed input that breaks a business rule | 422 |
///
/// Messages are safe to show to clients: they never carry internal detail.

/// Result alias for rule checks
pub type DomainResult<T> = Result<T, DomainError>;

/// Error kinds produced by the rules engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// No authenticated actor
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Actor identified but the action is denied
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed input
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Input is well-formed but breaks a business rule
    #[error("Rule violation: {0}")]
    RuleViolation(String),
}

impl DomainError {
    /// Shorthand for a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden(message.into())
    }

    /// Shorthand for a validation error on a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a missing entity
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Shorthand for a business rule violation
    pub fn rule(message: impl Into<String>) -> Self {
        DomainError::RuleViolation(message.into())
    }

    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::Validation { .. } => "validation_error",
            DomainError::NotFound(_) => "not_found",
            DomainError::RuleViolation(_) => "rule_violation",
        }
    }
}
