// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use presta::CoreError;
use presta_domain::DomainError;
use presta_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The store failed while authenticating.
    Internal {
        /// A description of the failure.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the caller does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request collides with an existing resource.
    Conflict {
        /// The type of resource in conflict.
        resource_type: String,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} conflict: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::Internal { message } => Self::Internal { message },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidEnumValue { kind, .. } => invalid_input(kind, message),
        DomainError::InvalidTestKey(_) => invalid_input("key", message),
        DomainError::InvalidTestName(_) => invalid_input("name", message),
        DomainError::InvalidVariants(_) => invalid_input("variants", message),
        DomainError::MissingSubject => invalid_input("session_id", message),
        DomainError::InvalidConversionType(_) => invalid_input("conversion_type", message),
        DomainError::InvalidAchievement { field, .. }
        | DomainError::InvalidContactField { field, .. }
        | DomainError::InvalidTestimonialField { field, .. } => invalid_input(field, message),
        DomainError::InvalidRating(_) => invalid_input("rating", message),
        DomainError::InvalidCity(_) => invalid_input("city", message),
        DomainError::InvalidPhotoContentType(_) => invalid_input("content_type", message),
        DomainError::PhotoTooLarge { .. } => invalid_input("size_bytes", message),
        DomainError::InvalidPhotoPath(_) => invalid_input("storage_path", message),
        DomainError::DuplicateTestKey(_) => ApiError::Conflict {
            resource_type: String::from("A/B test"),
            message,
        },
        DomainError::DuplicateAchievementCode(_) => ApiError::Conflict {
            resource_type: String::from("Achievement"),
            message,
        },
        DomainError::TestNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("A/B test"),
            message,
        },
        DomainError::CategoryNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Category"),
            message,
        },
        DomainError::TestimonialNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Testimonial"),
            message,
        },
        DomainError::TestNotAvailable(_) => ApiError::DomainRuleViolation {
            rule: String::from("test_running"),
            message,
        },
        DomainError::NoAssignment { .. } => ApiError::DomainRuleViolation {
            rule: String::from("assignment_required"),
            message,
        },
        DomainError::TestimonialAlreadyModerated { .. } => ApiError::DomainRuleViolation {
            rule: String::from("moderate_pending_only"),
            message,
        },
        DomainError::PhotoLimitReached { .. } => ApiError::DomainRuleViolation {
            rule: String::from("photos_per_review"),
            message,
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Store(store_err) => ApiError::Internal {
            message: store_err.to_string(),
        },
        CoreError::Internal(msg) => ApiError::Internal {
            message: format!("Internal error: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Unique-constraint rejections become `Conflict` for `resource_type`;
/// everything else is internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError, resource_type: &str) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(message) => ApiError::Conflict {
            resource_type: resource_type.to_string(),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
