use thiserror::Error;

use super::request::Outcome;
use super::resource::{Action, ResourceKind};
use crate::store::StoreError;
use crate::Id;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("{kind} {id} not found")]
    ResourceNotFound { kind: ResourceKind, id: Id },

    #[error("{action} on {kind} needs a resource or parent id")]
    MissingResourceId { kind: ResourceKind, action: Action },

    #[error("No policy defined for {action} on {kind}")]
    PolicyNotFound { kind: ResourceKind, action: Action },

    #[error("Resource lookup failed: {0}")]
    Store(String),
}

impl AuthorizationError {
    /// Fold the error into the three-way result handed to callers.
    ///
    /// Lookup failures and missing policies deny access.
    pub fn outcome(&self) -> Outcome {
        match self {
            AuthorizationError::Unauthenticated | AuthorizationError::Forbidden => {
                Outcome::Forbidden
            }
            AuthorizationError::ResourceNotFound { .. }
            | AuthorizationError::MissingResourceId { .. } => Outcome::ResourceNotFound,
            AuthorizationError::PolicyNotFound { .. } | AuthorizationError::Store(_) => {
                Outcome::Forbidden
            }
        }
    }
}

impl From<StoreError> for AuthorizationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => AuthorizationError::ResourceNotFound { kind, id },
            StoreError::Backend(message) => AuthorizationError::Store(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(AuthorizationError::Unauthenticated.outcome(), Outcome::Forbidden);
        assert_eq!(AuthorizationError::Forbidden.outcome(), Outcome::Forbidden);
        assert_eq!(
            AuthorizationError::ResourceNotFound {
                kind: ResourceKind::Lesson,
                id: 1
            }
            .outcome(),
            Outcome::ResourceNotFound
        );
        assert_eq!(
            AuthorizationError::MissingResourceId {
                kind: ResourceKind::Course,
                action: Action::Update
            }
            .outcome(),
            Outcome::ResourceNotFound
        );
        assert_eq!(
            AuthorizationError::Store("connection reset".into()).outcome(),
            Outcome::Forbidden
        );
    }

    #[test]
    fn test_store_errors_convert() {
        let err: AuthorizationError = StoreError::not_found(ResourceKind::Progress, 4).into();
        assert_eq!(
            err,
            AuthorizationError::ResourceNotFound {
                kind: ResourceKind::Progress,
                id: 4
            }
        );
        assert_eq!(err.to_string(), "progress 4 not found");
    }
}
