use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::error::AuthorizationError;
use super::policy::PolicyTable;
use super::predicate::EvaluationContext;
use super::request::{AuthorizationRequest, Outcome};
use crate::store::{resolve_facts, resolve_scope_facts, ResourceStore};

/// Single entry point invoked before every operation on a course resource.
///
/// The gate holds no per-request state; clones share the policy table and
/// the store and can be used from any number of tasks at once.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    policies: Arc<PolicyTable>,
    store: Arc<dyn ResourceStore>,
}

impl AuthorizationGate {
    /// Create a gate with the standard policy table.
    ///
    /// Fails if the table does not cover every (kind, action) pair, which
    /// makes an incomplete table a startup error instead of a request error.
    pub fn new(store: Arc<dyn ResourceStore>) -> Result<Self, AuthorizationError> {
        Ok(Self::with_policies(store, PolicyTable::standard()?))
    }

    pub fn with_policies(store: Arc<dyn ResourceStore>, policies: PolicyTable) -> Self {
        Self {
            policies: Arc::new(policies),
            store,
        }
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Evaluate a request, reporting why it failed.
    ///
    /// Unauthenticated principals are rejected before anything else. The
    /// resource is only looked up when the policy needs it, so a missing
    /// resource surfaces before any ownership or enrollment check. Requests
    /// without a resource id (listing, creating) are judged by their parent
    /// record.
    #[instrument(
        skip_all,
        fields(
            principal = %request.principal,
            kind = %request.resource_kind,
            action = %request.action,
            resource_id = ?request.resource_id,
            parent_id = ?request.parent_id,
        )
    )]
    pub async fn check(&self, request: &AuthorizationRequest) -> Result<(), AuthorizationError> {
        let principal = &request.principal;
        if !principal.authenticated {
            debug!("Rejecting unauthenticated principal");
            return Err(AuthorizationError::Unauthenticated);
        }

        let kind = request.resource_kind;
        let action = request.action;
        let policy = self.policies.get(kind, action)?;

        let facts = if policy.requires_resource() {
            let facts = match (request.resource_id, request.parent_id) {
                (Some(id), _) => Some(resolve_facts(self.store.as_ref(), kind, id).await?),
                (None, Some(parent_id)) => {
                    resolve_scope_facts(self.store.as_ref(), kind, parent_id).await?
                }
                (None, None) => None,
            };
            Some(facts.ok_or(AuthorizationError::MissingResourceId { kind, action })?)
        } else {
            None
        };

        let enrolled = match (&facts, principal.profile_id) {
            (Some(facts), Some(student_id))
                if principal.is_student() && policy.requires_enrollment() =>
            {
                self.store.is_enrolled(facts.course_id, student_id).await?
            }
            _ => false,
        };

        let mut ctx = EvaluationContext::new(principal).with_enrollment(enrolled);
        if let Some(facts) = &facts {
            ctx = ctx.with_facts(facts);
        }

        if policy.evaluate(&ctx) {
            debug!("Access granted by {}", policy);
            Ok(())
        } else {
            debug!("Access denied by {}", policy);
            Err(AuthorizationError::Forbidden)
        }
    }

    /// Evaluate a request into the three-way outcome handed to the web layer
    pub async fn authorize(&self, request: &AuthorizationRequest) -> Outcome {
        match self.check(request).await {
            Ok(()) => Outcome::Allowed,
            Err(e) => {
                if matches!(
                    e,
                    AuthorizationError::PolicyNotFound { .. } | AuthorizationError::Store(_)
                ) {
                    error!(
                        "Denying {} on {} for {}: {}",
                        request.action, request.resource_kind, request.principal, e
                    );
                }
                e.outcome()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::{Action, Predicate, Principal, ResourceKind};
    use crate::records::{Course, Enrollment, Lesson};
    use crate::store::{SharedResourceStore, StoreError};
    use async_trait::async_trait;

    async fn create_test_gate() -> (AuthorizationGate, SharedResourceStore) {
        let store = SharedResourceStore::new();
        store.insert_course(Course { id: 7, instructor_id: 1 }).await;
        store.insert_lesson(Lesson { id: 42, course_id: 7 }).await;
        let gate = AuthorizationGate::new(Arc::new(store.clone())).unwrap();
        (gate, store)
    }

    #[tokio::test]
    async fn test_unauthenticated_is_rejected_first() {
        let (gate, _store) = create_test_gate().await;

        // Even a nonexistent resource is not revealed to anonymous callers
        let request = AuthorizationRequest::new(
            Principal::anonymous(),
            ResourceKind::Lesson,
            Action::Retrieve,
        )
        .on(999);
        assert_eq!(
            gate.check(&request).await,
            Err(AuthorizationError::Unauthenticated)
        );
        assert_eq!(gate.authorize(&request).await, Outcome::Forbidden);
    }

    #[tokio::test]
    async fn test_missing_resource_id() {
        let (gate, _store) = create_test_gate().await;

        let request = AuthorizationRequest::new(
            Principal::instructor(2, 1),
            ResourceKind::Course,
            Action::Update,
        );
        assert_eq!(
            gate.check(&request).await,
            Err(AuthorizationError::MissingResourceId {
                kind: ResourceKind::Course,
                action: Action::Update
            })
        );
        assert_eq!(gate.authorize(&request).await, Outcome::ResourceNotFound);
    }

    #[tokio::test]
    async fn test_scoped_requests_use_the_parent() {
        let (gate, store) = create_test_gate().await;
        store
            .insert_enrollment(Enrollment { id: 1, course_id: 7, student_id: 6 })
            .await;

        let create = |principal| {
            AuthorizationRequest::new(principal, ResourceKind::Progress, Action::Create).within(1)
        };
        assert_eq!(gate.authorize(&create(Principal::student(10, 6))).await, Outcome::Allowed);
        assert_eq!(
            gate.authorize(&create(Principal::student(11, 5))).await,
            Outcome::Forbidden
        );

        let list = |principal| {
            AuthorizationRequest::new(principal, ResourceKind::Progress, Action::List).within(1)
        };
        assert_eq!(gate.authorize(&list(Principal::instructor(2, 1))).await, Outcome::Allowed);
        assert_eq!(
            gate.authorize(&list(Principal::instructor(3, 2))).await,
            Outcome::Forbidden
        );

        let unknown = AuthorizationRequest::new(
            Principal::student(10, 6),
            ResourceKind::Progress,
            Action::Create,
        )
        .within(99);
        assert_eq!(
            gate.check(&unknown).await,
            Err(AuthorizationError::ResourceNotFound {
                kind: ResourceKind::Enrollment,
                id: 99
            })
        );
    }

    #[tokio::test]
    async fn test_resource_free_policy_ignores_resource_id() {
        let (gate, _store) = create_test_gate().await;

        let request = AuthorizationRequest::new(
            Principal::student(3, 5),
            ResourceKind::Course,
            Action::Retrieve,
        )
        .on(12345);
        assert_eq!(gate.authorize(&request).await, Outcome::Allowed);
    }

    #[tokio::test]
    async fn test_custom_policy_table() {
        let (_gate, store) = create_test_gate().await;
        let mut builder = PolicyTable::builder();
        for kind in ResourceKind::all() {
            builder = builder.actions(kind, &Action::all(), Predicate::Deny);
        }
        let gate = AuthorizationGate::with_policies(Arc::new(store), builder.build().unwrap());

        let request = AuthorizationRequest::new(
            Principal::instructor(2, 1),
            ResourceKind::Course,
            Action::Create,
        );
        assert_eq!(gate.authorize(&request).await, Outcome::Forbidden);
    }

    #[derive(Debug)]
    struct FailingStore;

    #[async_trait]
    impl ResourceStore for FailingStore {
        async fn course(&self, _id: u64) -> Result<Course, StoreError> {
            Err(StoreError::Backend("database unavailable".into()))
        }
        async fn lesson(&self, _id: u64) -> Result<Lesson, StoreError> {
            Err(StoreError::Backend("database unavailable".into()))
        }
        async fn enrollment(
            &self,
            _id: u64,
        ) -> Result<crate::records::Enrollment, StoreError> {
            Err(StoreError::Backend("database unavailable".into()))
        }
        async fn progress(&self, _id: u64) -> Result<crate::records::Progress, StoreError> {
            Err(StoreError::Backend("database unavailable".into()))
        }
        async fn assignment(
            &self,
            _id: u64,
        ) -> Result<crate::records::Assignment, StoreError> {
            Err(StoreError::Backend("database unavailable".into()))
        }
        async fn submission(
            &self,
            _id: u64,
        ) -> Result<crate::records::Submission, StoreError> {
            Err(StoreError::Backend("database unavailable".into()))
        }
        async fn is_enrolled(&self, _course_id: u64, _student_id: u64) -> Result<bool, StoreError> {
            Err(StoreError::Backend("database unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failures_fail_closed() {
        let gate = AuthorizationGate::new(Arc::new(FailingStore)).unwrap();

        let request = AuthorizationRequest::new(
            Principal::instructor(2, 1),
            ResourceKind::Course,
            Action::Update,
        )
        .on(7);
        assert_eq!(
            gate.check(&request).await,
            Err(AuthorizationError::Store("database unavailable".into()))
        );
        assert_eq!(gate.authorize(&request).await, Outcome::Forbidden);

        // Policies without resource facts never touch the store
        let request = AuthorizationRequest::new(
            Principal::instructor(2, 1),
            ResourceKind::Course,
            Action::Create,
        );
        assert_eq!(gate.authorize(&request).await, Outcome::Allowed);
    }
}
