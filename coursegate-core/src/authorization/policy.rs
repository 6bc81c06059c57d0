use std::collections::BTreeMap;
use tracing::error;

use super::error::AuthorizationError;
use super::predicate::Predicate;
use super::resource::{Action, ResourceKind};

/// Fixed mapping from (resource kind, action) to the predicate that must pass
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: BTreeMap<(ResourceKind, Action), Predicate>,
}

#[derive(Debug, Default)]
pub struct PolicyTableBuilder {
    policies: BTreeMap<(ResourceKind, Action), Predicate>,
}

impl PolicyTableBuilder {
    pub fn policy(mut self, kind: ResourceKind, action: Action, predicate: Predicate) -> Self {
        self.policies.insert((kind, action), predicate);
        self
    }

    /// Assign the same predicate to several actions of a kind
    pub fn actions(mut self, kind: ResourceKind, actions: &[Action], predicate: Predicate) -> Self {
        for action in actions {
            self.policies.insert((kind, *action), predicate.clone());
        }
        self
    }

    /// Finish the table, failing if any (kind, action) pair has no policy
    pub fn build(self) -> Result<PolicyTable, AuthorizationError> {
        let missing: Vec<(ResourceKind, Action)> = ResourceKind::all()
            .into_iter()
            .flat_map(|kind| Action::all().into_iter().map(move |action| (kind, action)))
            .filter(|pair| !self.policies.contains_key(pair))
            .collect();

        if let Some((kind, action)) = missing.first().copied() {
            error!(
                "Policy table is incomplete, {} pairs have no policy: {:?}",
                missing.len(),
                missing
            );
            return Err(AuthorizationError::PolicyNotFound { kind, action });
        }

        Ok(PolicyTable {
            policies: self.policies,
        })
    }
}

impl PolicyTable {
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::default()
    }

    /// The policy set of the course backend.
    ///
    /// `enroll` and `submit` only apply to some kinds; every other pair is
    /// listed explicitly as [`Predicate::Deny`] so the table stays total.
    pub fn standard() -> Result<PolicyTable, AuthorizationError> {
        use Action::*;
        use ResourceKind::*;

        let student = Predicate::student;
        let instructor = Predicate::instructor;

        let can_view_student_progress = Predicate::OwnsResource;
        let is_student_progress_owner =
            Predicate::all([Predicate::IsProgressOwner, student()]);

        PolicyTable::builder()
            .actions(Course, &[List, Retrieve], Predicate::Authenticated)
            .policy(Course, Create, instructor())
            .actions(Course, &[Update, Delete], Predicate::OwnsResource)
            .policy(Course, Enroll, student())
            .policy(Course, Submit, student())
            .policy(Lesson, List, Predicate::Authenticated)
            .policy(
                Lesson,
                Retrieve,
                Predicate::any([Predicate::OwnsResource, Predicate::EnrolledInResource]),
            )
            .policy(Lesson, Create, instructor())
            .actions(Lesson, &[Update, Delete], Predicate::OwnsResource)
            .actions(Lesson, &[Enroll, Submit], Predicate::Deny)
            .actions(Enrollment, &[List, Retrieve], Predicate::Authenticated)
            .policy(Enrollment, Create, student())
            .actions(Enrollment, &[Update, Delete], instructor())
            .actions(Enrollment, &[Enroll, Submit], Predicate::Deny)
            .actions(Progress, &[List, Retrieve], can_view_student_progress)
            .actions(
                Progress,
                &[Create, Update, Delete],
                is_student_progress_owner,
            )
            .actions(Progress, &[Enroll, Submit], Predicate::Deny)
            .policy(Assignment, List, Predicate::Authenticated)
            .policy(
                Assignment,
                Retrieve,
                Predicate::any([Predicate::EnrolledInResource, instructor()]),
            )
            .actions(Assignment, &[Create, Update, Delete], instructor())
            .policy(Assignment, Enroll, Predicate::Deny)
            .policy(
                Assignment,
                Submit,
                Predicate::all([student(), Predicate::EnrolledInResource]),
            )
            .actions(Submission, &[List, Retrieve], Predicate::Authenticated)
            .policy(Submission, Create, student())
            .actions(Submission, &[Update, Delete], instructor())
            .actions(Submission, &[Enroll, Submit], Predicate::Deny)
            .build()
    }

    pub fn get(&self, kind: ResourceKind, action: Action) -> Result<&Predicate, AuthorizationError> {
        self.policies
            .get(&(kind, action))
            .ok_or(AuthorizationError::PolicyNotFound { kind, action })
    }

    /// All policies ordered by kind, then action
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, Action, &Predicate)> {
        self.policies
            .iter()
            .map(|((kind, action), predicate)| (*kind, *action, predicate))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
