//! Read access to the records authorization decisions depend on.
//!
//! The backend is the embedding application's business; the core only needs
//! the lookups of [`ResourceStore`]. [`SharedResourceStore`] is an in-memory
//! implementation used by the cli, the decision api and the tests.

pub mod accessors;
pub mod fixtures;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::authorization::ResourceKind;
use crate::records::{Assignment, Course, Enrollment, Lesson, Progress, Submission};
use crate::Id;

pub use accessors::{
    enrollment_owner, owner_instructor_of, resolve_facts, resolve_scope_facts, ResourceFacts,
};
pub use fixtures::{FixtureError, Fixtures};
pub use memory::SharedResourceStore;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: Id },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: ResourceKind, id: Id) -> Self {
        StoreError::NotFound { kind, id }
    }
}

/// Read-only lookups against the persistence layer.
///
/// Every record lookup fails with [`StoreError::NotFound`] when the id does
/// not resolve. Implementations may block on I/O; the gate awaits them and
/// never holds any lock across the call.
#[async_trait]
pub trait ResourceStore: Send + Sync + std::fmt::Debug {
    async fn course(&self, id: Id) -> Result<Course, StoreError>;

    async fn lesson(&self, id: Id) -> Result<Lesson, StoreError>;

    async fn enrollment(&self, id: Id) -> Result<Enrollment, StoreError>;

    async fn progress(&self, id: Id) -> Result<Progress, StoreError>;

    async fn assignment(&self, id: Id) -> Result<Assignment, StoreError>;

    async fn submission(&self, id: Id) -> Result<Submission, StoreError>;

    /// True iff an enrollment exists for the (course, student) pair
    async fn is_enrolled(&self, course_id: Id, student_id: Id) -> Result<bool, StoreError>;
}
