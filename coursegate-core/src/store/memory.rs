use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::instrument;

use super::fixtures::Fixtures;
use super::{ResourceStore, StoreError};
use crate::authorization::ResourceKind;
use crate::records::{Assignment, Course, Enrollment, Lesson, Progress, Submission};
use crate::Id;

#[derive(Debug, Default)]
struct Tables {
    courses: HashMap<Id, Course>,
    lessons: HashMap<Id, Lesson>,
    enrollments: HashMap<Id, Enrollment>,
    progress: HashMap<Id, Progress>,
    assignments: HashMap<Id, Assignment>,
    submissions: HashMap<Id, Submission>,
}

/// In-memory [`ResourceStore`] shared between tasks.
///
/// Clones share the same tables, so an enrollment added through one handle is
/// visible to every gate reading through another.
#[derive(Debug, Clone, Default)]
pub struct SharedResourceStore {
    tables: Arc<RwLock<Tables>>,
}

impl SharedResourceStore {
    pub fn new() -> SharedResourceStore {
        SharedResourceStore::default()
    }

    /// Build a store from already validated fixtures
    pub fn from_fixtures(fixtures: Fixtures) -> SharedResourceStore {
        let tables = Tables {
            courses: fixtures.courses.into_iter().map(|r| (r.id, r)).collect(),
            lessons: fixtures.lessons.into_iter().map(|r| (r.id, r)).collect(),
            enrollments: fixtures.enrollments.into_iter().map(|r| (r.id, r)).collect(),
            progress: fixtures.progress.into_iter().map(|r| (r.id, r)).collect(),
            assignments: fixtures.assignments.into_iter().map(|r| (r.id, r)).collect(),
            submissions: fixtures.submissions.into_iter().map(|r| (r.id, r)).collect(),
        };
        SharedResourceStore {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    pub async fn insert_course(&self, course: Course) {
        self.tables.write().await.courses.insert(course.id, course);
    }

    pub async fn insert_lesson(&self, lesson: Lesson) {
        self.tables.write().await.lessons.insert(lesson.id, lesson);
    }

    pub async fn insert_enrollment(&self, enrollment: Enrollment) {
        self.tables
            .write()
            .await
            .enrollments
            .insert(enrollment.id, enrollment);
    }

    pub async fn insert_progress(&self, progress: Progress) {
        self.tables.write().await.progress.insert(progress.id, progress);
    }

    pub async fn insert_assignment(&self, assignment: Assignment) {
        self.tables
            .write()
            .await
            .assignments
            .insert(assignment.id, assignment);
    }

    pub async fn insert_submission(&self, submission: Submission) {
        self.tables
            .write()
            .await
            .submissions
            .insert(submission.id, submission);
    }

    /// Enroll a student in a course, returning the existing enrollment if the
    /// pair is already enrolled
    #[instrument(skip(self))]
    pub async fn enroll(&self, course_id: Id, student_id: Id) -> Enrollment {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .enrollments
            .values()
            .find(|e| e.course_id == course_id && e.student_id == student_id)
        {
            return existing.clone();
        }

        let id = tables.enrollments.keys().max().map_or(1, |max| max + 1);
        let enrollment = Enrollment {
            id,
            course_id,
            student_id,
        };
        tables.enrollments.insert(id, enrollment.clone());
        enrollment
    }

    /// Remove every enrollment of the (course, student) pair
    #[instrument(skip(self))]
    pub async fn unenroll(&self, course_id: Id, student_id: Id) {
        self.tables
            .write()
            .await
            .enrollments
            .retain(|_, e| !(e.course_id == course_id && e.student_id == student_id));
    }
}

fn lookup<T: Clone>(
    table: &HashMap<Id, T>,
    kind: ResourceKind,
    id: Id,
) -> Result<T, StoreError> {
    table
        .get(&id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(kind, id))
}

#[async_trait]
impl ResourceStore for SharedResourceStore {
    async fn course(&self, id: Id) -> Result<Course, StoreError> {
        lookup(&self.tables.read().await.courses, ResourceKind::Course, id)
    }

    async fn lesson(&self, id: Id) -> Result<Lesson, StoreError> {
        lookup(&self.tables.read().await.lessons, ResourceKind::Lesson, id)
    }

    async fn enrollment(&self, id: Id) -> Result<Enrollment, StoreError> {
        lookup(
            &self.tables.read().await.enrollments,
            ResourceKind::Enrollment,
            id,
        )
    }

    async fn progress(&self, id: Id) -> Result<Progress, StoreError> {
        lookup(&self.tables.read().await.progress, ResourceKind::Progress, id)
    }

    async fn assignment(&self, id: Id) -> Result<Assignment, StoreError> {
        lookup(
            &self.tables.read().await.assignments,
            ResourceKind::Assignment,
            id,
        )
    }

    async fn submission(&self, id: Id) -> Result<Submission, StoreError> {
        lookup(
            &self.tables.read().await.submissions,
            ResourceKind::Submission,
            id,
        )
    }

    async fn is_enrolled(&self, course_id: Id, student_id: Id) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .enrollments
            .values()
            .any(|e| e.course_id == course_id && e.student_id == student_id))
    }
}
