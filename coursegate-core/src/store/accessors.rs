use tracing::warn;

use super::{ResourceStore, StoreError};
use crate::authorization::ResourceKind;
use crate::records::Progress;
use crate::Id;

/// Facts about a single resource that permission predicates compare against
/// the principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFacts {
    pub kind: ResourceKind,
    /// The resource, or its parent record when the request is scoped
    pub id: Id,
    /// Course the resource belongs to (the resource itself for courses)
    pub course_id: Id,
    /// Instructor owning `course_id`
    pub owner_instructor_id: Id,
    /// Student the resource belongs to, for enrollments, progress records
    /// and submissions
    pub owner_student_id: Option<Id>,
}

/// Walk the ownership chain of a resource.
///
/// Courses own their instructor; lessons and assignments reach it through
/// their course; enrollments, progress records and submissions go through
/// their enrollment or assignment first.
pub async fn resolve_facts(
    store: &dyn ResourceStore,
    kind: ResourceKind,
    id: Id,
) -> Result<ResourceFacts, StoreError> {
    let (course_id, owner_student_id) = match kind {
        ResourceKind::Course => (id, None),
        ResourceKind::Lesson => (store.lesson(id).await?.course_id, None),
        ResourceKind::Assignment => (store.assignment(id).await?.course_id, None),
        ResourceKind::Enrollment => {
            let enrollment = store.enrollment(id).await?;
            (enrollment.course_id, Some(enrollment.student_id))
        }
        ResourceKind::Progress => {
            let progress = store.progress(id).await?;
            let enrollment_student = enrollment_owner(store, &progress).await?;
            let course_id = store.enrollment(progress.enrollment_id).await?.course_id;
            let owner = if enrollment_student == progress.student_id {
                Some(progress.student_id)
            } else {
                warn!(
                    "Progress {} belongs to student {} but its enrollment {} belongs to student {}",
                    progress.id, progress.student_id, progress.enrollment_id, enrollment_student
                );
                None
            };
            (course_id, owner)
        }
        ResourceKind::Submission => {
            let submission = store.submission(id).await?;
            let assignment = store.assignment(submission.assignment_id).await?;
            (assignment.course_id, Some(submission.student_id))
        }
    };

    let course = store.course(course_id).await?;

    Ok(ResourceFacts {
        kind,
        id,
        course_id: course.id,
        owner_instructor_id: course.instructor_id,
        owner_student_id,
    })
}

/// Facts for a request that names the parent record instead of the resource.
///
/// Used for listing a collection under a parent and for creating a resource
/// that has no id yet. The facts describe the parent: its course, the owning
/// instructor and, when the parent is an enrollment, the enrolled student who
/// owns every progress record created in it.
pub async fn resolve_scope_facts(
    store: &dyn ResourceStore,
    kind: ResourceKind,
    parent_id: Id,
) -> Result<Option<ResourceFacts>, StoreError> {
    let Some(parent) = kind.parent() else {
        return Ok(None);
    };

    let facts = resolve_facts(store, parent, parent_id).await?;
    Ok(Some(ResourceFacts {
        kind,
        owner_student_id: match parent {
            ResourceKind::Enrollment => facts.owner_student_id,
            _ => None,
        },
        ..facts
    }))
}

/// Instructor owning the course a resource belongs to
pub async fn owner_instructor_of(
    store: &dyn ResourceStore,
    kind: ResourceKind,
    id: Id,
) -> Result<Id, StoreError> {
    Ok(resolve_facts(store, kind, id).await?.owner_instructor_id)
}

/// Student owning the enrollment a progress record is tied to
pub async fn enrollment_owner(
    store: &dyn ResourceStore,
    progress: &Progress,
) -> Result<Id, StoreError> {
    Ok(store.enrollment(progress.enrollment_id).await?.student_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Assignment, Course, Enrollment, Lesson, Progress, Submission};
    use crate::store::SharedResourceStore;

    async fn create_test_store() -> SharedResourceStore {
        let store = SharedResourceStore::new();
        store.insert_course(Course { id: 1, instructor_id: 100 }).await;
        store.insert_lesson(Lesson { id: 10, course_id: 1 }).await;
        store.insert_assignment(Assignment { id: 20, course_id: 1 }).await;
        store
            .insert_enrollment(Enrollment { id: 30, course_id: 1, student_id: 500 })
            .await;
        store
            .insert_progress(Progress { id: 40, enrollment_id: 30, student_id: 500 })
            .await;
        store
            .insert_submission(Submission { id: 50, assignment_id: 20, student_id: 500 })
            .await;
        store
    }

    #[tokio::test]
    async fn test_owner_instructor_follows_parent_course() {
        let store = create_test_store().await;

        for (kind, id) in [
            (ResourceKind::Course, 1),
            (ResourceKind::Lesson, 10),
            (ResourceKind::Assignment, 20),
            (ResourceKind::Enrollment, 30),
            (ResourceKind::Progress, 40),
            (ResourceKind::Submission, 50),
        ] {
            assert_eq!(
                owner_instructor_of(&store, kind, id).await.unwrap(),
                100,
                "{kind} {id}"
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = create_test_store().await;

        let err = owner_instructor_of(&store, ResourceKind::Lesson, 99)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found(ResourceKind::Lesson, 99));

        let err = resolve_facts(&store, ResourceKind::Course, 2).await.unwrap_err();
        assert_eq!(err, StoreError::not_found(ResourceKind::Course, 2));
    }

    #[tokio::test]
    async fn test_student_owned_resources_carry_owner() {
        let store = create_test_store().await;

        let facts = resolve_facts(&store, ResourceKind::Progress, 40).await.unwrap();
        assert_eq!(facts.course_id, 1);
        assert_eq!(facts.owner_student_id, Some(500));

        let facts = resolve_facts(&store, ResourceKind::Lesson, 10).await.unwrap();
        assert_eq!(facts.owner_student_id, None);
    }

    #[tokio::test]
    async fn test_progress_with_mismatched_enrollment_has_no_owner() {
        let store = create_test_store().await;
        store
            .insert_progress(Progress { id: 41, enrollment_id: 30, student_id: 501 })
            .await;

        let facts = resolve_facts(&store, ResourceKind::Progress, 41).await.unwrap();
        assert_eq!(facts.owner_student_id, None);
    }

    #[tokio::test]
    async fn test_scope_facts_come_from_the_parent() {
        let store = create_test_store().await;

        // A progress record created in enrollment 30 belongs to its student
        let facts = resolve_scope_facts(&store, ResourceKind::Progress, 30)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(facts.kind, ResourceKind::Progress);
        assert_eq!(facts.id, 30);
        assert_eq!(facts.course_id, 1);
        assert_eq!(facts.owner_instructor_id, 100);
        assert_eq!(facts.owner_student_id, Some(500));

        // Submissions are scoped by their assignment, which has no student
        let facts = resolve_scope_facts(&store, ResourceKind::Submission, 20)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(facts.course_id, 1);
        assert_eq!(facts.owner_student_id, None);

        // Courses have no parent
        assert_eq!(
            resolve_scope_facts(&store, ResourceKind::Course, 1).await.unwrap(),
            None
        );

        let err = resolve_scope_facts(&store, ResourceKind::Progress, 99)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found(ResourceKind::Enrollment, 99));
    }

    #[tokio::test]
    async fn test_enrollment_owner() {
        let store = create_test_store().await;
        let progress = store.progress(40).await.unwrap();
        assert_eq!(enrollment_owner(&store, &progress).await.unwrap(), 500);
    }
}
