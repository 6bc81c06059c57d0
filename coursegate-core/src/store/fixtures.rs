use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::records::{Assignment, Course, Enrollment, Lesson, Progress, Submission};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixtures from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse fixtures: {0}")]
    Parse(#[from] serde_norway::Error),

    #[error("Invalid fixtures: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Seed data for [`super::SharedResourceStore`], loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub progress: Vec<Progress>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

impl Fixtures {
    /// Load and validate fixtures from a YAML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Fixtures, FixtureError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let fixtures = Self::parse(&content)?;
        info!(
            "Loaded fixtures from {}: {} courses, {} enrollments",
            path.display(),
            fixtures.courses.len(),
            fixtures.enrollments.len()
        );
        Ok(fixtures)
    }

    /// Parse and validate fixtures from a YAML string
    pub fn parse(content: &str) -> Result<Fixtures, FixtureError> {
        let fixtures: Fixtures = serde_norway::from_str(content)?;
        fixtures.validate().map_err(FixtureError::Invalid)?;
        Ok(fixtures)
    }

    /// Check referential integrity.
    ///
    /// Returns Ok(()) if every parent reference resolves and every progress
    /// record belongs to the student of its enrollment, or Err with one
    /// message per violation.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        let courses: HashSet<_> = self.courses.iter().map(|c| c.id).collect();
        let assignments: HashSet<_> = self.assignments.iter().map(|a| a.id).collect();

        for lesson in &self.lessons {
            if !courses.contains(&lesson.course_id) {
                problems.push(format!(
                    "lesson {} references missing course {}",
                    lesson.id, lesson.course_id
                ));
            }
        }

        for assignment in &self.assignments {
            if !courses.contains(&assignment.course_id) {
                problems.push(format!(
                    "assignment {} references missing course {}",
                    assignment.id, assignment.course_id
                ));
            }
        }

        let mut pairs = HashSet::new();
        for enrollment in &self.enrollments {
            if !courses.contains(&enrollment.course_id) {
                problems.push(format!(
                    "enrollment {} references missing course {}",
                    enrollment.id, enrollment.course_id
                ));
            }
            if !pairs.insert((enrollment.course_id, enrollment.student_id)) {
                problems.push(format!(
                    "student {} is enrolled in course {} more than once",
                    enrollment.student_id, enrollment.course_id
                ));
            }
        }

        for progress in &self.progress {
            match self
                .enrollments
                .iter()
                .find(|e| e.id == progress.enrollment_id)
            {
                None => problems.push(format!(
                    "progress {} references missing enrollment {}",
                    progress.id, progress.enrollment_id
                )),
                Some(enrollment) if enrollment.student_id != progress.student_id => {
                    problems.push(format!(
                        "progress {} belongs to student {} but enrollment {} belongs to student {}",
                        progress.id, progress.student_id, enrollment.id, enrollment.student_id
                    ))
                }
                Some(_) => {}
            }
        }

        for submission in &self.submissions {
            if !assignments.contains(&submission.assignment_id) {
                problems.push(format!(
                    "submission {} references missing assignment {}",
                    submission.id, submission.assignment_id
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
courses:
  - { id: 7, instructor_id: 1 }
lessons:
  - { id: 42, course_id: 7 }
enrollments:
  - { id: 1, course_id: 7, student_id: 5 }
progress:
  - { id: 3, enrollment_id: 1, student_id: 5 }
assignments:
  - { id: 9, course_id: 7 }
submissions:
  - { id: 11, assignment_id: 9, student_id: 5 }
"#;

    #[test]
    fn test_parse_valid_fixtures() {
        let fixtures = Fixtures::parse(VALID).unwrap();
        assert_eq!(fixtures.courses.len(), 1);
        assert_eq!(fixtures.lessons[0].course_id, 7);
        assert_eq!(fixtures.submissions[0].student_id, 5);
    }

    #[test]
    fn test_sections_are_optional() {
        let fixtures = Fixtures::parse("courses: []").unwrap();
        assert!(fixtures.lessons.is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let content = r#"
courses:
  - { id: 7, instructor_id: 1 }
lessons:
  - { id: 42, course_id: 8 }
enrollments:
  - { id: 1, course_id: 7, student_id: 5 }
  - { id: 2, course_id: 7, student_id: 5 }
progress:
  - { id: 3, enrollment_id: 1, student_id: 6 }
submissions:
  - { id: 11, assignment_id: 9, student_id: 5 }
"#;
        match Fixtures::parse(content) {
            Err(FixtureError::Invalid(problems)) => {
                assert_eq!(problems.len(), 4, "{problems:?}");
                assert!(problems[0].contains("missing course 8"));
            }
            other => panic!("expected invalid fixtures, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.yaml");
        tokio::fs::write(&path, VALID).await.unwrap();

        let fixtures = Fixtures::load(&path).await.unwrap();
        assert_eq!(fixtures.progress.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Fixtures::load("/nonexistent/fixtures.yaml").await.unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }
}
