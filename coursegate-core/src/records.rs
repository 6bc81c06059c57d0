//! Records read by the authorization core.
//!
//! Only the fields needed for a decision are modelled. Ownership lives on the
//! course (`instructor_id`) and on the enrollment (`student_id`); every other
//! record points at its parent instead of repeating those facts.

use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Id,
    pub instructor_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Id,
    pub course_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Id,
    pub course_id: Id,
    pub student_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub id: Id,
    pub enrollment_id: Id,
    pub student_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Id,
    pub course_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Id,
    pub assignment_id: Id,
    pub student_id: Id,
}
