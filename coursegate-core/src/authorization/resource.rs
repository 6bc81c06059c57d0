use serde::{Deserialize, Serialize};

/// Kinds of records the gate protects
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Course,
    Lesson,
    Enrollment,
    Progress,
    Assignment,
    Submission,
}

impl ResourceKind {
    pub fn all() -> Vec<ResourceKind> {
        vec![
            ResourceKind::Course,
            ResourceKind::Lesson,
            ResourceKind::Enrollment,
            ResourceKind::Progress,
            ResourceKind::Assignment,
            ResourceKind::Submission,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Course => "course",
            ResourceKind::Lesson => "lesson",
            ResourceKind::Enrollment => "enrollment",
            ResourceKind::Progress => "progress",
            ResourceKind::Assignment => "assignment",
            ResourceKind::Submission => "submission",
        }
    }

    /// Kind of the record a resource is created in and listed under
    pub fn parent(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Course => None,
            ResourceKind::Lesson | ResourceKind::Enrollment | ResourceKind::Assignment => {
                Some(ResourceKind::Course)
            }
            ResourceKind::Progress => Some(ResourceKind::Enrollment),
            ResourceKind::Submission => Some(ResourceKind::Assignment),
        }
    }

    /// Parse from string, accepting the plural collection names used in URLs
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<ResourceKind> {
        match s.to_lowercase().as_str() {
            "course" | "courses" => Some(ResourceKind::Course),
            "lesson" | "lessons" => Some(ResourceKind::Lesson),
            "enrollment" | "enrollments" => Some(ResourceKind::Enrollment),
            "progress" | "progresses" => Some(ResourceKind::Progress),
            "assignment" | "assignments" => Some(ResourceKind::Assignment),
            "submission" | "submissions" => Some(ResourceKind::Submission),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a principal can request on a resource kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
    Enroll,
    Submit,
}

impl Action {
    pub fn all() -> Vec<Action> {
        vec![
            Action::List,
            Action::Retrieve,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Enroll,
            Action::Submit,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Enroll => "enroll",
            Action::Submit => "submit",
        }
    }

    /// Parse from string
    ///
    /// `partial_update`, `destroy` and `submit_assignment` are accepted as
    /// aliases for the REST action names of the course API.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Action> {
        match s.to_lowercase().as_str() {
            "list" => Some(Action::List),
            "retrieve" => Some(Action::Retrieve),
            "create" => Some(Action::Create),
            "update" | "partial_update" => Some(Action::Update),
            "delete" | "destroy" => Some(Action::Delete),
            "enroll" => Some(Action::Enroll),
            "submit" | "submit_assignment" => Some(Action::Submit),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
