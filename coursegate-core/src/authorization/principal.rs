use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::Id;

/// The actor making a request.
///
/// Built once by the authentication layer and passed explicitly into the
/// gate; the core never reads it from ambient state. `profile_id` links to the
/// student or instructor profile matching `role` and is what ownership and
/// enrollment checks compare against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Id,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub profile_id: Option<Id>,
}

impl Principal {
    /// Principal for a request without credentials
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            role: None,
            authenticated: false,
            profile_id: None,
        }
    }

    pub fn student(id: Id, student_id: Id) -> Self {
        Self {
            id,
            role: Some(Role::Student),
            authenticated: true,
            profile_id: Some(student_id),
        }
    }

    pub fn instructor(id: Id, instructor_id: Id) -> Self {
        Self {
            id,
            role: Some(Role::Instructor),
            authenticated: true,
            profile_id: Some(instructor_id),
        }
    }

    /// True if the principal is authenticated and holds `role`
    pub fn has_role(&self, role: Role) -> bool {
        self.authenticated && self.role == Some(role)
    }

    pub fn is_student(&self) -> bool {
        self.has_role(Role::Student)
    }

    pub fn is_instructor(&self) -> bool {
        self.has_role(Role::Instructor)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.authenticated, self.role) {
            (false, _) => write!(f, "anonymous"),
            (true, Some(role)) => write!(f, "{}#{}", role, self.id),
            (true, None) => write!(f, "user#{}", self.id),
        }
    }
}
