use serde::{Deserialize, Serialize};

use super::principal::Principal;
use super::resource::{Action, ResourceKind};
use crate::Id;

/// A single "may this principal do that" question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub principal: Principal,
    pub resource_kind: ResourceKind,
    pub action: Action,
    #[serde(default)]
    pub resource_id: Option<Id>,
    /// Parent record a collection is listed under or a new resource is
    /// created in, e.g. the enrollment of a progress record
    #[serde(default)]
    pub parent_id: Option<Id>,
}

impl AuthorizationRequest {
    pub fn new(principal: Principal, resource_kind: ResourceKind, action: Action) -> Self {
        Self {
            principal,
            resource_kind,
            action,
            resource_id: None,
            parent_id: None,
        }
    }

    pub fn on(mut self, resource_id: Id) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    pub fn within(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Result of an authorization request as seen by the web layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allowed,
    Forbidden,
    ResourceNotFound,
}

impl Outcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Allowed)
    }
}
