use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use coursegate_core::authorization::{
    Action, AuthorizationError, AuthorizationRequest, Principal, ResourceKind,
};
use coursegate_core::Id;

use crate::{api::error::AppError, app_state::SharedAppState};

/// What a REST request wants to do, derived from its method and path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationTarget {
    pub kind: ResourceKind,
    pub action: Action,
    pub resource_id: Option<Id>,
    pub parent_id: Option<Id>,
}

/// Map a request onto (kind, action, id).
///
/// Everything before the first segment naming a resource kind is ignored, so
/// `/api/v1/courses/7` and `/courses/7` are treated alike. Collections nested
/// under their parent (`/enrollments/1/progress`) carry the parent id, which
/// is what listing and creating progress records are judged by.
pub fn target_from_request(method: &Method, path: &str) -> Option<AuthorizationTarget> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let position = segments
        .iter()
        .position(|s| ResourceKind::from_str(s).is_some())?;
    let kind = ResourceKind::from_str(segments[position])?;

    let collection_action = |method: &Method| match method.as_str() {
        "GET" => Some(Action::List),
        "POST" => Some(Action::Create),
        _ => None,
    };

    let target = |kind, action, resource_id, parent_id| AuthorizationTarget {
        kind,
        action,
        resource_id,
        parent_id,
    };

    match &segments[position + 1..] {
        [] => Some(target(kind, collection_action(method)?, None, None)),
        [id] => {
            let id = id.parse::<Id>().ok()?;
            let action = match method.as_str() {
                "GET" => Action::Retrieve,
                "PUT" | "PATCH" => Action::Update,
                "DELETE" => Action::Delete,
                _ => return None,
            };
            Some(target(kind, action, Some(id), None))
        }
        [id, child] if ResourceKind::from_str(child).is_some() => {
            let parent_id = id.parse::<Id>().ok()?;
            let child = ResourceKind::from_str(child)?;
            if child.parent() != Some(kind) {
                return None;
            }
            Some(target(child, collection_action(method)?, None, Some(parent_id)))
        }
        [id, custom] if method == Method::POST => {
            let id = id.parse::<Id>().ok()?;
            let action = match (kind, *custom) {
                (ResourceKind::Course, "enroll") => Action::Enroll,
                (ResourceKind::Course, "submit_assignment") => Action::Submit,
                (ResourceKind::Assignment, "submit") => Action::Submit,
                _ => return None,
            };
            Some(target(kind, action, Some(id), None))
        }
        _ => None,
    }
}

/// Middleware running the authorization gate in front of resource routes.
///
/// Expects the upstream authentication layer to insert a [`Principal`] into
/// the request extensions; requests without one are treated as anonymous.
pub async fn require_authorization(
    State(state): State<SharedAppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();
    let Some(target) = target_from_request(req.method(), &path) else {
        warn!("Could not derive resource and action from {} {}", req.method(), path);
        return Err(AppError::InvalidInput(format!(
            "Unrecognized resource path: {path}"
        )));
    };

    let principal = req
        .extensions()
        .get::<Principal>()
        .cloned()
        .unwrap_or_else(Principal::anonymous);

    let mut request = AuthorizationRequest::new(principal, target.kind, target.action);
    request.resource_id = target.resource_id;
    request.parent_id = target.parent_id;

    if let Err(e) = state.gate.check(&request).await {
        match &e {
            AuthorizationError::PolicyNotFound { .. } | AuthorizationError::Store(_) => {
                error!("Authorization failed for {} {}: {}", req.method(), path, e)
            }
            _ => warn!(
                "Denying {} on {} for {}: {}",
                target.action, target.kind, request.principal, e
            ),
        }
        return Err(e.into());
    }

    Ok(next.run(req).await)
}
