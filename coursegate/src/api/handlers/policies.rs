use axum::{extract::State, Json};
use serde::Serialize;

use coursegate_core::authorization::{Action, ResourceKind};

use crate::app_state::SharedAppState;

#[derive(Debug, Serialize)]
pub struct PolicyEntry {
    pub resource_kind: ResourceKind,
    pub action: Action,
    pub predicate: String,
}

#[derive(Debug, Serialize)]
pub struct PolicyList {
    pub policies: Vec<PolicyEntry>,
}

/// The active policy table, ordered by resource kind and action
pub async fn list_policies_handler(State(state): State<SharedAppState>) -> Json<PolicyList> {
    let policies = state
        .gate
        .policies()
        .iter()
        .map(|(resource_kind, action, predicate)| PolicyEntry {
            resource_kind,
            action,
            predicate: predicate.to_string(),
        })
        .collect();

    Json(PolicyList { policies })
}
