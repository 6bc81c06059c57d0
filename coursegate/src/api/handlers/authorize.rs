use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use coursegate_core::authorization::{AuthorizationRequest, Outcome};

use crate::app_state::SharedAppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub outcome: Outcome,
}

/// Evaluate a single request. Denials are part of the answer, not errors, so
/// this always responds with 200.
pub async fn authorize_handler(
    State(state): State<SharedAppState>,
    Json(request): Json<AuthorizationRequest>,
) -> Json<AuthorizationResponse> {
    let outcome = state.gate.authorize(&request).await;
    Json(AuthorizationResponse { outcome })
}
