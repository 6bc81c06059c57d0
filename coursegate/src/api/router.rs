use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::authorize::authorize_handler;
use crate::api::handlers::health::health_checker_handler;
use crate::api::handlers::policies::list_policies_handler;
use crate::app_state::SharedAppState;

pub struct ApiRoutes;

impl ApiRoutes {
    pub fn create(state: SharedAppState) -> Router {
        Router::new()
            .route("/api/v1/health", get(health_checker_handler))
            .route("/api/v1/policies", get(list_policies_handler))
            .route("/api/v1/authorize", post(authorize_handler))
            .with_state(state)
    }
}
