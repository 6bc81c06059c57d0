//! coursegate library
//!
//! Exposes the decision API, the authorization middleware and the ambient
//! setup of the binary for integration testing and for embedding the gate
//! in another axum application.

pub mod api;
pub mod app_state;
pub mod cli;
pub mod http;
pub mod init_tracing;
pub mod settings;
pub mod stop_flag;

pub use app_state::AppState;
