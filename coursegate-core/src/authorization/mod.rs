//! Role-based authorization for the course backend
//!
//! A request names a principal, a resource kind, an action and optionally a
//! resource id. The [`AuthorizationGate`] looks up the [`Predicate`] the
//! [`PolicyTable`] assigns to the (kind, action) pair, resolves the facts of
//! the resource through the store when the predicate needs them, and answers
//! with an [`Outcome`].

pub mod error;
pub mod gate;
pub mod policy;
pub mod predicate;
pub mod principal;
pub mod request;
pub mod resource;
pub mod role;

pub use error::AuthorizationError;
pub use gate::AuthorizationGate;
pub use policy::{PolicyTable, PolicyTableBuilder};
pub use predicate::{EvaluationContext, Predicate};
pub use principal::Principal;
pub use request::{AuthorizationRequest, Outcome};
pub use resource::{Action, ResourceKind};
pub use role::Role;
