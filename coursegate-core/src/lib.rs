//! Authorization core for the coursegate course-management backend.
//!
//! The crate knows two roles (student and instructor) and gates access to
//! courses, lessons, enrollments, progress records, assignments and
//! submissions. Persistence stays outside: records are read through the
//! [`store::ResourceStore`] trait.

pub mod authorization;
pub mod records;
pub mod store;

/// Identifier of any record, principal or profile.
pub type Id = u64;
