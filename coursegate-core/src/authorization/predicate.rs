use super::principal::Principal;
use super::role::Role;
use crate::store::ResourceFacts;

/// Everything a predicate may look at.
///
/// `facts` is only present when the policy needs a resource and the gate
/// resolved it. `enrolled` answers "is the principal enrolled in the course of
/// the resource" and is only looked up for students when the policy asks.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub principal: &'a Principal,
    pub facts: Option<&'a ResourceFacts>,
    pub enrolled: bool,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(principal: &'a Principal) -> Self {
        Self {
            principal,
            facts: None,
            enrolled: false,
        }
    }

    pub fn with_facts(mut self, facts: &'a ResourceFacts) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn with_enrollment(mut self, enrolled: bool) -> Self {
        self.enrolled = enrolled;
        self
    }
}

/// Authorization rule over a principal and, optionally, a resolved resource.
///
/// Composite rules are plain values built with [`Predicate::all`] and
/// [`Predicate::any`], so a policy can be constructed and evaluated without a
/// store or a web framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Authenticated with any role
    Authenticated,
    /// Authenticated and holding the role
    RoleIs(Role),
    /// An instructor owning the course of the resource
    OwnsResource,
    /// A student enrolled in the course of the resource
    EnrolledInResource,
    /// The student the resource (a progress record) belongs to
    IsProgressOwner,
    /// Never passes
    Deny,
    /// Passes if every member passes, stopping at the first failure
    All(Vec<Predicate>),
    /// Passes if any member passes, stopping at the first success
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::All(predicates.into_iter().collect())
    }

    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::Any(predicates.into_iter().collect())
    }

    pub fn student() -> Predicate {
        Predicate::RoleIs(Role::Student)
    }

    pub fn instructor() -> Predicate {
        Predicate::RoleIs(Role::Instructor)
    }

    /// True if evaluating needs the facts of a resolved resource
    pub fn requires_resource(&self) -> bool {
        match self {
            Predicate::Authenticated | Predicate::RoleIs(_) | Predicate::Deny => false,
            Predicate::OwnsResource
            | Predicate::EnrolledInResource
            | Predicate::IsProgressOwner => true,
            Predicate::All(members) | Predicate::Any(members) => {
                members.iter().any(Predicate::requires_resource)
            }
        }
    }

    /// True if the enrollment of the principal is referenced anywhere
    pub fn requires_enrollment(&self) -> bool {
        match self {
            Predicate::EnrolledInResource => true,
            Predicate::All(members) | Predicate::Any(members) => {
                members.iter().any(Predicate::requires_enrollment)
            }
            _ => false,
        }
    }

    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> bool {
        let principal = ctx.principal;
        match self {
            Predicate::Authenticated => principal.authenticated && principal.role.is_some(),
            Predicate::RoleIs(role) => principal.has_role(*role),
            Predicate::OwnsResource => {
                principal.is_instructor()
                    && ctx.facts.is_some_and(|facts| {
                        principal.profile_id == Some(facts.owner_instructor_id)
                    })
            }
            Predicate::EnrolledInResource => {
                principal.is_student() && ctx.facts.is_some() && ctx.enrolled
            }
            Predicate::IsProgressOwner => ctx
                .facts
                .and_then(|facts| facts.owner_student_id)
                .is_some_and(|owner| principal.profile_id == Some(owner)),
            Predicate::Deny => false,
            Predicate::All(members) => members.iter().all(|p| p.evaluate(ctx)),
            Predicate::Any(members) => members.iter().any(|p| p.evaluate(ctx)),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(
            f: &mut std::fmt::Formatter<'_>,
            name: &str,
            members: &[Predicate],
        ) -> std::fmt::Result {
            write!(f, "{name}(")?;
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{member}")?;
            }
            write!(f, ")")
        }

        match self {
            Predicate::Authenticated => write!(f, "authenticated"),
            Predicate::RoleIs(role) => write!(f, "role_is({role})"),
            Predicate::OwnsResource => write!(f, "owns_resource"),
            Predicate::EnrolledInResource => write!(f, "enrolled_in_resource"),
            Predicate::IsProgressOwner => write!(f, "is_progress_owner"),
            Predicate::Deny => write!(f, "deny"),
            Predicate::All(members) => join(f, "all", members),
            Predicate::Any(members) => join(f, "any", members),
        }
    }
}
