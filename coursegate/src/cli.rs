use clap::{Args, Parser};

use coursegate_core::authorization::{
    Action, AuthorizationRequest, Outcome, Principal, ResourceKind, Role,
};
use coursegate_core::Id;

use crate::app_state::AppState;
use crate::settings::config::Settings;
use crate::stop_flag::StopFlag;

#[derive(Parser, Debug)]
#[command(name = "coursegate")]
#[command(about = "Role-based authorization for a course-management backend")]
#[clap(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Parser, Debug)]
pub enum Commands {
    /// Show current configuration and exit
    Config,
    /// Verify the policy table and print it
    Policies,
    /// Evaluate a single request against the configured fixtures
    Check(CheckArgs),
    /// Start the decision API server (default)
    Run,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Role of the principal, leave out for an anonymous request
    #[arg(long, value_parser = parse_role)]
    pub role: Option<Role>,

    /// Student or instructor profile id of the principal
    #[arg(long)]
    pub profile_id: Option<Id>,

    /// User id of the principal
    #[arg(long, default_value_t = 1)]
    pub user_id: Id,

    /// Resource kind, e.g. course or lessons
    #[arg(long, value_parser = parse_resource_kind)]
    pub resource: ResourceKind,

    /// Action, e.g. retrieve or partial_update
    #[arg(long, value_parser = parse_action)]
    pub action: Action,

    /// Id of the resource the action targets
    #[arg(long)]
    pub id: Option<Id>,

    /// Id of the parent record when listing or creating, e.g. the
    /// enrollment of a progress record
    #[arg(long)]
    pub parent_id: Option<Id>,
}

impl CheckArgs {
    pub fn to_request(&self) -> AuthorizationRequest {
        let principal = match self.role {
            None => Principal::anonymous(),
            Some(role) => Principal {
                id: self.user_id,
                role: Some(role),
                authenticated: true,
                profile_id: self.profile_id,
            },
        };

        let mut request = AuthorizationRequest::new(principal, self.resource, self.action);
        request.resource_id = self.id;
        request.parent_id = self.parent_id;
        request
    }
}

/// Answer a single request against the store seeded from `settings`
pub async fn evaluate(settings: Settings, request: &AuthorizationRequest) -> anyhow::Result<Outcome> {
    let app_state = AppState::from_settings(settings, StopFlag::new()).await?;
    Ok(app_state.gate.authorize(request).await)
}

pub fn parse_role(s: &str) -> Result<Role, String> {
    Role::from_str(s).ok_or_else(|| {
        format!(
            "Invalid role '{}', expected one of: {}",
            s,
            Role::all()
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

pub fn parse_resource_kind(s: &str) -> Result<ResourceKind, String> {
    ResourceKind::from_str(s).ok_or_else(|| {
        format!(
            "Invalid resource '{}', expected one of: {}",
            s,
            ResourceKind::all()
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

pub fn parse_action(s: &str) -> Result<Action, String> {
    Action::from_str(s).ok_or_else(|| {
        format!(
            "Invalid action '{}', expected one of: {}",
            s,
            Action::all()
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}
