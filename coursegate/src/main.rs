use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use coursegate::app_state::AppState;
use coursegate::cli::{evaluate, CheckArgs, Cli, Commands};
use coursegate::http::setup_http_server;
use coursegate::init_tracing::init_tracing;
use coursegate::settings::config::Settings;
use coursegate_core::authorization::PolicyTable;

fn load_dotenv() {
    // .env.local takes precedence over .env, dotenvy never overrides
    for file in [".env.local", ".env"] {
        if Path::new(file).exists() {
            dotenvy::from_path(file).ok();
        }
    }
}

fn print_policies() -> anyhow::Result<()> {
    let table = PolicyTable::standard().context("Policy table is incomplete")?;

    let mut builder = Builder::default();
    builder.push_record(["Resource", "Action", "Policy"]);
    for (kind, action, predicate) in table.iter() {
        builder.push_record([
            kind.to_string(),
            action.to_string(),
            predicate.to_string(),
        ]);
    }

    let mut output = builder.build();
    output.with(Style::rounded());
    println!("{output}");
    println!("{} policies, every (resource, action) pair is covered", table.len());
    Ok(())
}

async fn check(args: &CheckArgs) -> anyhow::Result<()> {
    let settings = Settings::new()?;
    init_tracing(settings.debug)?;

    let request = args.to_request();
    let outcome = evaluate(settings, &request).await?;
    println!(
        "{} {} {}{}{}: {:?}",
        request.principal,
        request.action,
        request.resource_kind,
        request
            .resource_id
            .map(|id| format!(" #{id}"))
            .unwrap_or_default(),
        request
            .parent_id
            .map(|id| format!(" in #{id}"))
            .unwrap_or_default(),
        outcome
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Config => {
            let settings = Settings::new()?;
            println!("{:#?}", &settings);
            return Ok(());
        }
        Commands::Policies => return print_policies(),
        Commands::Check(args) => return check(args).await,
        Commands::Run => {
            // Continue with the normal server startup
        }
    }

    let settings = Settings::new()?;
    init_tracing(settings.debug)?;

    let app_state = AppState::new(settings).await?;
    let handle = setup_http_server(app_state.clone(), &app_state.settings.api.bind_address).await?;

    handle.await??;
    info!("All tasks are done");

    Ok(())
}
