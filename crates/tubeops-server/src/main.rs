//! `tubeops` — the ViewTube operations console binary
//!
//! `tubeops serve` runs the public site with a seeded store and the full
//! workflow catalog registered; `tubeops workflows` prints the catalog
//! available under the current configuration.

use anyhow::Context;
use clap::{value_parser, Arg, Command};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tubeops_core::{AdminConfig, WorkflowRegistry};
use tubeops_server::{router, AppState, InvocationQueue};
use tubeops_store::{seed_demo, MemoryStore};
use tubeops_workflows::registrar::{register_all, WorkflowDeps};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Command::new("tubeops")
        .version(tubeops_server::VERSION)
        .about("ViewTube operations console")
        .arg_required_else_help(false)
        .subcommand(
            Command::new("serve").about("Run the public web app").arg(
                Arg::new("port")
                    .long("port")
                    .value_parser(value_parser!(u16))
                    .help("Override the configured listen port"),
            ),
        )
        .subcommand(Command::new("workflows").about("List the registered workflow catalog"));

    let matches = cli.get_matches();

    // configuration is read exactly once, before anything else starts
    let config = AdminConfig::from_env().context("loading configuration")?;

    let store = Arc::new(MemoryStore::new());
    let summary = seed_demo(&store);
    tracing::info!(featured_video = %summary.featured_video, "store seeded");

    let deps = WorkflowDeps::from_config(&config, Arc::clone(&store))
        .context("constructing service collaborators")?;
    let registry = Arc::new(WorkflowRegistry::new());
    register_all(&registry, &deps);

    match matches.subcommand() {
        Some(("workflows", _)) => {
            for (slug, name) in registry.listed() {
                println!("{slug:<24} {name}");
            }
            Ok(())
        }
        _ => {
            let port = matches
                .subcommand_matches("serve")
                .and_then(|m| m.get_one::<u16>("port").copied())
                .unwrap_or(config.server.port);

            let state = AppState {
                store,
                queue: Arc::new(InvocationQueue::new()),
            };
            let app = router(state);

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
                .await
                .with_context(|| format!("binding port {port}"))?;
            tracing::info!(port, "listening");

            axum::serve(listener, app).await.context("serving")
        }
    }
}
