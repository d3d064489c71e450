use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use sm_policy_agent::fetch::policy::LinkKind;
use sm_policy_agent::observability::metrics::get_metrics;
use sm_policy_agent::utils::config_loader;
use sm_policy_agent::utils::logging;
use sm_policy_agent::utils::logging::LogLevel;
use sm_policy_agent::PolicyAgent;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "sm-policy-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    /// print Prometheus metrics to stderr before exiting
    #[arg(long)]
    dump_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all objects of a policy class, e.g. SmRealm
    List { class: String },
    /// Search a policy class with a filter expression
    Search {
        class: String,
        filter: String,
        /// also fetch details of the first hits
        #[arg(long)]
        details: bool,
    },
    /// Fetch object details by href (cached)
    Href { href: String },
    /// Fetch an object by id
    Get { id: String },
    /// Fetch a link endpoint of an object (cached)
    Link {
        #[arg(value_enum)]
        kind: LinkKind,
        id_or_url: String,
    },
    /// Check that a session key can be obtained
    Token,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    //
    // read .env and args
    // -------------------------------

    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 3. Wire caches, credentials and clients
    // -------------------------------

    let agent = PolicyAgent::from_config(&service_config)?;

    // -------------------------------
    // 4. Run the command
    // -------------------------------

    let output: Value = match args.command {
        Command::List { class } => Value::Array(agent.policy.fetch_list(&class, None).await),
        Command::Search { class, filter, details: false } => {
            Value::Array(agent.policy.search_filtered(&class, &filter, None).await)
        }
        Command::Search { class, filter, details: true } => {
            let found = agent.policy.search_with_details(&class, &filter, None).await;
            json!({ "items": found.items, "details": found.details })
        }
        Command::Href { href } => agent.policy.fetch_by_href(&href, None).await,
        Command::Get { id } => agent.policy.fetch_by_id(&id, None).await,
        Command::Link { kind, id_or_url } => agent.policy.fetch_link(&id_or_url, kind, None).await,
        Command::Token => match agent.session_status().await {
            Ok(status) => status,
            Err(e) => bail!("could not establish a SiteMinder session: {}", e),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    info!("done, {} detail entries cached", agent.detail_cache.len().await);

    if args.dump_metrics {
        eprintln!("{}", get_metrics().await.render()?);
    }
    Ok(())
}
