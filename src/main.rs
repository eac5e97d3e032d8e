//! peerinvited - invite administration for a peer.
//!
//! ```text
//! peerinvited <config.toml> create [uses] [note]
//! peerinvited <config.toml> create-modern [note]
//! peerinvited <config.toml> inspect <invite id>
//! ```

use anyhow::{Context, bail};
use peerinvite::config::{self, Config};
use peerinvite::invite::InviteOptions;
use peerinvite::proto::FeedId;
use peerinvite::rpc::LocalConnector;
use peerinvite::social::MemorySocialGraph;
use peerinvite::store::RedbInviteStore;
use peerinvite::{InviteNode, NodeParams};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: peerinvited <config.toml> (create [uses] [note] | create-modern [note] | inspect <id>)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the command result.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "config.toml".to_string());
    let command = args.next().unwrap_or_else(|| "create".to_string());
    let rest: Vec<String> = args.collect();

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;
    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    let keys = config.server.identity()?;
    info!(server = %config.server.name, id = %keys.id(), "Starting peerinvited");

    let store = Arc::new(
        RedbInviteStore::open(&config.invite.store_path)
            .with_context(|| format!("opening {}", config.invite.store_path))?,
    );
    let social = Arc::new(MemorySocialGraph::new(keys.id().clone()));
    let node = InviteNode::new(NodeParams {
        config: &config,
        keys,
        store,
        social,
        connector: Arc::new(LocalConnector::new()),
        peers: None,
    });

    match command.as_str() {
        "create" => {
            let uses = match rest.first() {
                Some(uses) => uses.parse().with_context(|| format!("invalid use count: {uses}"))?,
                None => 1,
            };
            let opts = InviteOptions {
                uses,
                note: rest.get(1).cloned(),
                ..Default::default()
            };
            println!("{}", node.create(opts).await?);
        }
        "create-modern" => {
            let opts = InviteOptions {
                modern: true,
                note: rest.first().cloned(),
                ..Default::default()
            };
            println!("{}", node.create(opts).await?);
        }
        "inspect" => {
            let Some(id) = rest.first() else {
                bail!(USAGE);
            };
            let id: FeedId = id.parse().with_context(|| format!("invalid invite id: {id}"))?;
            match node.inspect(&id).await? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => bail!("no invite with id {id}"),
            }
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
