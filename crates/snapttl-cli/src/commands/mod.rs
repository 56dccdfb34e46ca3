pub mod invoke;
pub mod plan;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use snapttl_handler::{HandlerConfig, MessageQueueEvent};

#[derive(Subcommand)]
pub enum Commands {
    /// Handle one trigger event and print the response
    Invoke(invoke::InvokeArgs),
    /// Show the snapshot an event would produce, without calling the cloud
    Plan(plan::PlanArgs),
}

impl Commands {
    pub async fn run(self, config_path: Option<&Path>) -> anyhow::Result<()> {
        let config = load_config(config_path)?;
        match self {
            Commands::Invoke(args) => invoke::run(args, config).await,
            Commands::Plan(args) => plan::run(args, config),
        }
    }
}

/// Where the event comes from. Defaults to a trigger event on stdin.
#[derive(Args)]
pub struct EventSource {
    /// Read the trigger event from this file instead of stdin
    #[arg(long, conflicts_with = "body")]
    event: Option<PathBuf>,
    /// Wrap a bare job body, e.g. '{"folder_id":..,"disk_id":..,"disk_name":..}'
    #[arg(long)]
    body: Option<String>,
}

impl EventSource {
    pub fn read(&self) -> anyhow::Result<MessageQueueEvent> {
        if let Some(body) = &self.body {
            return Ok(MessageQueueEvent::single(body.clone()));
        }

        let raw = match &self.event {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading event from {}", path.display()))?,
            None => {
                let mut raw = String::new();
                std::io::stdin()
                    .read_to_string(&mut raw)
                    .context("reading event from stdin")?;
                raw
            }
        };
        Ok(MessageQueueEvent::from_json(&raw)?)
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<HandlerConfig> {
    let config = match path {
        Some(path) => HandlerConfig::load(path)?,
        None => HandlerConfig::from_env()?,
    };
    tracing::debug!(
        "ttl {}, failure policy {}, poll every {:?}",
        config.ttl,
        config.failure_policy,
        config.poll_interval
    );
    Ok(config)
}
