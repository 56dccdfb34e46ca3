use chrono::{DateTime, Utc};
use clap::Args;
use snapttl_core::labels::LABEL_SCHEMA_VERSION;
use snapttl_handler::{HandlerConfig, SnapshotHandler};

use super::EventSource;
use crate::output::{header, kv};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    source: EventSource,
    /// Pretend the invocation happens at this unix time
    #[arg(long)]
    at: Option<i64>,
    /// Print the job as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs, config: HandlerConfig) -> anyhow::Result<()> {
    let now = match args.at {
        Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| anyhow::anyhow!("--at {secs} is out of range"))?,
        None => Utc::now(),
    };

    let event = args.source.read()?;
    let handler = SnapshotHandler::from_config(config);
    let job = handler.plan(&event, now)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&job)?);
        return Ok(());
    }

    println!("{}", header("snapshot plan"));
    println!("{}", kv("folder", &job.folder_id));
    println!("{}", kv("disk", &job.disk_id));
    println!("{}", kv("name", &job.name));
    println!("{}", kv("description", &job.description));
    for (key, value) in &job.labels {
        println!("{}", kv(&format!("label {key}"), value));
    }
    println!("{}", kv("label schema", &format!("v{LABEL_SCHEMA_VERSION}")));
    Ok(())
}
