use clap::Args;
use snapttl_handler::{disposition, Disposition, HandlerConfig, SnapshotHandler};

use super::EventSource;

#[derive(Args)]
pub struct InvokeArgs {
    #[command(flatten)]
    source: EventSource,
}

pub async fn run(args: InvokeArgs, config: HandlerConfig) -> anyhow::Result<()> {
    let event = args.source.read()?;
    let handler = SnapshotHandler::from_config(config);

    let result = handler.handle(&event).await;
    if disposition(&result) == Disposition::Redeliver {
        tracing::warn!("invocation failed; the message will be redelivered");
    }

    let response = result?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
