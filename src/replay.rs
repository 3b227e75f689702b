use std::io::Read;

use anyhow::{Context, Result};
use receipt_pipeline::{Config, Pipeline, StorageEvent};
use tracing_subscriber::EnvFilter;

/// Runs a captured S3 notification through the pipeline outside Lambda.
///
/// Usage: `replay [event.json]`; reads the event from stdin when no path is
/// given.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("could not read event file {}", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("could not read event from stdin")?;
            buffer
        }
    };

    let event: StorageEvent = serde_json::from_str(&raw).context("event is not an S3 notification")?;

    let config = Config::from_env()?;
    let pipeline = Pipeline::from_config(&config).await;

    let summary = pipeline.run(&event).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
