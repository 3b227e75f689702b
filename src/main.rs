use std::sync::Arc;

use lambda_runtime::{service_fn, Error as LambdaError, LambdaEvent};
use receipt_pipeline::{Config, Pipeline, RunSummary, StorageEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    // CloudWatch stamps each line, so no timestamps or colours here
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_ansi(false)
        .without_time()
        .with_current_span(true)
        .init();

    tracing::info!("Starting receipt pipeline");

    // Fail the cold start rather than the first invocation
    let config = Config::from_env()?;
    let pipeline = Arc::new(Pipeline::from_config(&config).await);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<StorageEvent>| {
        let pipeline = pipeline.clone();
        async move { handle(&pipeline, event).await }
    }))
    .await
}

async fn handle(pipeline: &Pipeline, event: LambdaEvent<StorageEvent>) -> Result<RunSummary, LambdaError> {
    let (payload, context) = event.into_parts();
    tracing::info!(
        request_id = %context.request_id,
        records = payload.records.len(),
        "Received storage notification"
    );

    let summary = pipeline.run(&payload).await?;
    Ok(summary)
}
