use std::sync::Arc;

use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use serde::Serialize;

use crate::core::{Config, FailureMode, FailurePolicy, PipelineError, PipelineResult};
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::extraction::{BedrockInvoker, FieldExtractor, ModelInvoker};
use crate::models::{derive_user, ImageRef, PaymentInfo, StorageEvent};
use crate::ocr::{RekognitionDetector, TextDetector, TextExtractor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    TextDetection,
    FieldExtraction,
    Dispatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Delivered {
        info: PaymentInfo,
        #[serde(skip)]
        report: DispatchReport,
    },
    /// A stage failed under a `skip` policy; nothing was sent.
    Skipped { stage: Stage, reason: String },
    /// The record was built but the endpoint did not accept it.
    DeliveryFailed { info: PaymentInfo, reason: String },
    /// A stage failed under an `abort` policy while other records of the
    /// same notification went through.
    Failed { stage: Stage, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub bucket: String,
    pub key: String,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub records: Vec<RecordReport>,
}

impl RunSummary {
    pub fn delivered(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, RecordOutcome::Delivered { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, RecordOutcome::Failed { .. }))
            .count()
    }
}

/// OCR, model extraction and dispatch for each uploaded receipt.
pub struct Pipeline {
    text: TextExtractor,
    fields: FieldExtractor,
    dispatcher: Dispatcher,
    policy: FailurePolicy,
}

impl Pipeline {
    pub fn new(
        detector: Arc<dyn TextDetector>,
        invoker: Arc<dyn ModelInvoker>,
        http: reqwest::Client,
        config: &Config,
    ) -> Self {
        Pipeline {
            text: TextExtractor::new(detector, config.line_break_id),
            fields: FieldExtractor::new(invoker, config),
            dispatcher: Dispatcher::new(http, config.transaction_endpoint.clone()),
            policy: config.failure_policy,
        }
    }

    /// Builds the pipeline against Rekognition and Bedrock, sharing one
    /// AWS configuration.
    pub async fn from_config(config: &Config) -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        tracing::info!(
            region = ?sdk_config.region(),
            model_id = %config.model_id,
            endpoint = %config.transaction_endpoint,
            "Pipeline clients initialized"
        );

        Pipeline::new(
            Arc::new(RekognitionDetector::from_sdk_config(&sdk_config)),
            Arc::new(BedrockInvoker::from_sdk_config(&sdk_config)),
            reqwest::Client::new(),
            config,
        )
    }

    /// Processes every record of the notification, each on its own.
    ///
    /// A single-record notification fails with that record's error. In a
    /// batch, aborted records are reported as `Failed` and the run only
    /// fails when nothing was delivered, so a retried invocation never
    /// posts an accepted record twice.
    pub async fn run(&self, event: &StorageEvent) -> PipelineResult<RunSummary> {
        if event.records.is_empty() {
            return Err(PipelineError::EmptyEvent);
        }
        if let [record] = event.records.as_slice() {
            let image = ImageRef::from_record(record);
            let outcome = self.process_record(&image).await?;
            return Ok(RunSummary {
                records: vec![RecordReport {
                    bucket: image.bucket,
                    key: image.key,
                    outcome,
                }],
            });
        }

        let total = event.records.len();
        let mut summary = RunSummary::default();
        let mut first_failure = None;

        for record in &event.records {
            let image = ImageRef::from_record(record);

            let outcome = match self.attempt(&image).await {
                Ok(outcome) => outcome,
                Err((stage, e)) => {
                    tracing::error!(bucket = %image.bucket, key = %image.key, ?stage, "Record failed: {}", e);
                    let reason = e.to_string();
                    if first_failure.is_none() {
                        first_failure = Some(reason.clone());
                    }
                    RecordOutcome::Failed { stage, reason }
                }
            };
            summary.records.push(RecordReport {
                bucket: image.bucket,
                key: image.key,
                outcome,
            });
        }

        let delivered = summary.delivered();
        let failed = summary.failed();
        tracing::info!(total, delivered, failed, "Notification processed");

        match first_failure {
            Some(first) if delivered == 0 => Err(PipelineError::RecordsFailed { failed, total, first }),
            _ => Ok(summary),
        }
    }

    pub async fn process_record(&self, image: &ImageRef) -> PipelineResult<RecordOutcome> {
        self.attempt(image).await.map_err(|(_, e)| e)
    }

    /// Runs one record through every stage; an aborting failure carries the
    /// stage it happened in.
    #[tracing::instrument(skip(self, image), fields(bucket = %image.bucket, key = %image.key))]
    async fn attempt(&self, image: &ImageRef) -> Result<RecordOutcome, (Stage, PipelineError)> {
        let text = match self.text.extract(image).await {
            Ok(text) => text,
            Err(e) => return self.stage_failed(Stage::TextDetection, self.policy.ocr, e.into()),
        };

        let fields = match self.fields.extract(&text).await {
            Ok(Some(fields)) => fields,
            Ok(None) => {
                let err = PipelineError::UnparseableReply {
                    bucket: image.bucket.clone(),
                    key: image.key.clone(),
                };
                return self.stage_failed(Stage::FieldExtraction, self.policy.unparseable_reply, err);
            }
            Err(e) => {
                return self.stage_failed(Stage::FieldExtraction, self.policy.model, e.into())
            }
        };

        let info = PaymentInfo::from_fields(fields, derive_user(&image.key));

        match self.dispatcher.send(&info).await {
            Ok(report) => Ok(RecordOutcome::Delivered { info, report }),
            Err(e) => {
                tracing::error!(policy = %self.policy.dispatch, "Error sending payment info: {}", e);
                match self.policy.dispatch {
                    FailureMode::Abort => Err((Stage::Dispatch, e.into())),
                    FailureMode::Skip => Ok(RecordOutcome::DeliveryFailed {
                        info,
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }

    fn stage_failed(
        &self,
        stage: Stage,
        mode: FailureMode,
        err: PipelineError,
    ) -> Result<RecordOutcome, (Stage, PipelineError)> {
        match mode {
            FailureMode::Abort => Err((stage, err)),
            FailureMode::Skip => {
                tracing::warn!(?stage, "Skipping record: {}", err);
                Ok(RecordOutcome::Skipped {
                    stage,
                    reason: err.to_string(),
                })
            }
        }
    }
}
