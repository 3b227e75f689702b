pub mod core;
pub mod dispatch;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pipeline;

// Re-export commonly used types
pub use crate::core::{Config, FailureMode, FailurePolicy, PipelineError, PipelineResult};
pub use models::{ImageRef, PaymentFields, PaymentInfo, StorageEvent};
pub use pipeline::{Pipeline, RecordOutcome, RunSummary, Stage};
