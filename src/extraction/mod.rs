pub mod bedrock;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::core::{Config, ExtractionError};
use crate::models::PaymentFields;

pub use bedrock::BedrockInvoker;
pub use prompt::{build_prompt, ChatRequest};

#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Sends a JSON request body to `model_id` and returns the raw response body.
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, ExtractionError>;
}

/// Turns receipt text into payment fields with a hosted model.
pub struct FieldExtractor {
    invoker: Arc<dyn ModelInvoker>,
    model_id: String,
    max_tokens: u32,
    temperature: f32,
}

impl FieldExtractor {
    pub fn new(invoker: Arc<dyn ModelInvoker>, config: &Config) -> Self {
        FieldExtractor {
            invoker,
            model_id: config.model_id.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub async fn extract(&self, text: &str) -> Result<Option<PaymentFields>, ExtractionError> {
        self.extract_on(text, Utc::now().date_naive()).await
    }

    /// Returns `Ok(None)` when the model answered but its content is not a
    /// payment record.
    pub async fn extract_on(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> Result<Option<PaymentFields>, ExtractionError> {
        let prompt = build_prompt(text, today);
        let body = serde_json::to_vec(&ChatRequest::user(&prompt, self.max_tokens, self.temperature))?;

        let response = match self.invoker.invoke(&self.model_id, body).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(model_id = %self.model_id, "Error invoking model: {}", e);
                return Err(e);
            }
        };

        let content = match reply_content(&response)? {
            Some(content) => content,
            None => {
                tracing::error!("Model reply has no choices[0].message.content");
                return Ok(None);
            }
        };

        match serde_json::from_str::<PaymentFields>(content.trim()) {
            Ok(fields) => Ok(Some(fields)),
            Err(e) => {
                tracing::error!(content = %content, "Error parsing JSON from model reply: {}", e);
                Ok(None)
            }
        }
    }
}

/// Pulls `choices[0].message.content` out of a chat-completion body.
/// Only a body that is not JSON at all is an error; a JSON body without
/// message content yields `None`.
fn reply_content(body: &[u8]) -> Result<Option<String>, ExtractionError> {
    let raw = std::str::from_utf8(body)
        .map_err(|e| ExtractionError::Envelope(format!("response body is not UTF-8: {}", e)))?;
    tracing::debug!("Model response: {}", raw);

    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| ExtractionError::Envelope(format!("response body is not JSON: {}", e)))?;

    Ok(parsed
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string))
}
