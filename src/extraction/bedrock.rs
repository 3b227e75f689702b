use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;

use super::ModelInvoker;
use crate::core::ExtractionError;

pub struct BedrockInvoker {
    client: Client,
}

impl BedrockInvoker {
    pub fn new(client: Client) -> Self {
        BedrockInvoker { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        BedrockInvoker::new(Client::new(config))
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, ExtractionError> {
        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| ExtractionError::Provider(DisplayErrorContext(e).to_string().into()))?;

        Ok(response.body.into_inner())
    }
}
