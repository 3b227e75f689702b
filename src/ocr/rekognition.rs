use async_trait::async_trait;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::types::{Image, S3Object};
use aws_sdk_rekognition::Client;

use super::{TextDetector, TextFragment};
use crate::core::OcrError;
use crate::models::ImageRef;

/// Text detection backed by Amazon Rekognition `DetectText`, reading the
/// image straight from S3.
pub struct RekognitionDetector {
    client: Client,
}

impl RekognitionDetector {
    pub fn new(client: Client) -> Self {
        RekognitionDetector { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        RekognitionDetector::new(Client::new(config))
    }
}

#[async_trait]
impl TextDetector for RekognitionDetector {
    async fn detect_text(&self, image: &ImageRef) -> Result<Vec<TextFragment>, OcrError> {
        let s3_object = S3Object::builder()
            .bucket(&image.bucket)
            .name(&image.key)
            .build();

        let response = self
            .client
            .detect_text()
            .image(Image::builder().s3_object(s3_object).build())
            .send()
            .await
            .map_err(|e| OcrError::Provider {
                bucket: image.bucket.clone(),
                key: image.key.clone(),
                source: DisplayErrorContext(e).to_string().into(),
            })?;

        let fragments = response
            .text_detections()
            .iter()
            .map(|detection| {
                TextFragment::new(detection.detected_text().unwrap_or_default(), detection.id())
            })
            .collect();

        Ok(fragments)
    }
}
