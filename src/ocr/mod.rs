pub mod rekognition;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::OcrError;
use crate::models::ImageRef;

pub use rekognition::RekognitionDetector;

/// One piece of text reported by the OCR provider.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub id: Option<i32>,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, id: Option<i32>) -> Self {
        TextFragment {
            text: text.into(),
            id,
        }
    }
}

#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Returns the detected fragments in provider order.
    async fn detect_text(&self, image: &ImageRef) -> Result<Vec<TextFragment>, OcrError>;
}

/// Joins fragments in the order given, each followed by a space, with a
/// line break after the fragment whose id equals `line_break_after_id`.
pub fn concatenate_fragments(fragments: &[TextFragment], line_break_after_id: Option<i32>) -> String {
    let mut text = String::new();
    for fragment in fragments {
        text.push_str(&fragment.text);
        text.push(' ');
        if line_break_after_id.is_some() && fragment.id == line_break_after_id {
            text.push('\n');
        }
    }
    text
}

pub struct TextExtractor {
    detector: Arc<dyn TextDetector>,
    line_break_after_id: Option<i32>,
}

impl TextExtractor {
    pub fn new(detector: Arc<dyn TextDetector>, line_break_after_id: Option<i32>) -> Self {
        TextExtractor {
            detector,
            line_break_after_id,
        }
    }

    pub async fn extract(&self, image: &ImageRef) -> Result<String, OcrError> {
        let fragments = match self.detector.detect_text(image).await {
            Ok(fragments) => fragments,
            Err(e) => {
                tracing::error!("Error detecting text: {}", e);
                return Err(e);
            }
        };

        let text = concatenate_fragments(&fragments, self.line_break_after_id);
        tracing::info!(fragments = fragments.len(), "Extracted text: {}", text);

        Ok(text)
    }
}
