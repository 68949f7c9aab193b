//! Image descriptions from a vision-capable chat model.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::llm::{ChatMessage, ChatModel, ChatRequest};
use crate::error::CaptionError;
use crate::models::OpenAiConfig;

pub const CAPTION_PROMPT: &str = "Describe the content of this image, including any text, objects, and their locations, in a detailed JSON format.";

/// MIME type for image extensions the vision model accepts.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Sends an image plus a fixed instruction to the vision model.
#[derive(Clone)]
pub struct Captioner {
    model: Arc<dyn ChatModel>,
    model_id: String,
    max_tokens: u32,
}

impl Captioner {
    pub fn new(model: Arc<dyn ChatModel>, config: &OpenAiConfig) -> Self {
        Self {
            model,
            model_id: config.vision_model.clone(),
            max_tokens: config.caption_max_tokens,
        }
    }

    /// Describe the image at `path`. The description is meant to be JSON but is
    /// not validated.
    pub async fn caption(&self, path: &Path) -> Result<String, CaptionError> {
        let mime = image_mime_type(path)
            .ok_or_else(|| CaptionError::UnsupportedFormat(path.display().to_string()))?;

        let bytes = tokio::fs::read(path).await?;
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));

        let request = ChatRequest {
            model: self.model_id.clone(),
            messages: vec![ChatMessage::user_with_image(CAPTION_PROMPT, data_url)],
            max_tokens: self.max_tokens,
        };

        let description = self.model.complete(&request).await?;
        if description.trim().is_empty() {
            return Err(CaptionError::EmptyDescription);
        }
        Ok(description)
    }
}
