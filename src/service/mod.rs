//! Boundary to the hosted models.
//!
//! The rest of the crate only sees the two traits below. Both hosted services
//! are reached through [`ChatCompletionsClient`], which speaks the
//! OpenAI-compatible chat completions protocol.

pub mod chat_client;
mod completion;
mod wire;

pub use chat_client::ChatCompletionsClient;
pub use completion::{Completion, CompletionRequest};

use async_trait::async_trait;

use crate::common::EncodedImage;
use crate::config::VisionSettings;
use crate::error::ServiceError;

/// Sampling parameters sent with a vision request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 2048,
            top_p: 1.0,
        }
    }
}

impl From<&VisionSettings> for SamplingParams {
    fn from(settings: &VisionSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            top_p: settings.top_p,
        }
    }
}

/// A hosted model that accepts a text prompt plus one image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn describe_image(
        &self,
        prompt: &str,
        image: &EncodedImage,
        sampling: SamplingParams,
    ) -> Result<String, ServiceError>;

    fn model_name(&self) -> &str;
}

/// A hosted text-to-text model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ServiceError>;

    fn model_name(&self) -> &str;
}
