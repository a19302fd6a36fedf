use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::wire::{ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageUrl, MessageContent};
use super::{Completion, CompletionRequest, LanguageModel, SamplingParams, VisionModel};
use crate::common::EncodedImage;
use crate::config::{LanguageSettings, VisionSettings};
use crate::error::{ConfigError, ServiceError};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Serves as the vision model (Groq by default) and as the text model
/// (OpenAI by default). Retries are left to the hosted service.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
    max_tokens: Option<u32>,
}

impl ChatCompletionsClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            max_tokens: None,
        })
    }

    pub fn for_vision(settings: &VisionSettings, api_key: &str) -> Result<Self, ConfigError> {
        Self::new(&settings.base_url, api_key, &settings.model, settings.timeout())
    }

    pub fn for_language(settings: &LanguageSettings, api_key: &str) -> Result<Self, ConfigError> {
        Ok(
            Self::new(&settings.base_url, api_key, &settings.model, settings.timeout())?
                .with_max_tokens(settings.max_tokens),
        )
    }

    /// Caps output tokens on text completions
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, ServiceError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedCompletion(e.to_string()))?;

        let text = parsed
            .into_text()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ServiceError::EmptyCompletion(self.model.clone()))?;

        debug!(model = %self.model, chars = text.len(), "Received completion");
        Ok(text)
    }

    fn transport_error(&self, error: reqwest::Error) -> ServiceError {
        if error.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else {
            ServiceError::Transport {
                endpoint: self.endpoint.clone(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl VisionModel for ChatCompletionsClient {
    #[instrument(skip(self, prompt, image), fields(model = %self.model))]
    async fn describe_image(
        &self,
        prompt: &str,
        image: &EncodedImage,
        sampling: SamplingParams,
    ) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                ]),
            }],
            temperature: Some(sampling.temperature),
            max_tokens: Some(sampling.max_tokens),
            top_p: Some(sampling.top_p),
            stream: false,
        };

        self.send(&request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    #[instrument(skip(self, request), fields(model = %self.model, output = request.output_field))]
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ServiceError> {
        let user_message = request.user_message();
        let chat_request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(request.role),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(&user_message),
                },
            ],
            temperature: None,
            max_tokens: self.max_tokens,
            top_p: None,
            stream: false,
        };

        let raw = self.send(&chat_request).await?;
        Completion::parse(&raw, request.output_field, &self.model)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
