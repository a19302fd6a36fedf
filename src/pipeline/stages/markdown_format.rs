use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::prompted_call;
use crate::error::ServiceError;
use crate::pipeline::orchestration::{StageKind, StageParams, TextStage};
use crate::prompts::PromptTemplate;
use crate::service::LanguageModel;
use crate::text;

/// Below this share of input words surviving, the output is suspect
const MIN_TOKEN_COVERAGE: f64 = 0.6;

/// Re-renders prose as Markdown with one heading per report section.
pub struct MarkdownFormatStage {
    model: Arc<dyn LanguageModel>,
    template: PromptTemplate,
}

impl MarkdownFormatStage {
    pub fn new(model: Arc<dyn LanguageModel>, template: PromptTemplate) -> Self {
        Self { model, template }
    }
}

#[async_trait]
impl TextStage for MarkdownFormatStage {
    async fn transform(&self, text: &str, _params: &StageParams) -> Result<String, ServiceError> {
        let rendered = prompted_call(self.model.as_ref(), &self.template, text, &[]).await?;
        let markdown = text::strip_code_fence(&rendered).to_string();
        if markdown.is_empty() {
            return Err(ServiceError::EmptyCompletion(
                self.model.model_name().to_string(),
            ));
        }

        let coverage = text::token_coverage(text, &markdown);
        if coverage < MIN_TOKEN_COVERAGE {
            warn!(
                coverage,
                "Formatted report lost a large part of the input's wording"
            );
        }
        Ok(markdown)
    }

    fn kind(&self) -> StageKind {
        StageKind::MarkdownFormat
    }
}
