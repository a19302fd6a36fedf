use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompted_call;
use crate::error::ServiceError;
use crate::pipeline::orchestration::{StageKind, StageParams, TextStage};
use crate::prompts::PromptTemplate;
use crate::service::LanguageModel;
use crate::text;

/// Cleans raw vision output: repeated sentences and real-world identifiers
/// go, observations about the water stay.
///
/// Verbatim repeats are also removed locally after the model call, so the
/// result never contains the same sentence twice.
pub struct FactCorrectionStage {
    model: Arc<dyn LanguageModel>,
    template: PromptTemplate,
}

impl FactCorrectionStage {
    pub fn new(model: Arc<dyn LanguageModel>, template: PromptTemplate) -> Self {
        Self { model, template }
    }
}

#[async_trait]
impl TextStage for FactCorrectionStage {
    async fn transform(&self, text: &str, _params: &StageParams) -> Result<String, ServiceError> {
        let corrected = prompted_call(self.model.as_ref(), &self.template, text, &[]).await?;

        let deduped = text::dedupe_sentences(&corrected);
        if deduped.len() != corrected.len() {
            debug!(
                removed_chars = corrected.len() - deduped.len(),
                "Removed repeated sentences the model kept"
            );
        }
        if deduped.trim().is_empty() {
            return Err(ServiceError::EmptyCompletion(
                self.model.model_name().to_string(),
            ));
        }
        Ok(deduped)
    }

    fn kind(&self) -> StageKind {
        StageKind::FactCorrection
    }
}
