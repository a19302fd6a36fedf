use std::sync::Arc;

use async_trait::async_trait;

use super::prompted_call;
use crate::error::ServiceError;
use crate::pipeline::orchestration::{StageKind, StageParams, TextStage};
use crate::prompts::PromptTemplate;
use crate::service::LanguageModel;

/// Translates corrected prose, keeping its sections and tone.
pub struct TranslationStage {
    model: Arc<dyn LanguageModel>,
    template: PromptTemplate,
    default_language: String,
}

impl TranslationStage {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        template: PromptTemplate,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            model,
            template,
            default_language: default_language.into(),
        }
    }
}

#[async_trait]
impl TextStage for TranslationStage {
    async fn transform(&self, text: &str, params: &StageParams) -> Result<String, ServiceError> {
        let language = params
            .target_language
            .as_deref()
            .unwrap_or(&self.default_language);
        prompted_call(
            self.model.as_ref(),
            &self.template,
            text,
            &[("language", language)],
        )
        .await
    }

    fn kind(&self) -> StageKind {
        StageKind::Translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{TemplateRegistry, TRANSLATION};
    use crate::testing::ScriptedLanguageModel;

    fn stage(model: Arc<ScriptedLanguageModel>) -> TranslationStage {
        let template = TemplateRegistry::default()
            .require(TRANSLATION)
            .unwrap()
            .clone();
        TranslationStage::new(model, template, "Urdu")
    }

    #[tokio::test]
    async fn defaults_to_configured_language() {
        let model = Arc::new(ScriptedLanguageModel::report_writer());
        let output = stage(model.clone())
            .transform("The sea is calm.", &StageParams::default())
            .await
            .unwrap();

        assert_eq!(output, "[Urdu] The sea is calm.");
        assert!(model.calls()[0].role.contains("accurate Urdu."));
    }

    #[tokio::test]
    async fn params_override_language() {
        let model = Arc::new(ScriptedLanguageModel::report_writer());
        let output = stage(model.clone())
            .transform(
                "The sea is calm.",
                &StageParams::with_target_language("French"),
            )
            .await
            .unwrap();

        assert_eq!(output, "[French] The sea is calm.");
        assert_eq!(model.calls()[0].output_field, "Translated Text");
    }
}
