use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::common::{EncodedImage, SourceLabel};
use crate::error::{AppError, ServiceError};
use crate::pipeline::RawDescription;
use crate::prompts::PromptTemplate;
use crate::service::{SamplingParams, VisionModel};

/// Turns one image into free-form report text through a hosted VLM.
pub struct VisionDescriber {
    model: Arc<dyn VisionModel>,
    template: PromptTemplate,
    sampling: SamplingParams,
}

impl VisionDescriber {
    pub fn new(model: Arc<dyn VisionModel>, template: PromptTemplate) -> Self {
        Self {
            model,
            template,
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Prompt sent for `label`, with the user's label as a context line.
    pub fn prompt_for(&self, label: SourceLabel) -> String {
        self.template.render(&[("label", label.name())])
    }

    /// Makes exactly one model call, or none when the label is unset.
    #[instrument(skip(self, image), fields(model = self.model.model_name()))]
    pub async fn describe(
        &self,
        image: &EncodedImage,
        label: SourceLabel,
    ) -> Result<RawDescription, AppError> {
        let label = label.require_set()?;
        let prompt = self.prompt_for(label);

        let text = self
            .model
            .describe_image(&prompt, image, self.sampling)
            .await
            .inspect_err(|e| error!("Vision model call failed: {}", e))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyCompletion(self.model.model_name().to_string()).into());
        }

        info!(chars = text.len(), "Image described");
        Ok(RawDescription::new(text, label, self.model.model_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::prompts::{TemplateRegistry, VISION_DESCRIPTION};
    use crate::testing::{sample_image, FakeVisionModel};

    fn describer(model: Arc<FakeVisionModel>) -> VisionDescriber {
        let template = TemplateRegistry::default()
            .require(VISION_DESCRIPTION)
            .unwrap()
            .clone();
        VisionDescriber::new(model, template)
    }

    #[tokio::test]
    async fn unset_label_makes_no_call() {
        let model = Arc::new(FakeVisionModel::with_reply("Clear water."));
        let err = describer(model.clone())
            .describe(&sample_image(), SourceLabel::None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Input(InputError::UnsetLabel)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn label_is_part_of_the_prompt() {
        let model = Arc::new(FakeVisionModel::with_reply("  Clear water.\n"));
        let raw = describer(model.clone())
            .describe(&sample_image(), SourceLabel::SuspectedContamination)
            .await
            .unwrap();

        assert_eq!(raw.as_str(), "Clear water.");
        assert_eq!(raw.label(), SourceLabel::SuspectedContamination);
        assert_eq!(raw.model(), "fake-vision");
        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("The user reports the water source as: suspected contamination."));
        assert!(prompt.contains("Safety"));
        assert!(!prompt.contains("{label}"));
    }

    #[tokio::test]
    async fn failure_surfaces_as_single_service_error() {
        let model = Arc::new(FakeVisionModel::failing(500));
        let err = describer(model.clone())
            .describe(&sample_image(), SourceLabel::River)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Service(ServiceError::Status { status: 500, .. })
        ));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn blank_reply_is_an_empty_completion() {
        let model = Arc::new(FakeVisionModel::with_reply("   "));
        let err = describer(model)
            .describe(&sample_image(), SourceLabel::Sea)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Service(ServiceError::EmptyCompletion(_))));
    }
}
