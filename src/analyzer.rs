use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::common::{EncodedImage, SourceLabel};
use crate::config::Configuration;
use crate::error::{AppError, ConfigError, InputError};
use crate::pipeline::{
    FactCorrectionStage, MarkdownFormatStage, Report, ReportPipeline, RunOptions, TranslationStage,
};
use crate::prompts::{
    TemplateRegistry, FACT_CORRECTION, MARKDOWN_FORMAT, TRANSLATION, VISION_DESCRIPTION,
};
use crate::service::{ChatCompletionsClient, LanguageModel, SamplingParams, VisionModel};
use crate::vision::VisionDescriber;

/// One user submission: an image, its source label and output options.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub image: Option<EncodedImage>,
    pub label: SourceLabel,
    pub want_translation: bool,
    pub target_language: Option<String>,
}

impl AnalysisRequest {
    pub fn new(image: EncodedImage, label: SourceLabel) -> Self {
        Self {
            image: Some(image),
            label,
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, target_language: Option<String>) -> Self {
        self.want_translation = true;
        self.target_language = target_language;
        self
    }

    /// Checks everything that can be checked without a network call.
    pub fn validate(&self) -> Result<(&EncodedImage, SourceLabel), InputError> {
        let image = self.image.as_ref().ok_or(InputError::MissingImage)?;
        let label = self.label.require_set()?;
        Ok((image, label))
    }
}

/// Describes an image and runs the report pipeline on the description.
pub struct WaterReportAnalyzer {
    describer: VisionDescriber,
    pipeline: ReportPipeline,
}

impl WaterReportAnalyzer {
    pub fn builder(configuration: Configuration) -> WaterReportAnalyzerBuilder {
        WaterReportAnalyzerBuilder::new(configuration)
    }

    /// Wires hosted clients for both models from `configuration`.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigError> {
        WaterReportAnalyzerBuilder::new(configuration.clone()).build()
    }

    pub fn new(describer: VisionDescriber, pipeline: ReportPipeline) -> Self {
        Self {
            describer,
            pipeline,
        }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Report, AppError> {
        let (image, label) = request.validate()?;
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", run = %run_id, label = %label);

        async move {
            let (width, height) = image.dimensions();
            info!(width, height, translate = request.want_translation, "Analyzing image");

            let raw = self.describer.describe(image, label).await?;
            let options = RunOptions {
                want_translation: request.want_translation,
                target_language: request.target_language.clone(),
            };
            let report = self.pipeline.run_with(&raw, &options).await?;

            info!(artifacts = report.artifact_count(), "Analysis complete");
            Ok::<_, AppError>(report)
        }
        .instrument(span)
        .await
    }
}

pub struct WaterReportAnalyzerBuilder {
    configuration: Configuration,
    registry: Option<TemplateRegistry>,
    vision_model: Option<Arc<dyn VisionModel>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    stage_timeout: Option<Duration>,
}

impl WaterReportAnalyzerBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            registry: None,
            vision_model: None,
            language_model: None,
            stage_timeout: None,
        }
    }

    // Sets the prompt templates, this will override the configured templates directory.
    pub fn registry(mut self, registry: TemplateRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    // Sets the vision model, this will override the configured hosted client.
    pub fn vision_model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.vision_model = Some(model);
        self
    }

    // Sets the text model, this will override the configured hosted client.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    // Adjusts the per-stage timeout exactly, this will override the configured whole seconds.
    pub fn stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<WaterReportAnalyzer, ConfigError> {
        let configuration = self.configuration;
        configuration.validate()?;

        let registry = match (self.registry, &configuration.templates_dir) {
            (Some(registry), _) => registry,
            (None, Some(dir)) => TemplateRegistry::default().with_overrides_from(dir)?,
            (None, None) => TemplateRegistry::default(),
        };

        let vision_model: Arc<dyn VisionModel> = match self.vision_model {
            Some(model) => model,
            None => Arc::new(ChatCompletionsClient::for_vision(
                &configuration.vision,
                configuration.vision_api_key()?,
            )?),
        };
        let language_model: Arc<dyn LanguageModel> = match self.language_model {
            Some(model) => model,
            None => Arc::new(ChatCompletionsClient::for_language(
                &configuration.language,
                configuration.language_api_key()?,
            )?),
        };

        let describer = VisionDescriber::new(
            vision_model,
            registry.require(VISION_DESCRIPTION)?.clone(),
        )
        .with_sampling(SamplingParams::from(&configuration.vision));

        let pipeline = ReportPipeline::builder()
            .stage(Arc::new(FactCorrectionStage::new(
                language_model.clone(),
                registry.require(FACT_CORRECTION)?.clone(),
            )))
            .stage(Arc::new(TranslationStage::new(
                language_model.clone(),
                registry.require(TRANSLATION)?.clone(),
                configuration.pipeline.target_language.clone(),
            )))
            .stage(Arc::new(MarkdownFormatStage::new(
                language_model,
                registry.require(MARKDOWN_FORMAT)?.clone(),
            )))
            .stage_timeout(
                self.stage_timeout
                    .unwrap_or_else(|| configuration.pipeline.stage_timeout()),
            )
            .default_language(configuration.pipeline.target_language.clone())
            .build()?;

        info!(
            vision = %configuration.vision.model,
            language = %configuration.language.model,
            templates = registry.len(),
            "Analyzer ready"
        );
        Ok(WaterReportAnalyzer::new(describer, pipeline))
    }
}
