use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::stage_service::{call_instrumented, StageRequest};
use super::stage_timings::StageTimings;
use super::text_stage::{StageKind, StageParams, TextStage};
use crate::error::{ConfigError, PipelineError};
use crate::pipeline::types::{RawDescription, Report, TranslatedReport};

const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(180);

/// Named intermediate texts of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Raw,
    Corrected,
    Translated,
    PrimaryMarkdown,
    TranslatedMarkdown,
}

impl Artifact {
    pub fn name(&self) -> &'static str {
        match self {
            Artifact::Raw => "raw",
            Artifact::Corrected => "corrected",
            Artifact::Translated => "translated",
            Artifact::PrimaryMarkdown => "primary_markdown",
            Artifact::TranslatedMarkdown => "translated_markdown",
        }
    }
}

/// One stage application: read `input`, write `output`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedStep {
    pub stage: StageKind,
    pub input: Artifact,
    pub output: Artifact,
}

impl PlannedStep {
    const fn new(stage: StageKind, input: Artifact, output: Artifact) -> Self {
        Self {
            stage,
            input,
            output,
        }
    }
}

/// Per-run switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub want_translation: bool,
    /// Overrides the translation stage's default language
    pub target_language: Option<String>,
}

/// Fact correction, optional translation, then Markdown formatting of every
/// text variant.
///
/// Each `run` walks an ordered list of steps once. Nothing is cached between
/// runs and a failed step ends the run without a report.
pub struct ReportPipeline {
    stages: IndexMap<StageKind, Arc<dyn TextStage>>,
    stage_timeout: Duration,
    default_language: String,
}

impl ReportPipeline {
    pub fn builder() -> ReportPipelineBuilder {
        ReportPipelineBuilder::new()
    }

    /// Steps of a run, in execution order.
    ///
    /// Translation reads the corrected prose, never the formatted primary
    /// report, and each variant is formatted on its own.
    pub fn plan(want_translation: bool) -> Vec<PlannedStep> {
        let mut steps = vec![PlannedStep::new(
            StageKind::FactCorrection,
            Artifact::Raw,
            Artifact::Corrected,
        )];
        if want_translation {
            steps.push(PlannedStep::new(
                StageKind::Translation,
                Artifact::Corrected,
                Artifact::Translated,
            ));
        }
        steps.push(PlannedStep::new(
            StageKind::MarkdownFormat,
            Artifact::Corrected,
            Artifact::PrimaryMarkdown,
        ));
        if want_translation {
            steps.push(PlannedStep::new(
                StageKind::MarkdownFormat,
                Artifact::Translated,
                Artifact::TranslatedMarkdown,
            ));
        }
        steps
    }

    pub async fn run(
        &self,
        raw: &RawDescription,
        want_translation: bool,
    ) -> Result<Report, PipelineError> {
        self.run_with(
            raw,
            &RunOptions {
                want_translation,
                target_language: None,
            },
        )
        .await
    }

    #[instrument(skip(self, raw, options), fields(description = %raw.id, translate = options.want_translation))]
    pub async fn run_with(
        &self,
        raw: &RawDescription,
        options: &RunOptions,
    ) -> Result<Report, PipelineError> {
        let run_id = Uuid::new_v4();
        let language = options
            .target_language
            .clone()
            .unwrap_or_else(|| self.default_language.clone());
        let params = StageParams::with_target_language(language.clone());

        let mut artifacts: IndexMap<Artifact, String> = IndexMap::new();
        artifacts.insert(Artifact::Raw, raw.as_str().to_string());
        let mut timings = StageTimings::new();

        for step in Self::plan(options.want_translation) {
            let stage = self.stages[&step.stage].clone();
            // plan() only reads artifacts written by earlier steps
            let input = artifacts[&step.input].clone();
            debug!(
                "Running {} on {} -> {}",
                step.stage,
                step.input.name(),
                step.output.name()
            );

            let request = StageRequest {
                text: input,
                params: params.clone(),
            };
            let (result, duration) = call_instrumented(stage, request, self.stage_timeout).await;
            timings.record(step.stage, step.output.name(), duration);

            let output = result.map_err(|e| PipelineError::new(step.stage, e))?;
            artifacts.insert(step.output, output);
        }

        let primary_markdown = artifacts
            .swap_remove(&Artifact::PrimaryMarkdown)
            .unwrap_or_default();
        let translated = artifacts
            .swap_remove(&Artifact::TranslatedMarkdown)
            .map(|markdown| TranslatedReport { language, markdown });

        info!(
            run = %run_id,
            artifacts = 1 + usize::from(translated.is_some()),
            elapsed_ms = timings.total().as_millis() as u64,
            "Report pipeline finished"
        );
        Ok(Report::new(run_id, primary_markdown, translated, timings))
    }
}

pub struct ReportPipelineBuilder {
    stages: IndexMap<StageKind, Arc<dyn TextStage>>,
    stage_timeout: Duration,
    default_language: String,
}

impl ReportPipelineBuilder {
    pub fn new() -> Self {
        Self {
            stages: IndexMap::new(),
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            default_language: "Urdu".to_string(),
        }
    }

    /// Registers a stage under its own kind, replacing any earlier one.
    pub fn stage(mut self, stage: Arc<dyn TextStage>) -> Self {
        self.stages.insert(stage.kind(), stage);
        self
    }

    pub fn stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn build(mut self) -> Result<ReportPipeline, ConfigError> {
        for kind in StageKind::ALL {
            if !self.stages.contains_key(&kind) {
                return Err(ConfigError::Invalid(format!(
                    "Report pipeline is missing the {} stage",
                    kind
                )));
            }
        }
        self.stages.sort_keys();
        Ok(ReportPipeline {
            stages: self.stages,
            stage_timeout: self.stage_timeout,
            default_language: self.default_language,
        })
    }
}

impl Default for ReportPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
