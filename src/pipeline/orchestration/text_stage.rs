use std::fmt;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::prompts;

/// The text transforms a report goes through.
///
/// Implements Ord based on execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Drops repeated sentences and real-world identifiers
    FactCorrection,
    /// Renders corrected text in another language
    Translation,
    /// Restructures prose into Markdown sections
    MarkdownFormat,
}

impl StageKind {
    pub const ALL: [StageKind; 3] = [
        StageKind::FactCorrection,
        StageKind::Translation,
        StageKind::MarkdownFormat,
    ];

    pub fn name(&self) -> &'static str {
        self.template_name()
    }

    /// Name of the prompt template the stage runs with
    pub fn template_name(&self) -> &'static str {
        match self {
            StageKind::FactCorrection => prompts::FACT_CORRECTION,
            StageKind::Translation => prompts::TRANSLATION,
            StageKind::MarkdownFormat => prompts::MARKDOWN_FORMAT,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            StageKind::FactCorrection => 1,
            StageKind::Translation => 2,
            StageKind::MarkdownFormat => 3,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialOrd for StageKind {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StageKind {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

/// Optional per-call parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageParams {
    /// Translation target; stages that do not translate ignore it
    pub target_language: Option<String>,
}

impl StageParams {
    pub fn with_target_language(language: impl Into<String>) -> Self {
        Self {
            target_language: Some(language.into()),
        }
    }
}

/// A single prompt-driven text transform.
///
/// Stages are stateless: the same input and parameters produce an
/// equivalent request every time, and nothing is kept between calls.
/// Ordering them is the pipeline's job.
#[async_trait]
pub trait TextStage: Send + Sync {
    async fn transform(&self, text: &str, params: &StageParams) -> Result<String, ServiceError>;

    fn kind(&self) -> StageKind;
}
