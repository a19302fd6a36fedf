pub mod orchestration;
pub mod stages;
pub mod types;

pub use orchestration::{ReportPipeline, RunOptions, StageKind, StageParams, StageTimings, TextStage};
pub use stages::{FactCorrectionStage, MarkdownFormatStage, TranslationStage};
pub use types::{RawDescription, Report, TranslatedReport, REPORT_FILE_STEM};
