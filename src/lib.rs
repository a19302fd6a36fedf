pub mod analyzer;
pub mod common;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod service;
pub mod text;
pub mod vision;

#[cfg(test)]
mod testing;

pub use analyzer::{AnalysisRequest, WaterReportAnalyzer, WaterReportAnalyzerBuilder};
pub use common::{EncodedImage, SourceLabel};
pub use config::Configuration;
pub use error::{AppError, ConfigError, InputError, PipelineError, ServiceError};
pub use pipeline::{Report, ReportPipeline, StageKind};
