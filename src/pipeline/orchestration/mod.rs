pub mod report_pipeline;
pub mod stage_service;
pub mod stage_timings;
pub mod text_stage;

pub use report_pipeline::{Artifact, PlannedStep, ReportPipeline, ReportPipelineBuilder, RunOptions};
pub use stage_service::{call_instrumented, StageRequest, StageService};
pub use stage_timings::StageTimings;
pub use text_stage::{StageKind, StageParams, TextStage};
