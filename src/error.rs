use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::StageKind;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Input Error: {0}")]
    Input(#[from] InputError),
    #[error("Service Error: {0}")]
    Service(#[from] ServiceError),
    #[error("Pipeline Error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to write report to {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

// Rejected before any network call is made
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("No image was provided.")]
    MissingImage,
    #[error("The image could not be decoded: {0}")]
    InvalidImage(String),
    #[error("Please select a water source type.")]
    UnsetLabel,
    #[error("Unknown water source type '{0}'.")]
    UnknownLabel(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("Request to {endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Model '{0}' returned an empty completion")]
    EmptyCompletion(String),
    #[error("Malformed completion: {0}")]
    MalformedCompletion(String),
}

#[derive(Error, Debug)]
#[error("Stage '{stage}' failed: {source}")]
pub struct PipelineError {
    pub stage: StageKind,
    #[source]
    pub source: ServiceError,
}

impl PipelineError {
    pub fn new(stage: StageKind, source: ServiceError) -> Self {
        Self { stage, source }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Missing API key for the {0} model service")]
    MissingApiKey(&'static str),
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
    #[error("Failed to read template {path}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
}
