use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_VISION_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_VISION_MODEL: &str = "llama-3.2-11b-vision-preview";
const DEFAULT_LANGUAGE_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LANGUAGE_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TARGET_LANGUAGE: &str = "Urdu";

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub vision: VisionSettings,
    pub language: LanguageSettings,
    pub pipeline: PipelineSettings,
    /// Directory holding `<stage>.txt` files that replace template instructions
    pub templates_dir: Option<PathBuf>,
}

/// Hosted vision-language model used by the describer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

/// Hosted text model used by every text stage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub stage_timeout_secs: u64,
    pub target_language: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            vision: VisionSettings::default(),
            language: LanguageSettings::default(),
            pipeline: PipelineSettings::default(),
            templates_dir: None,
        }
    }
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VISION_BASE_URL.to_string(),
            model: DEFAULT_VISION_MODEL.to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: 1.0,
            max_tokens: 2048,
            top_p: 1.0,
        }
    }
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LANGUAGE_BASE_URL.to_string(),
            model: DEFAULT_LANGUAGE_MODEL.to_string(),
            api_key: None,
            timeout_secs: 120,
            max_tokens: 4096,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stage_timeout_secs: 180,
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

impl VisionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LanguageSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PipelineSettings {
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}

impl Configuration {
    /// Loads defaults, then the optional TOML file, then `WATER_REPORT__*`
    /// environment variables. API keys fall back to `GROQ_API_KEY` and
    /// `OPENAI_API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("WATER_REPORT")
                .prefix_separator("__")
                .separator("__"),
        );

        let mut configuration: Configuration = builder.build()?.try_deserialize()?;

        if configuration.vision.api_key.is_none() {
            configuration.vision.api_key = std::env::var("GROQ_API_KEY").ok();
        }
        if configuration.language.api_key.is_none() {
            configuration.language.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        configuration.validate()?;
        Ok(configuration)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vision.model.trim().is_empty() || self.language.model.trim().is_empty() {
            return Err(ConfigError::Invalid("Model names must not be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.vision.temperature) {
            return Err(ConfigError::Invalid(
                "Vision temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.vision.top_p) || self.vision.top_p == 0.0 {
            return Err(ConfigError::Invalid(
                "Vision top_p must be in (0.0, 1.0]".to_string(),
            ));
        }

        if self.vision.max_tokens == 0 || self.language.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "Max tokens must be greater than 0".to_string(),
            ));
        }

        if self.vision.timeout_secs == 0
            || self.language.timeout_secs == 0
            || self.pipeline.stage_timeout_secs == 0
        {
            return Err(ConfigError::Invalid(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.target_language.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Target language must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn vision_api_key(&self) -> Result<&str, ConfigError> {
        non_empty_key(self.vision.api_key.as_deref()).ok_or(ConfigError::MissingApiKey("vision"))
    }

    pub fn language_api_key(&self) -> Result<&str, ConfigError> {
        non_empty_key(self.language.api_key.as_deref())
            .ok_or(ConfigError::MissingApiKey("language"))
    }
}

fn non_empty_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|k| !k.is_empty())
}

pub struct ConfigurationBuilder {
    configuration: Configuration,
}

impl ConfigurationBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    // Sets the vision model, this will override the loaded configuration.
    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.configuration.vision.model = model.into();
        self
    }

    // Sets the text model, this will override the loaded configuration.
    pub fn language_model(mut self, model: impl Into<String>) -> Self {
        self.configuration.language.model = model.into();
        self
    }

    pub fn vision_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.configuration.vision.base_url = base_url.into();
        self
    }

    pub fn language_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.configuration.language.base_url = base_url.into();
        self
    }

    pub fn api_keys(mut self, vision: impl Into<String>, language: impl Into<String>) -> Self {
        self.configuration.vision.api_key = Some(vision.into());
        self.configuration.language.api_key = Some(language.into());
        self
    }

    // Changes the translation target, this will override the loaded configuration.
    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.configuration.pipeline.target_language = language.into();
        self
    }

    pub fn build(self) -> Result<Configuration, ConfigError> {
        self.configuration.validate()?;
        Ok(self.configuration)
    }
}
