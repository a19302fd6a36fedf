//! In-process stand-ins for the hosted models.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::common::EncodedImage;
use crate::error::ServiceError;
use crate::service::{Completion, CompletionRequest, LanguageModel, SamplingParams, VisionModel};
use crate::text;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: String,
    pub input: String,
    pub output_field: String,
}

type Reply = Box<dyn Fn(&RecordedCall) -> Result<String, ServiceError> + Send + Sync>;

/// Text model whose raw completions come from a closure.
pub struct ScriptedLanguageModel {
    reply: Reply,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl ScriptedLanguageModel {
    pub fn new(reply: impl Fn(&RecordedCall) -> Result<String, ServiceError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Waits `delay` before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answers every request with its own input
    pub fn echo() -> Self {
        Self::new(|call| Ok(format!("Reasoning: nothing to change.\n{}: {}", call.output_field, call.input)))
    }

    pub fn with_reply(raw: &str) -> Self {
        let raw = raw.to_string();
        Self::new(move |_| Ok(raw.clone()))
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(unavailable()))
    }

    /// Behaves like a well-mannered model for each stage.
    ///
    /// Corrections echo, translations are tagged `[<language>]`, and
    /// formatting turns each paragraph into a `# ` section of bullets.
    pub fn report_writer() -> Self {
        Self::new(write_report)
    }

    /// Like [`Self::report_writer`] but fails requests for `output_field`.
    pub fn failing_on(output_field: &'static str) -> Self {
        Self::new(move |call| {
            if call.output_field == output_field {
                Err(unavailable())
            } else {
                write_report(call)
            }
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn unavailable() -> ServiceError {
    ServiceError::Status {
        endpoint: "scripted".to_string(),
        status: 503,
        body: "unavailable".to_string(),
    }
}

fn write_report(call: &RecordedCall) -> Result<String, ServiceError> {
    let output = match call.output_field.as_str() {
        "Translated Text" => {
            let language = call
                .role
                .split("accurate ")
                .nth(1)
                .and_then(|rest| rest.split('.').next())
                .unwrap_or("unknown");
            format!("[{}] {}", language, call.input)
        }
        "Markdown" => render_sections(&call.input),
        _ => call.input.clone(),
    };
    Ok(format!("Reasoning: followed the instructions.\n{}: {}", call.output_field, output))
}

fn render_sections(input: &str) -> String {
    text::paragraphs(input)
        .iter()
        .map(|paragraph| {
            let title: Vec<&str> = paragraph
                .split_whitespace()
                .take(3)
                .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
                .collect();
            let bullets: Vec<String> = paragraph
                .lines()
                .flat_map(|line| line.split_inclusive(". "))
                .map(|sentence| format!("- {}", sentence.trim()))
                .collect();
            format!("# {}\n\n{}", title.join(" "), bullets.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ServiceError> {
        let call = RecordedCall {
            role: request.role.to_string(),
            input: request.input.to_string(),
            output_field: request.output_field.to_string(),
        };
        self.calls.lock().unwrap().push(call.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let raw = (self.reply)(&call)?;
        Completion::parse(&raw, request.output_field, "scripted-model")
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Vision model returning a fixed description, or failing.
pub struct FakeVisionModel {
    reply: Result<String, u16>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeVisionModel {
    pub fn with_reply(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for FakeVisionModel {
    async fn describe_image(
        &self,
        prompt: &str,
        _image: &EncodedImage,
        _sampling: SamplingParams,
    ) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(ServiceError::Status {
                endpoint: "fake-vision".to_string(),
                status: *status,
                body: "vision model unavailable".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "fake-vision"
    }
}

pub fn sample_image() -> EncodedImage {
    use image::{DynamicImage, ImageBuffer, Rgb};

    EncodedImage::from_image(&DynamicImage::ImageRgb8(
        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(8, 8, Rgb([70, 90, 60])),
    ))
    .expect("encode sample image")
}
