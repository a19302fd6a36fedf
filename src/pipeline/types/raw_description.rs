use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::SourceLabel;

/// Unedited text returned by the vision model for one image.
///
/// Immutable once produced; the only input a pipeline run accepts.
#[derive(Debug, Clone)]
pub struct RawDescription {
    text: String,
    label: SourceLabel,
    model: String,
    pub id: Uuid,
    pub described_at: DateTime<Utc>,
}

impl RawDescription {
    pub fn new(text: impl Into<String>, label: SourceLabel, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label,
            model: model.into(),
            id: Uuid::new_v4(),
            described_at: Utc::now(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn label(&self) -> SourceLabel {
        self.label
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
