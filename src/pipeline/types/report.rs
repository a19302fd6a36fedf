use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::orchestration::StageTimings;

pub const REPORT_FILE_STEM: &str = "water_quality_report";

/// Markdown rendering of a report in a second language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedReport {
    pub language: String,
    pub markdown: String,
}

/// Final output of a pipeline run. Held only until it is shown or saved.
#[derive(Debug, Clone)]
pub struct Report {
    pub run_id: Uuid,
    pub primary_markdown: String,
    pub translated: Option<TranslatedReport>,
    pub generated_at: DateTime<Utc>,
    pub timings: StageTimings,
}

impl Report {
    pub fn new(
        run_id: Uuid,
        primary_markdown: String,
        translated: Option<TranslatedReport>,
        timings: StageTimings,
    ) -> Self {
        Self {
            run_id,
            primary_markdown,
            translated,
            generated_at: Utc::now(),
            timings,
        }
    }

    pub fn translated_markdown(&self) -> Option<&str> {
        self.translated.as_ref().map(|t| t.markdown.as_str())
    }

    /// Number of Markdown artifacts: one, or two with a translation
    pub fn artifact_count(&self) -> usize {
        1 + usize::from(self.translated.is_some())
    }

    /// File names the artifacts are saved under, primary first
    pub fn file_names(&self) -> Vec<String> {
        let mut names = vec![format!("{}.md", REPORT_FILE_STEM)];
        if let Some(translated) = &self.translated {
            names.push(format!(
                "{}.{}.md",
                REPORT_FILE_STEM,
                file_safe(&translated.language)
            ));
        }
        names
    }

    /// Writes every artifact into `dir`, returning the written paths.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        std::fs::create_dir_all(dir).map_err(|source| AppError::Output {
            path: dir.to_path_buf(),
            source,
        })?;

        let contents = std::iter::once(self.primary_markdown.as_str())
            .chain(self.translated_markdown());
        let mut written = Vec::with_capacity(self.artifact_count());
        for (name, markdown) in self.file_names().into_iter().zip(contents) {
            let path = dir.join(name);
            std::fs::write(&path, markdown).map_err(|source| AppError::Output {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }
        Ok(written)
    }
}

fn file_safe(language: &str) -> String {
    let name: String = language
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    if name.is_empty() {
        "translated".to_string()
    } else {
        name
    }
}
