//! Named, versioned prompt templates.
//!
//! Every model call in the crate takes its fixed text from a
//! [`PromptTemplate`] held in a [`TemplateRegistry`]. The defaults live in
//! [`templates`]; a directory of `<name>.txt` files can replace the
//! instructions of individual templates without touching stage code.

pub mod templates;

use std::path::Path;

use indexmap::IndexMap;
use tracing::info;

use crate::error::ConfigError;

pub const VISION_DESCRIPTION: &str = "vision_description";
pub const FACT_CORRECTION: &str = "fact_correction";
pub const TRANSLATION: &str = "translation";
pub const MARKDOWN_FORMAT: &str = "markdown_format";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub version: u32,
    /// Who the model is and what it must preserve
    pub role: String,
    pub instructions: String,
    /// Label of the dynamic text in the user message
    pub input_field: String,
    /// Label the model must put in front of its answer
    pub output_field: String,
}

impl PromptTemplate {
    pub fn new(name: &str, version: u32, role: &str, instructions: &str) -> Self {
        Self {
            name: name.to_string(),
            version,
            role: role.to_string(),
            instructions: instructions.to_string(),
            input_field: String::new(),
            output_field: String::new(),
        }
    }

    pub fn with_fields(mut self, input_field: &str, output_field: &str) -> Self {
        self.input_field = input_field.to_string();
        self.output_field = output_field.to_string();
        self
    }

    /// Role and instructions joined, with `{key}` placeholders substituted.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut text = format!("{}\n\n{}", self.role, self.instructions);
        for (key, value) in vars {
            text = text.replace(&format!("{{{}}}", key), value);
        }
        text
    }
}

/// Ordered mapping from template name to template.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: IndexMap<String, PromptTemplate>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let mut registry = Self {
            templates: IndexMap::new(),
        };
        registry.insert(PromptTemplate::new(
            VISION_DESCRIPTION,
            1,
            templates::VISION_DESCRIPTION_ROLE,
            templates::VISION_DESCRIPTION_INSTRUCTIONS,
        ));
        registry.insert(
            PromptTemplate::new(
                FACT_CORRECTION,
                1,
                templates::FACT_CORRECTION_ROLE,
                templates::FACT_CORRECTION_INSTRUCTIONS,
            )
            .with_fields("VLM Output", "Corrected Report"),
        );
        registry.insert(
            PromptTemplate::new(
                TRANSLATION,
                1,
                templates::TRANSLATION_ROLE,
                templates::TRANSLATION_INSTRUCTIONS,
            )
            .with_fields("English Text", "Translated Text"),
        );
        registry.insert(
            PromptTemplate::new(
                MARKDOWN_FORMAT,
                1,
                templates::MARKDOWN_FORMAT_ROLE,
                templates::MARKDOWN_FORMAT_INSTRUCTIONS,
            )
            .with_fields("Report", "Markdown"),
        );
        registry
    }
}

impl TemplateRegistry {
    pub fn insert(&mut self, template: PromptTemplate) -> Option<PromptTemplate> {
        self.templates.insert(template.name.clone(), template)
    }

    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&PromptTemplate, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::Invalid(format!("No prompt template named '{}'", name)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Replaces instructions with `<dir>/<name>.txt` where such a file exists.
    /// Each replaced template gets its version bumped.
    pub fn with_overrides_from(mut self, dir: &Path) -> Result<Self, ConfigError> {
        for template in self.templates.values_mut() {
            let path = dir.join(format!("{}.txt", template.name));
            if !path.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Template {
                path: path.clone(),
                source,
            })?;
            let text = text.trim();
            if text.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Template override {} is empty",
                    path.display()
                )));
            }
            template.instructions = text.to_string();
            template.version += 1;
            info!(template = %template.name, version = template.version, "Loaded template override");
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_one_template_per_model_call() {
        let registry = TemplateRegistry::default();
        let names: Vec<&str> = registry.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![VISION_DESCRIPTION, FACT_CORRECTION, TRANSLATION, MARKDOWN_FORMAT]
        );
        assert!(registry.iter().all(|t| t.version == 1));
    }

    #[test]
    fn vision_prompt_names_all_seven_sections() {
        let template = TemplateRegistry::default()
            .require(VISION_DESCRIPTION)
            .unwrap()
            .render(&[("label", "river")]);
        for section in [
            "Safety Overview",
            "Key Features",
            "Physical Appearance",
            "Broad Classification",
            "Environmental Impact",
            "Economic Considerations",
            "Recommendations",
        ] {
            assert!(template.contains(section), "missing {section}");
        }
        assert!(template.contains("water source as: river."));
        assert!(!template.contains("{label}"));
    }

    #[test]
    fn render_substitutes_language() {
        let registry = TemplateRegistry::default();
        let rendered = registry
            .require(TRANSLATION)
            .unwrap()
            .render(&[("language", "French")]);
        assert!(rendered.contains("accurate French."));
    }

    #[test]
    fn unknown_template_is_a_config_error() {
        assert!(TemplateRegistry::default().require("summary").is_err());
    }

    #[test]
    fn override_file_replaces_instructions_and_bumps_version() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("markdown_format.txt"),
            "Use level-two headings only.\n",
        )
        .unwrap();

        let registry = TemplateRegistry::default()
            .with_overrides_from(dir.path())
            .unwrap();
        let template = registry.require(MARKDOWN_FORMAT).unwrap();
        assert_eq!(template.instructions, "Use level-two headings only.");
        assert_eq!(template.version, 2);
        assert_eq!(registry.require(FACT_CORRECTION).unwrap().version, 1);
    }

    #[test]
    fn empty_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("translation.txt"), "   ").unwrap();
        assert!(TemplateRegistry::default()
            .with_overrides_from(dir.path())
            .is_err());
    }
}
