mod fact_correction;
mod markdown_format;
mod translation;

pub use fact_correction::FactCorrectionStage;
pub use markdown_format::MarkdownFormatStage;
pub use translation::TranslationStage;

use crate::error::ServiceError;
use crate::prompts::PromptTemplate;
use crate::service::{CompletionRequest, LanguageModel};

// One templated completion; the reasoning half of the answer is dropped here.
async fn prompted_call(
    model: &dyn LanguageModel,
    template: &PromptTemplate,
    text: &str,
    vars: &[(&str, &str)],
) -> Result<String, ServiceError> {
    let role = template.render(vars);
    let completion = model
        .complete(CompletionRequest {
            role: &role,
            input_field: &template.input_field,
            input: text,
            output_field: &template.output_field,
        })
        .await?;

    if let Some(reasoning) = &completion.reasoning {
        tracing::trace!(template = %template.name, chars = reasoning.len(), "Discarding reasoning");
    }
    Ok(completion.output)
}
