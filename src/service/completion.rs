use crate::error::ServiceError;

/// One prompt-driven text transform request.
///
/// `role` becomes the system message; `input` is the only dynamic content.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub role: &'a str,
    pub input_field: &'a str,
    pub input: &'a str,
    pub output_field: &'a str,
}

impl<'a> CompletionRequest<'a> {
    /// Renders the user message, asking for reasoning before the result.
    pub fn user_message(&self) -> String {
        format!(
            "{input_field}: {input}\n\n\
             Respond in exactly this format:\n\
             Reasoning: <think step by step about how to produce the {output_field}>\n\
             {output_field}: <the {output_field} only>",
            input_field = self.input_field,
            input = self.input,
            output_field = self.output_field,
        )
    }
}

/// A parsed text completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub output: String,
    /// Intermediate reasoning, dropped by every caller
    pub reasoning: Option<String>,
}

impl Completion {
    /// Splits a raw completion at the last `<output_field>:` marker.
    ///
    /// Without a marker the whole completion is the output, unless it opens
    /// with a `Reasoning:` block, which is a malformed answer.
    pub fn parse(raw: &str, output_field: &str, model: &str) -> Result<Self, ServiceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ServiceError::EmptyCompletion(model.to_string()));
        }

        let (reasoning, output) = match find_marker(raw, output_field) {
            Some((start, end)) => {
                let head = raw[..start].trim().trim_start_matches('*');
                let reasoning = strip_prefix_ignore_case(head, "Reasoning:")
                    .trim_start_matches('*')
                    .trim()
                    .to_string();
                (
                    Some(reasoning).filter(|r| !r.is_empty()),
                    raw[end..].trim().to_string(),
                )
            }
            None if starts_with_reasoning(raw) => {
                return Err(ServiceError::MalformedCompletion(format!(
                    "'{}' marker missing after reasoning from {}",
                    output_field, model
                )));
            }
            None => (None, raw.to_string()),
        };

        if output.is_empty() {
            return Err(ServiceError::EmptyCompletion(model.to_string()));
        }

        Ok(Self { output, reasoning })
    }
}

fn starts_with_reasoning(raw: &str) -> bool {
    let head = raw.trim_start_matches(['*', '#', ' ']);
    strip_prefix_ignore_case(head, "Reasoning:").len() != head.len()
}

// Byte range of the last line-leading `<field>:` marker
fn find_marker(raw: &str, field: &str) -> Option<(usize, usize)> {
    let marker = format!("{}:", field.to_lowercase());
    let mut offset = 0;
    let mut found = None;
    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let candidate = trimmed.trim_start_matches(['*', '#', ' ']);
        let decoration = trimmed.len() - candidate.len();
        if candidate.len() >= marker.len()
            && candidate.is_char_boundary(marker.len())
            && candidate[..marker.len()].to_lowercase() == marker
        {
            let start = offset;
            let mut end = offset + indent + decoration + marker.len();
            // `**Field:**` style markers
            end += raw[end..].len() - raw[end..].trim_start_matches('*').len();
            found = Some((start, end));
        }
        offset += line.len();
    }
    found
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> &'a str {
    if text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        &text[prefix.len()..]
    } else {
        text
    }
}
