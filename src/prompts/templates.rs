//! Built-in prompt text, one constant per template.

pub const VISION_DESCRIPTION_ROLE: &str = "You are a professional environmental analyst.";

pub const VISION_DESCRIPTION_INSTRUCTIONS: &str = "Analyze the given image of a water body and \
generate a concise, structured report addressing the following: \
1. Safety Overview: Evaluate whether the water poses immediate health or environmental risks \
based on visible features like clarity, color, and the presence of potential contaminants. \
Focus only on what can be seen. \
2. Key Features: Briefly identify significant visual aspects such as water clarity, sediment \
presence, organic material, or surface conditions. Avoid assumptions beyond the visible evidence. \
3. Physical Appearance: Describe the water's appearance (e.g., color, transparency, surface \
reflection), explaining how these may indicate the water's general quality without overreaching \
conclusions. \
4. Broad Classification: Provide a general classification (Clean, Polluted, Requires Further \
Testing) based solely on visible evidence. Clearly justify the classification without excess \
speculation. \
5. Environmental Impact: Discuss how the water's condition may affect surrounding ecosystems or \
human activity, staying within the scope of the visible evidence and avoiding premature \
conclusions. \
6. Economic Considerations: Mention any potential economic impacts (e.g., treatment needs, \
impact on local industries), emphasizing that further testing is required to confirm these \
impacts. \
7. Recommendations: Offer limited, relevant recommendations based on visible conditions, without \
over-prescribing actions. Highlight the need for further investigation if necessary. \
Ensure the report remains objective and based strictly on what can be observed in the image. \
The user reports the water source as: {label}.";

pub const FACT_CORRECTION_ROLE: &str = "Analyze and correct the output from a vision language \
model describing a water body: image classification, environmental impact, water quality report.";

pub const FACT_CORRECTION_INSTRUCTIONS: &str = "Produce a professional, fact-checked report. \
Remove duplicated sentences. Remove dates, locations, place names and any other real-world \
identifiers. Keep every substantive observation about the visible water features. Do not add \
claims that are not in the input. The result must read naturally and keep the actionable \
recommendations.";

pub const TRANSLATION_ROLE: &str = "Translate the provided English text into professional and \
accurate {language}.";

pub const TRANSLATION_INSTRUCTIONS: &str = "Maintain the original meaning, tone and \
professionalism. Keep the same sections in the same order, and keep the length close to the \
input's.";

pub const MARKDOWN_FORMAT_ROLE: &str = "Convert the report text to professional Markdown format.";

pub const MARKDOWN_FORMAT_INSTRUCTIONS: &str = "Produce a well-structured Markdown report with \
clear headings and bullet points. Give each thematic section of the input its own top-level \
heading, in this order when present: Safety Overview, Key Features, Physical Appearance, \
Classification, Environmental Impact, Economic Considerations, Recommendations. Do not add, \
remove or change any factual statement; only change structure and markup. Do not wrap the \
output in a code fence.";
