//! Prompt text for the two model passes.

/// Raw-text pass: transcribe everything, nothing else.
pub const RAW_TEXT_PROMPT: &str = "Extract all text from this image. \
Return only the extracted text, preserving reading order and line breaks. \
Do not add commentary, headings or formatting.";

const STRUCTURED_INSTRUCTIONS: &str = "Identify the structured information in this document \
and return it as a single JSON object. Look for:\n\
- names and titles of people\n\
- dates\n\
- addresses\n\
- phone numbers and email addresses\n\
- organization or company names\n\
- identifiers such as invoice, account, order or reference numbers\n\
Use short camelCase keys (for example \"invoiceId\" or \"date\"). \
Omit fields that are not present. Respond with strict JSON only, no prose and no code fences.";

/// Structured pass over an attached image.
#[must_use]
pub fn structured_image_prompt() -> String {
    STRUCTURED_INSTRUCTIONS.to_string()
}

/// Structured pass over text already extracted from a document.
#[must_use]
pub fn structured_text_prompt(text: &str) -> String {
    format!("{STRUCTURED_INSTRUCTIONS}\n\nDocument text:\n\"\"\"\n{text}\n\"\"\"")
}
