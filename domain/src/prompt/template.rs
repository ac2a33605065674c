//! Prompt templates for field extraction

use crate::schema::OutputContract;

/// Templates for generating extraction prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt shared by every provider
    pub fn extraction_system() -> &'static str {
        r#"You are a meticulous research assistant extracting structured data from clinical trial publications.
Extract only what the document states. Never guess or infer values that are not written in the text.
For every value you report, quote the exact supporting text and give the page it appears on.
If a field cannot be determined from the document, return an empty value with "low" confidence and explain why in notes."#
    }

    /// User prompt listing the requested fields and the document text
    pub fn extraction_prompt(contract: &OutputContract, document: &str) -> String {
        let mut prompt = String::from("Extract the following fields from the document:\n\n");

        for field in contract.schema().fields() {
            prompt.push_str(&format!(
                "- {} ({}, {})",
                field.name, field.label, field.value_kind
            ));
            if !field.description.is_empty() {
                prompt.push_str(&format!(": {}", field.description));
            }
            prompt.push('\n');
        }

        prompt.push_str(
            r#"
For EVERY field return an object with:
- "value": the extracted value, or null if not found
- "confidence": "high", "medium" or "low"
- "source_location": {"page", "section", "specific_location", "exact_text_reference"}
- "notes": optional remarks, or null

Return one JSON object keyed by field name, containing every field listed above and nothing else.

--- DOCUMENT ---
"#,
        );
        prompt.push_str(document);
        prompt.push_str("\n--- END DOCUMENT ---\n");
        prompt
    }

    /// Prompt variant embedding the JSON Schema, for providers without a
    /// native structured-output constraint
    pub fn extraction_prompt_with_schema(contract: &OutputContract, document: &str) -> String {
        let schema = serde_json::to_string_pretty(contract.json_schema()).unwrap_or_default();
        format!(
            "{}\nYour answer must be a single JSON object matching this JSON Schema:\n\n{}\n\nRespond with JSON only.",
            Self::extraction_prompt(contract, document),
            schema
        )
    }
}
