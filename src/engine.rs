// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Port to the generative AI engine

use async_trait::async_trait;

use crate::Result;

/// The two capabilities consumed from the AI engine, as raw response text.
///
/// Implemented by [`crate::ollama::OllamaClient`]; the web layer holds a
/// `dyn Engine` so tests can substitute a stub. Both calls surface any
/// transport or protocol failure as a single error, with no partial
/// results and no retries.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Run the vision model over a base64-encoded image.
    async fn recognize(&self, prompt: &str, image_base64: &str) -> Result<String>;

    /// Run the text model over a forecast prompt.
    async fn forecast(&self, prompt: &str) -> Result<String>;
}

/// Extract the JSON array from a model response.
///
/// Models routinely wrap structured output in code fences or prose; slicing
/// from the first '[' to the last ']' recovers the payload. Returns the
/// input unchanged when no array brackets are present, leaving the parse
/// error to the caller.
pub fn extract_json_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_array() {
        assert_eq!(extract_json_array(r#"[{"name":"Milk"}]"#), r#"[{"name":"Milk"}]"#);
    }

    #[test]
    fn test_extract_fenced_array() {
        let text = "```json\n[{\"name\":\"Milk\",\"quantity\":2}]\n```";
        assert_eq!(extract_json_array(text), "[{\"name\":\"Milk\",\"quantity\":2}]");
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let text = "Here are the items I found: [1, 2] — hope that helps!";
        assert_eq!(extract_json_array(text), "[1, 2]");
    }

    #[test]
    fn test_extract_no_array_passes_through() {
        assert_eq!(extract_json_array("no json here"), "no json here");
    }
}
