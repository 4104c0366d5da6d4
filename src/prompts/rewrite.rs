//! Rewrite prompts that produce evaluation candidates from dataset records.

use serde::{Deserialize, Serialize};

pub const REWRITE_SYSTEM_PROMPT: &str = "You are a professional writing assistant.
Rules:
- Output ONLY the rewritten paragraph content.
- Do NOT include subject lines, greetings, or signatures.
- Do NOT provide explanations.
- Return plain text only.";

pub const SHORTEN_TEMPLATE: &str = "Shorten the following text while keeping every key fact, \
request and deadline. Aim for roughly half the length.

Text:
{selected_text}";

pub const LENGTHEN_TEMPLATE: &str = "Expand the following text with helpful context and detail. \
Do not invent facts, names, dates or commitments that are not implied by the original.

Text:
{selected_text}";

pub const TONE_TEMPLATE: &str = "Rewrite the following text in a {tone_type} tone. \
Keep the meaning, facts and requests unchanged.

Text:
{selected_text}";

/// Rewrite templates keyed by action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewritePrompts {
    pub system: String,
    pub shorten: String,
    pub lengthen: String,
    pub tone: String,
}

impl Default for RewritePrompts {
    fn default() -> Self {
        Self {
            system: REWRITE_SYSTEM_PROMPT.to_string(),
            shorten: SHORTEN_TEMPLATE.to_string(),
            lengthen: LENGTHEN_TEMPLATE.to_string(),
            tone: TONE_TEMPLATE.to_string(),
        }
    }
}

/// Fills `{selected_text}` and `{tone_type}` in a rewrite template.
pub fn render_rewrite_prompt(template: &str, selected_text: &str, tone_type: &str) -> String {
    template
        .replace("{tone_type}", tone_type)
        .replace("{selected_text}", selected_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rewrite_prompt_fills_placeholders() {
        let prompt = render_rewrite_prompt(TONE_TEMPLATE, "We missed the deadline.", "Friendly");
        assert!(prompt.contains("in a Friendly tone"));
        assert!(prompt.ends_with("We missed the deadline."));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_selected_text_braces_survive() {
        // Placeholder-looking text inside the record must not be expanded.
        let prompt = render_rewrite_prompt(SHORTEN_TEMPLATE, "use {tone_type} here", "Formal");
        assert!(prompt.ends_with("use {tone_type} here"));
    }
}
