//! Prompts for synthetic email generation.

use crate::tasks::TaskDescriptor;

/// System prompt for plain batch generation.
pub const GENERATION_SYSTEM_PROMPT: &str = "You are a professional assistant generating synthetic email data.
Rules:
- Output ONLY valid JSON
- No markdown, no explanations
- JSON keys: id, subject, content
- No greetings or signatures";

/// System prompt when structure/ambiguity/noise variants are requested.
pub const EXPERIMENTAL_GENERATION_SYSTEM_PROMPT: &str = "You are generating synthetic emails for AI evaluation experiments.
Rules:
- Output ONLY valid JSON
- No markdown or explanations
- No greetings or signatures
- Include at least one URL and one image reference
- Define selected_excerpt copied verbatim from content";

/// Renders the user prompt for `task`.
///
/// The expected JSON shape is spelled out inline, including the task id, so
/// the echoed id can be checked against the descriptor.
pub fn render_generation_prompt(task: &TaskDescriptor) -> String {
    let mut prompt = format!(
        "Write a {tone} email about {topic}.\nLength: {length}.\n",
        tone = task.tone().to_lowercase(),
        topic = task.topic(),
        length = task.length(),
    );

    match task.variant() {
        None => {
            prompt.push_str(&format!(
                r#"
Return ONLY JSON:
{{
  "id": {id},
  "subject": "...",
  "content": "..."
}}"#,
                id = task.id()
            ));
        }
        Some(variant) => {
            prompt.push_str(&format!(
                r#"
Structural format: {structure}
Ambiguity level: {ambiguity}
Noise level: {noise}

Return ONLY JSON:
{{
  "id": {id},
  "subject": "...",
  "content": "...",
  "selected_excerpt": "...",
  "technical_assets": ["https://portal.company.com/ticket/123", "<img src='https://cdn.company.com/image.png'>"],
  "structure_type": "{structure}",
  "ambiguity_level": "{ambiguity}",
  "noise_level": "{noise}"
}}"#,
                id = task.id(),
                structure = variant.structure_type,
                ambiguity = variant.ambiguity_level,
                noise = variant.noise_level,
            ));
        }
    }

    prompt
}
