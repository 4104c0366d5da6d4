//! Prompt text for the generation, rewrite and judge collaborators.
//!
//! All prompt text lives in a [`PromptSet`] that is built once (defaults,
//! optionally overridden from the config file) and injected into the
//! adapters at construction time. Templates use `{placeholder}` markers that
//! are filled with plain string replacement.

mod generation;
mod judge;
mod rewrite;

use serde::{Deserialize, Serialize};

pub use generation::{
    render_generation_prompt, EXPERIMENTAL_GENERATION_SYSTEM_PROMPT, GENERATION_SYSTEM_PROMPT,
};
pub use judge::{
    render_judge_prompt, JudgeRubric, COMPLETENESS_RUBRIC, FAITHFULNESS_RUBRIC, ROBUSTNESS_RUBRIC,
};
pub use rewrite::{
    render_rewrite_prompt, RewritePrompts, LENGTHEN_TEMPLATE, REWRITE_SYSTEM_PROMPT,
    SHORTEN_TEMPLATE, TONE_TEMPLATE,
};

/// Every prompt the crate sends, grouped by collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    /// System prompt for plain batch generation.
    pub generation_system: String,
    /// System prompt for generation with structure/ambiguity/noise variants.
    pub experimental_generation_system: String,
    /// Rewrite prompts used to produce evaluation candidates.
    pub rewrite: RewritePrompts,
    /// Faithfulness rubric.
    pub faithfulness: JudgeRubric,
    /// Completeness rubric.
    pub completeness: JudgeRubric,
    /// Robustness rubric.
    pub robustness: JudgeRubric,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            generation_system: GENERATION_SYSTEM_PROMPT.to_string(),
            experimental_generation_system: EXPERIMENTAL_GENERATION_SYSTEM_PROMPT.to_string(),
            rewrite: RewritePrompts::default(),
            faithfulness: JudgeRubric::from_static(FAITHFULNESS_RUBRIC),
            completeness: JudgeRubric::from_static(COMPLETENESS_RUBRIC),
            robustness: JudgeRubric::from_static(ROBUSTNESS_RUBRIC),
        }
    }
}
