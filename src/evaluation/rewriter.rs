//! Rewrite step that turns a dataset record into an evaluation candidate.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::{render_rewrite_prompt, RewritePrompts};

/// Tone used when a tone rewrite is requested without one.
pub const DEFAULT_TONE: &str = "Professional";

const REWRITE_MAX_TOKENS: u32 = 1000;

/// Lines shorter than this many words are candidates for header/sign-off removal.
const SHORT_LINE_WORDS: usize = 4;

const BOILERPLATE_PREFIXES: [&str; 5] = ["subject:", "dear", "regards:", "sincerely,", "best,"];

/// Rewrite applied to the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteAction {
    Shorten,
    Lengthen,
    Tone { tone: String },
}

impl RewriteAction {
    pub fn tone(tone: impl Into<String>) -> Self {
        RewriteAction::Tone { tone: tone.into() }
    }

    /// Upper-case tag used to label datasets in reports.
    pub fn tag(&self) -> &'static str {
        match self {
            RewriteAction::Shorten => "SHORTEN",
            RewriteAction::Lengthen => "LENGTHEN",
            RewriteAction::Tone { .. } => "TONE",
        }
    }
}

impl fmt::Display for RewriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteAction::Shorten => f.write_str("shorten"),
            RewriteAction::Lengthen => f.write_str("lengthen"),
            RewriteAction::Tone { tone } => write!(f, "tone:{}", tone),
        }
    }
}

impl FromStr for RewriteAction {
    type Err = String;

    /// Parses `shorten`, `lengthen`, `tone` or `tone:<type>` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (action, tone) = match s.split_once(':') {
            Some((action, tone)) => (action, Some(tone.trim())),
            None => (s, None),
        };

        match action.to_lowercase().as_str() {
            "shorten" => Ok(RewriteAction::Shorten),
            "lengthen" => Ok(RewriteAction::Lengthen),
            "tone" => Ok(RewriteAction::tone(
                tone.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TONE),
            )),
            other => Err(format!(
                "unknown rewrite action '{}' (expected shorten, lengthen or tone)",
                other
            )),
        }
    }
}

/// Produces a rewritten candidate for one source text.
#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, action: &RewriteAction, original: &str) -> Result<String, LlmError>;
}

/// Rewriter backed by an [`LlmProvider`].
pub struct LlmRewriter {
    client: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
    prompts: RewritePrompts,
}

impl LlmRewriter {
    pub fn new(
        client: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        temperature: f64,
        prompts: &RewritePrompts,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
            prompts: prompts.clone(),
        }
    }

    fn user_prompt(&self, action: &RewriteAction, original: &str) -> String {
        match action {
            RewriteAction::Shorten => render_rewrite_prompt(&self.prompts.shorten, original, ""),
            RewriteAction::Lengthen => render_rewrite_prompt(&self.prompts.lengthen, original, ""),
            RewriteAction::Tone { tone } => render_rewrite_prompt(&self.prompts.tone, original, tone),
        }
    }
}

#[async_trait]
impl Rewriter for LlmRewriter {
    async fn rewrite(&self, action: &RewriteAction, original: &str) -> Result<String, LlmError> {
        let request = GenerationRequest::new(
            self.model.clone(),
            vec![
                Message::system(self.prompts.system.clone()),
                Message::user(self.user_prompt(action, original)),
            ],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(REWRITE_MAX_TOKENS);

        let response = self.client.generate(request).await?;
        let content = response.require_content()?;
        Ok(clean_body(content))
    }
}

/// Drops stray subject/greeting/sign-off lines from rewrite output.
///
/// Only short lines (fewer than four words) are considered. If nothing
/// survives, the trimmed input is returned unchanged.
pub fn clean_body(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !is_boilerplate(line))
        .collect();

    let cleaned = kept.join("\n").trim().to_string();
    if cleaned.is_empty() {
        text.trim().to_string()
    } else {
        cleaned
    }
}

fn is_boilerplate(line: &str) -> bool {
    let lowered = line.trim().to_lowercase();
    lowered.split_whitespace().count() < SHORT_LINE_WORDS
        && BOILERPLATE_PREFIXES
            .iter()
            .any(|prefix| lowered.starts_with(prefix))
}
