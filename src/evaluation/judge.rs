//! Judge collaborator: one scoring request per (criterion, original, generated).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::score::{extract_score, JUDGE_FAILURE_PREFIX};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::{render_judge_prompt, JudgeRubric, PromptSet};

/// Token ceiling for a judge response.
const JUDGE_MAX_TOKENS: u32 = 500;

/// Independent axis a generated text is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Faithfulness,
    Completeness,
    Robustness,
}

impl Criterion {
    /// All criteria, in the order they are judged and reported.
    pub const ALL: [Criterion; 3] = [
        Criterion::Faithfulness,
        Criterion::Completeness,
        Criterion::Robustness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Faithfulness => "faithfulness",
            Criterion::Completeness => "completeness",
            Criterion::Robustness => "robustness",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Faithfulness => "Faithfulness",
            Criterion::Completeness => "Completeness",
            Criterion::Robustness => "Robustness",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one judge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Free-form judge text, expected to carry a `Score: n / 5` line.
    Text(String),
    /// The call failed; holds the cause.
    Failed(String),
}

impl Verdict {
    /// Score carried by this verdict, if any. Failed verdicts never score.
    pub fn score(&self) -> Option<u8> {
        match self {
            Verdict::Text(text) => extract_score(text),
            Verdict::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Verdict::Failed(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Text(text) => f.write_str(text),
            Verdict::Failed(cause) => write!(f, "{} {}", JUDGE_FAILURE_PREFIX, cause),
        }
    }
}

/// Scores a generated text against its original on one criterion.
///
/// Implementations never fail: transport problems come back as
/// [`Verdict::Failed`].
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(&self, criterion: Criterion, original: &str, generated: &str) -> Verdict;
}

/// Judge backed by an [`LlmProvider`], decoding deterministically.
pub struct LlmJudge {
    client: Arc<dyn LlmProvider>,
    model: String,
    faithfulness: JudgeRubric,
    completeness: JudgeRubric,
    robustness: JudgeRubric,
}

impl LlmJudge {
    pub fn new(client: Arc<dyn LlmProvider>, model: impl Into<String>, prompts: &PromptSet) -> Self {
        Self {
            client,
            model: model.into(),
            faithfulness: prompts.faithfulness.clone(),
            completeness: prompts.completeness.clone(),
            robustness: prompts.robustness.clone(),
        }
    }

    fn rubric(&self, criterion: Criterion) -> &JudgeRubric {
        match criterion {
            Criterion::Faithfulness => &self.faithfulness,
            Criterion::Completeness => &self.completeness,
            Criterion::Robustness => &self.robustness,
        }
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn judge(&self, criterion: Criterion, original: &str, generated: &str) -> Verdict {
        let rubric = self.rubric(criterion);
        let request = GenerationRequest::new(
            self.model.clone(),
            vec![
                Message::system(rubric.system.clone()),
                Message::user(render_judge_prompt(rubric, original, generated)),
            ],
        )
        .with_temperature(0.0)
        .with_max_tokens(JUDGE_MAX_TOKENS);

        let response = match self.client.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(criterion = %criterion, error = %e, "Judge call failed");
                return Verdict::Failed(e.to_string());
            }
        };

        match response.require_content() {
            Ok(content) => Verdict::Text(content.to_string()),
            Err(e) => Verdict::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{Choice, GenerationResponse, Usage};
    use std::sync::Mutex;

    struct MockLlmProvider {
        reply: Option<String>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            self.requests.lock().expect("lock poisoned").push(request);
            match &self.reply {
                Some(content) => Ok(GenerationResponse {
                    id: "judge".to_string(),
                    model: "gpt-4o-mini".to_string(),
                    choices: vec![Choice {
                        index: 0,
                        message: Message::assistant(content.clone()),
                        finish_reason: "stop".to_string(),
                    }],
                    usage: Usage::default(),
                }),
                None => Err(LlmError::RequestFailed("connection refused".to_string())),
            }
        }
    }

    fn judge(reply: Option<&str>) -> (LlmJudge, Arc<MockLlmProvider>) {
        let provider = Arc::new(MockLlmProvider {
            reply: reply.map(str::to_string),
            requests: Mutex::new(Vec::new()),
        });
        let judge = LlmJudge::new(provider.clone(), "gpt-4o-mini", &PromptSet::default());
        (judge, provider)
    }

    #[test]
    fn test_criterion_order_and_names() {
        let names: Vec<&str> = Criterion::ALL.iter().map(Criterion::name).collect();
        assert_eq!(names, vec!["faithfulness", "completeness", "robustness"]);
        assert_eq!(Criterion::Robustness.label(), "Robustness");
    }

    #[test]
    fn test_failed_verdict_rendering() {
        let verdict = Verdict::Failed("timeout".to_string());
        assert_eq!(verdict.to_string(), "Error: timeout");
        assert_eq!(verdict.score(), None);
        assert!(verdict.is_failed());
    }

    #[tokio::test]
    async fn test_llm_judge_uses_rubric_and_zero_temperature() {
        let (judge, provider) = judge(Some("Score: 4 / 5\nVerdict: Good\n- ok"));
        let verdict = judge
            .judge(Criterion::Completeness, "original text", "generated text")
            .await;

        assert_eq!(verdict.score(), Some(4));

        let requests = provider.requests.lock().expect("lock poisoned");
        assert_eq!(requests[0].temperature, Some(0.0));
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[0].messages[0].content, PromptSet::default().completeness.system);
        assert!(requests[0].messages[1].content.contains("ORIGINAL TEXT:\noriginal text"));
    }

    #[tokio::test]
    async fn test_llm_judge_transport_failure_is_failed_verdict() {
        let (judge, _) = judge(None);
        let verdict = judge.judge(Criterion::Faithfulness, "a", "b").await;

        assert!(verdict.is_failed());
        assert!(verdict.to_string().starts_with("Error: "));
        assert!(verdict.to_string().contains("connection refused"));
    }
}
