//! LLM-backed synthetic email generator.

use std::sync::Arc;

use async_trait::async_trait;

use super::{RawRecord, RecordGenerator};
use crate::error::GenerationError;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::{render_generation_prompt, PromptSet};
use crate::tasks::TaskDescriptor;
use crate::utils::json_extraction::extract_json_object;

/// Default token ceiling for a generated email.
const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Generates synthetic emails through an [`LlmProvider`].
pub struct LlmRecordGenerator {
    client: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
    system_prompt: String,
    experimental_system_prompt: String,
}

impl LlmRecordGenerator {
    /// Creates a generator using the prompts from `prompts`.
    pub fn new(
        client: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        temperature: f64,
        prompts: &PromptSet,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
            system_prompt: prompts.generation_system.clone(),
            experimental_system_prompt: prompts.experimental_generation_system.clone(),
        }
    }

    fn build_request(&self, task: &TaskDescriptor) -> GenerationRequest {
        let system = if task.variant().is_some() {
            &self.experimental_system_prompt
        } else {
            &self.system_prompt
        };

        GenerationRequest::new(
            self.model.clone(),
            vec![
                Message::system(system.clone()),
                Message::user(render_generation_prompt(task)),
            ],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(DEFAULT_MAX_TOKENS)
    }
}

/// Parses the service output into a [`RawRecord`].
///
/// Code fences are stripped; anything that is not a single JSON object with
/// at least `subject` and `content` is rejected.
pub(crate) fn parse_raw_record(task_id: u64, content: &str) -> Result<RawRecord, GenerationError> {
    let json = extract_json_object(content)
        .into_result_with_context(content)
        .map_err(|e| GenerationError::MalformedOutput {
            task_id,
            cause: e.to_string(),
        })?;

    serde_json::from_str(&json).map_err(|e| GenerationError::MalformedOutput {
        task_id,
        cause: e.to_string(),
    })
}

#[async_trait]
impl RecordGenerator for LlmRecordGenerator {
    async fn generate(&self, task: &TaskDescriptor) -> Result<RawRecord, GenerationError> {
        let request = self.build_request(task);

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| GenerationError::from_llm(task.id(), e))?;

        let content = response
            .require_content()
            .map_err(|e| GenerationError::from_llm(task.id(), e))?;

        parse_raw_record(task.id(), content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{Choice, GenerationResponse, Usage};
    use std::sync::Mutex;

    /// Mock LLM provider returning a fixed reply and recording requests.
    struct MockLlmProvider {
        reply: Result<String, u16>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl MockLlmProvider {
        fn replying(content: &str) -> Self {
            Self {
                reply: Ok(content.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            self.requests.lock().expect("lock poisoned").push(request);
            match &self.reply {
                Ok(content) => Ok(GenerationResponse {
                    id: "test".to_string(),
                    model: "test-model".to_string(),
                    choices: vec![Choice {
                        index: 0,
                        message: Message::assistant(content.clone()),
                        finish_reason: "stop".to_string(),
                    }],
                    usage: Usage::default(),
                }),
                Err(code) => Err(LlmError::ApiError {
                    code: *code,
                    message: "upstream unavailable".to_string(),
                }),
            }
        }
    }

    fn generator(provider: Arc<MockLlmProvider>) -> LlmRecordGenerator {
        LlmRecordGenerator::new(provider, "gpt-4.1", 0.8, &PromptSet::default())
    }

    #[tokio::test]
    async fn test_generate_parses_fenced_json() {
        let provider = Arc::new(MockLlmProvider::replying(
            "```json\n{\"id\": 3, \"subject\": \"Delay\", \"content\": \"The launch slips a week.\"}\n```",
        ));
        let task = TaskDescriptor::new(3, "a project deadline delay", "Professional", "Short");

        let raw = generator(provider.clone())
            .generate(&task)
            .await
            .expect("fenced JSON should parse");

        assert_eq!(raw.subject, "Delay");
        assert_eq!(raw.id, Some(3));

        let requests = provider.requests.lock().expect("lock poisoned");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.8));
        assert_eq!(requests[0].messages[0].content, PromptSet::default().generation_system);
    }

    #[tokio::test]
    async fn test_generate_rejects_prose() {
        let provider = Arc::new(MockLlmProvider::replying("Sorry, I can't write that email."));
        let task = TaskDescriptor::new(8, "interview follow-up", "Friendly", "Long");

        let err = generator(provider).generate(&task).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::MalformedOutput { task_id: 8, .. }
        ));
    }

    #[tokio::test]
    async fn test_generate_maps_transport_failure() {
        let provider = Arc::new(MockLlmProvider::failing(503));
        let task = TaskDescriptor::new(1, "interview follow-up", "Friendly", "Long");

        let err = generator(provider).generate(&task).await.unwrap_err();
        match err {
            GenerationError::Transport { task_id, cause } => {
                assert_eq!(task_id, 1);
                assert!(cause.contains("503"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_raw_record_missing_content() {
        let err = parse_raw_record(6, "{\"subject\": \"only a subject\"}").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput { task_id: 6, .. }));
    }
}
