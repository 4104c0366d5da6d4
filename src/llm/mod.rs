//! LLM integration for mail-forge.
//!
//! Both external collaborators (the generation service and the judging
//! service) are reached through the [`LlmProvider`] trait, so tests can swap
//! in deterministic doubles.
//!
//! ```ignore
//! use mail_forge::llm::{GenerationRequest, LiteLlmClient, LlmProvider, Message};
//!
//! let client = LiteLlmClient::new(
//!     "http://localhost:4000".to_string(),
//!     None,
//!     "gpt-4.1".to_string(),
//! );
//! let request = GenerationRequest::new("", vec![Message::user("Hello")]);
//! let response = client.generate(request).await?;
//! ```

pub mod litellm;

pub use litellm::{
    Choice, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider, Message, Usage,
};
