//! Result records and per-task outcomes.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::tasks::TaskDescriptor;

/// Structured payload as returned by the generation service.
///
/// Only `subject` and `content` are required; everything else is optional
/// and the echoed id/parameters are advisory (the descriptor is authoritative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub selected_excerpt: Option<String>,
    #[serde(default)]
    pub technical_assets: Option<Vec<String>>,
}

/// One persisted record per task descriptor.
///
/// `error` is present exactly when the record is a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: u64,
    pub subject: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_assets: Option<Vec<String>>,
    pub topic: String,
    pub tone: String,
    pub length: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRecord {
    /// Builds a success record from a generated payload.
    ///
    /// Id and categorical parameters always come from `task`, never from the
    /// service's echo.
    pub fn from_raw(task: &TaskDescriptor, raw: RawRecord) -> Self {
        if let Some(echoed) = raw.id.filter(|&echoed| echoed != task.id()) {
            tracing::debug!(task_id = task.id(), echoed, "Generated record echoed a different id");
        }

        let mut record = Self::skeleton(task, raw.subject, raw.content);
        record.selected_excerpt = raw.selected_excerpt;
        record.technical_assets = raw.technical_assets;
        record
    }

    /// Synthesizes the deterministic stand-in for a failed task.
    ///
    /// Every field is derived from `task` alone, plus the failure cause.
    pub fn fallback(task: &TaskDescriptor, cause: impl Into<String>) -> Self {
        let content = format!("This is a fallback synthetic email about {}.", task.topic());

        let mut record = Self::skeleton(
            task,
            format!("Fallback subject for {}", task.topic()),
            content.clone(),
        );
        if task.variant().is_some() {
            record.selected_excerpt = Some(content);
            record.technical_assets = Some(Vec::new());
        }
        record.error = Some(cause.into());
        record
    }

    /// True when this record stands in for a failed generation.
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    fn skeleton(task: &TaskDescriptor, subject: String, content: String) -> Self {
        let variant = task.variant();
        Self {
            id: task.id(),
            subject,
            content,
            selected_excerpt: None,
            technical_assets: None,
            topic: task.topic().to_string(),
            tone: task.tone().to_string(),
            length: task.length().to_string(),
            structure_type: variant.map(|v| v.structure_type.clone()),
            ambiguity_level: variant.map(|v| v.ambiguity_level.clone()),
            noise_level: variant.map(|v| v.noise_level.clone()),
            error: None,
        }
    }
}

/// Result of executing one task descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service produced a well-formed record.
    Success(ResultRecord),
    /// The call failed; the record was synthesized from the descriptor.
    Fallback(ResultRecord),
}

impl Outcome {
    /// Folds a generation result into an outcome, synthesizing the fallback.
    pub fn from_result(task: &TaskDescriptor, result: Result<RawRecord, GenerationError>) -> Self {
        match result {
            Ok(raw) => Outcome::Success(ResultRecord::from_raw(task, raw)),
            Err(err) => Outcome::Fallback(ResultRecord::fallback(task, err.to_string())),
        }
    }

    pub fn record(&self) -> &ResultRecord {
        match self {
            Outcome::Success(record) | Outcome::Fallback(record) => record,
        }
    }

    pub fn into_record(self) -> ResultRecord {
        match self {
            Outcome::Success(record) | Outcome::Fallback(record) => record,
        }
    }

    pub fn id(&self) -> u64 {
        self.record().id
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskVariant;

    fn variant_task() -> TaskDescriptor {
        TaskDescriptor::new(4, "customer issue resolution", "Friendly", "Short").with_variant(
            TaskVariant {
                structure_type: "numbered".to_string(),
                ambiguity_level: "medium".to_string(),
                noise_level: "high".to_string(),
            },
        )
    }

    #[test]
    fn test_from_raw_uses_descriptor_id_and_parameters() {
        let task = TaskDescriptor::new(2, "a team meeting reminder", "Professional", "Long");
        let raw = RawRecord {
            id: Some(99),
            subject: "Reminder".to_string(),
            content: "Standup at 10.".to_string(),
            selected_excerpt: None,
            technical_assets: None,
        };

        let record = ResultRecord::from_raw(&task, raw);
        assert_eq!(record.id, 2);
        assert_eq!(record.topic, "a team meeting reminder");
        assert_eq!(record.subject, "Reminder");
        assert!(!record.is_fallback());
    }

    #[test]
    fn test_fallback_is_derived_from_descriptor() {
        let task = variant_task();
        let record = ResultRecord::fallback(&task, "connection refused");

        assert_eq!(record.id, 4);
        assert_eq!(
            record.subject,
            "Fallback subject for customer issue resolution"
        );
        assert_eq!(
            record.selected_excerpt.as_deref(),
            Some(record.content.as_str())
        );
        assert_eq!(record.technical_assets, Some(vec![]));
        assert_eq!(record.structure_type.as_deref(), Some("numbered"));
        assert_eq!(record.error.as_deref(), Some("connection refused"));
        assert!(record.is_fallback());
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let task = variant_task();
        assert_eq!(
            ResultRecord::fallback(&task, "x"),
            ResultRecord::fallback(&task, "x")
        );
    }

    #[test]
    fn test_plain_record_serialization_omits_absent_fields() {
        let task = TaskDescriptor::new(1, "interview follow-up", "Friendly", "Short");
        let record = ResultRecord::fallback(&task, "boom");
        let json = serde_json::to_string(&record).expect("serializable");

        assert!(json.starts_with("{\"id\":1,\"subject\":"));
        assert!(!json.contains("selected_excerpt"));
        assert!(!json.contains("structure_type"));
        assert!(json.contains("\"error\":\"boom\""));
    }

    #[test]
    fn test_raw_record_requires_subject_and_content() {
        let missing: Result<RawRecord, _> = serde_json::from_str(r#"{"id": 1, "subject": "x"}"#);
        assert!(missing.is_err());

        let minimal: RawRecord =
            serde_json::from_str(r#"{"subject": "x", "content": "y"}"#).expect("minimal payload");
        assert_eq!(minimal.id, None);
    }

    #[test]
    fn test_outcome_from_result() {
        let task = variant_task();
        let outcome = Outcome::from_result(
            &task,
            Err(GenerationError::Timeout {
                task_id: 4,
                seconds: 5,
            }),
        );

        assert!(outcome.is_fallback());
        assert_eq!(outcome.id(), 4);
        assert!(outcome
            .record()
            .error
            .as_deref()
            .is_some_and(|e| e.contains("timed out")));
    }
}
