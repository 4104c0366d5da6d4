//! Evaluation aggregation over a JSONL dataset with scripted collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use mail_forge::error::{EvaluationError, LlmError};
use mail_forge::evaluation::{
    Criterion, EvaluationAggregator, Judge, RewriteAction, Rewriter, SourceRecord, Verdict,
};
use mail_forge::export::read_jsonl;

/// Scores by the first word of the candidate; "partial" withholds robustness.
struct KeywordJudge;

#[async_trait]
impl Judge for KeywordJudge {
    async fn judge(&self, criterion: Criterion, _original: &str, generated: &str) -> Verdict {
        if generated.starts_with("partial") && criterion == Criterion::Robustness {
            return Verdict::Text("Verdict: unclear, no score given".to_string());
        }
        let score = match criterion {
            Criterion::Faithfulness => 5,
            Criterion::Completeness => 4,
            Criterion::Robustness => 2,
        };
        Verdict::Text(format!("Score: {} / 5\nVerdict: ok\n- reasoning", score))
    }
}

struct PrefixRewriter {
    fail: bool,
}

#[async_trait]
impl Rewriter for PrefixRewriter {
    async fn rewrite(&self, _action: &RewriteAction, original: &str) -> Result<String, LlmError> {
        if self.fail {
            return Err(LlmError::RequestFailed("connection refused".to_string()));
        }
        Ok(original.to_string())
    }
}

fn write_dataset(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("shorten.jsonl");
    std::fs::write(
        &path,
        concat!(
            "{\"id\": 1, \"content\": \"full one\"}\n",
            "{\"id\": 2, \"content\": \"partial two\"}\n",
            "corrupt line\n",
            "{\"id\": 3, \"subject\": \"no content\"}\n",
            "{\"id\": 4, \"content\": \"full four\"}"
        ),
    )
    .expect("should write dataset");
    path
}

#[tokio::test]
async fn test_two_full_one_partial() {
    let dir = TempDir::new().expect("should create temp dir");
    let read = read_jsonl::<SourceRecord>(&write_dataset(&dir)).expect("should read");
    assert_eq!(read.records.len(), 4);
    assert_eq!(read.skipped, 1);

    let aggregator = EvaluationAggregator::new(Arc::new(KeywordJudge));
    let report = aggregator
        .evaluate_rewrites(
            "SHORTEN",
            &read.records,
            Arc::new(PrefixRewriter { fail: false }),
            &RewriteAction::Shorten,
            10,
        )
        .await
        .expect("samples qualify");

    assert_eq!(report.samples_used, 2);
    assert_eq!(report.partially_scored, 1);
    assert_eq!(report.skipped_empty, 1);
    for criterion in Criterion::ALL {
        assert_eq!(report.trend(criterion).len(), 2);
    }
    assert_eq!(report.average(Criterion::Faithfulness), Some(5.0));
    assert_eq!(report.average(Criterion::Robustness), Some(2.0));

    let json = serde_json::to_value(&report).expect("serializable");
    assert_eq!(json["criteria"][0]["criterion"], "faithfulness");
}

#[tokio::test]
async fn test_every_generation_failing_is_no_samples_used() {
    let dir = TempDir::new().expect("should create temp dir");
    let read = read_jsonl::<SourceRecord>(&write_dataset(&dir)).expect("should read");

    let aggregator = EvaluationAggregator::new(Arc::new(KeywordJudge));
    let err = aggregator
        .evaluate_rewrites(
            "SHORTEN",
            &read.records,
            Arc::new(PrefixRewriter { fail: true }),
            &RewriteAction::Shorten,
            10,
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EvaluationError::NoSamplesUsed {
            dataset: "SHORTEN".to_string(),
            examined: 4
        }
    );
}
