//! Sequential evaluation of a dataset sample across all criteria.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::judge::{Criterion, Judge};
use super::rewriter::{RewriteAction, Rewriter};
use crate::error::EvaluationError;

/// A dataset row as seen by the evaluator. Only `content` is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub content: String,
}

impl SourceRecord {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Average and per-sample scores for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionSummary {
    pub criterion: Criterion,
    /// Mean over used samples.
    pub average: f64,
    /// Scores in sample order; index `i` is the `i`-th used sample.
    pub trend: Vec<u8>,
}

/// Aggregated scores for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub dataset: String,
    /// Records that produced all three scores.
    pub samples_used: usize,
    /// Records looked at, including skipped ones.
    pub examined: usize,
    pub skipped_empty: usize,
    pub generation_failures: usize,
    /// Records judged but missing at least one score.
    pub partially_scored: usize,
    /// One entry per criterion, in [`Criterion::ALL`] order.
    pub criteria: Vec<CriterionSummary>,
}

impl AggregateReport {
    pub fn summary(&self, criterion: Criterion) -> Option<&CriterionSummary> {
        self.criteria.iter().find(|c| c.criterion == criterion)
    }

    pub fn average(&self, criterion: Criterion) -> Option<f64> {
        self.summary(criterion).map(|c| c.average)
    }

    pub fn trend(&self, criterion: Criterion) -> &[u8] {
        self.summary(criterion).map(|c| c.trend.as_slice()).unwrap_or(&[])
    }
}

/// Drives judge calls over a capped sample and aggregates the scores.
pub struct EvaluationAggregator {
    judge: Arc<dyn Judge>,
}

impl EvaluationAggregator {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    /// Evaluates records in order until `max_samples` have been fully scored.
    ///
    /// For each record with non-empty content, `generate` produces the
    /// candidate, then each criterion is judged in turn. A record counts only
    /// when all three scores are present; generation failures and partial
    /// scores are skipped without contributing to any trend.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::NoSamplesUsed` if no record qualifies.
    pub async fn evaluate<F, Fut, E>(
        &self,
        dataset: &str,
        records: &[SourceRecord],
        mut generate: F,
        max_samples: usize,
    ) -> Result<AggregateReport, EvaluationError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: Display,
    {
        let mut trends: [Vec<u8>; 3] = Default::default();
        let mut examined = 0;
        let mut skipped_empty = 0;
        let mut generation_failures = 0;
        let mut partially_scored = 0;

        for record in records {
            if trends[0].len() >= max_samples {
                break;
            }
            examined += 1;

            let original = record.content.trim();
            if original.is_empty() {
                skipped_empty += 1;
                continue;
            }

            let generated = match generate(original.to_string()).await {
                Ok(generated) => generated,
                Err(e) => {
                    generation_failures += 1;
                    warn!(dataset, record = examined, error = %e, "Candidate generation failed, skipping record");
                    continue;
                }
            };

            let mut scores = [None; 3];
            for (slot, criterion) in scores.iter_mut().zip(Criterion::ALL) {
                let verdict = self.judge.judge(criterion, original, &generated).await;
                *slot = verdict.score();
                if slot.is_none() {
                    debug!(dataset, record = examined, criterion = %criterion, verdict = %verdict, "No score extracted");
                }
            }

            match scores {
                [Some(f), Some(c), Some(r)] => {
                    trends[0].push(f);
                    trends[1].push(c);
                    trends[2].push(r);
                    info!(dataset, sample = trends[0].len(), "Evaluated sample");
                }
                _ => partially_scored += 1,
            }
        }

        let samples_used = trends[0].len();
        if samples_used == 0 {
            return Err(EvaluationError::NoSamplesUsed {
                dataset: dataset.to_string(),
                examined,
            });
        }

        let criteria = Criterion::ALL
            .into_iter()
            .zip(trends)
            .map(|(criterion, trend)| CriterionSummary {
                criterion,
                average: trend.iter().map(|&s| f64::from(s)).sum::<f64>() / trend.len() as f64,
                trend,
            })
            .collect();

        Ok(AggregateReport {
            dataset: dataset.to_string(),
            samples_used,
            examined,
            skipped_empty,
            generation_failures,
            partially_scored,
            criteria,
        })
    }

    /// Evaluates with candidates produced by `rewriter` applying `action`.
    pub async fn evaluate_rewrites(
        &self,
        dataset: &str,
        records: &[SourceRecord],
        rewriter: Arc<dyn Rewriter>,
        action: &RewriteAction,
        max_samples: usize,
    ) -> Result<AggregateReport, EvaluationError> {
        self.evaluate(
            dataset,
            records,
            |original| {
                let rewriter = Arc::clone(&rewriter);
                let action = action.clone();
                async move { rewriter.rewrite(&action, &original).await }
            },
            max_samples,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::judge::Verdict;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Judge scripted per (generated text, criterion).
    struct ScriptedJudge {
        verdicts: HashMap<(String, Criterion), Verdict>,
        calls: Mutex<Vec<Criterion>>,
    }

    #[async_trait]
    impl Judge for ScriptedJudge {
        async fn judge(&self, criterion: Criterion, _original: &str, generated: &str) -> Verdict {
            self.calls.lock().expect("lock poisoned").push(criterion);
            self.verdicts
                .get(&(generated.to_string(), criterion))
                .cloned()
                .unwrap_or_else(|| Verdict::Text("Score: 3 / 5".to_string()))
        }
    }

    fn judge_with(entries: Vec<(&str, Criterion, Verdict)>) -> Arc<ScriptedJudge> {
        Arc::new(ScriptedJudge {
            verdicts: entries
                .into_iter()
                .map(|(text, c, v)| ((text.to_string(), c), v))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    async fn echo(original: String) -> Result<String, String> {
        Ok(format!("rewritten {}", original))
    }

    #[tokio::test]
    async fn test_partial_scores_are_discarded() {
        let judge = judge_with(vec![
            ("rewritten a", Criterion::Faithfulness, Verdict::Text("Score: 5 / 5".into())),
            ("rewritten b", Criterion::Completeness, Verdict::Text("unclear".into())),
            ("rewritten c", Criterion::Robustness, Verdict::Text("Score: 1/5".into())),
        ]);
        let aggregator = EvaluationAggregator::new(judge.clone());
        let records = vec![
            SourceRecord::new("a"),
            SourceRecord::new("b"),
            SourceRecord::new("c"),
        ];

        let report = aggregator
            .evaluate("SHORTEN", &records, echo, 10)
            .await
            .expect("two samples qualify");

        assert_eq!(report.samples_used, 2);
        assert_eq!(report.partially_scored, 1);
        assert_eq!(report.trend(Criterion::Faithfulness), &[5, 3]);
        assert_eq!(report.trend(Criterion::Robustness), &[3, 1]);
        assert_eq!(report.average(Criterion::Faithfulness), Some(4.0));
        assert_eq!(report.average(Criterion::Completeness), Some(3.0));
        assert_eq!(judge.calls.lock().expect("lock poisoned").len(), 9);
    }

    #[tokio::test]
    async fn test_empty_content_and_failed_generation_are_skipped() {
        let aggregator = EvaluationAggregator::new(judge_with(vec![]));
        let records = vec![
            SourceRecord::new("   "),
            SourceRecord::new("fail"),
            SourceRecord::default(),
            SourceRecord::new("ok"),
        ];

        let report = aggregator
            .evaluate(
                "TONE",
                &records,
                |original| async move {
                    if original == "fail" {
                        Err("upstream 500".to_string())
                    } else {
                        Ok(original)
                    }
                },
                10,
            )
            .await
            .expect("one sample qualifies");

        assert_eq!(report.samples_used, 1);
        assert_eq!(report.examined, 4);
        assert_eq!(report.skipped_empty, 2);
        assert_eq!(report.generation_failures, 1);
    }

    #[tokio::test]
    async fn test_max_samples_caps_used_records() {
        let judge = judge_with(vec![]);
        let aggregator = EvaluationAggregator::new(judge.clone());
        let records: Vec<SourceRecord> = (0..6).map(|i| SourceRecord::new(format!("r{}", i))).collect();

        let report = aggregator
            .evaluate("LENGTHEN", &records, echo, 2)
            .await
            .expect("samples qualify");

        assert_eq!(report.samples_used, 2);
        assert_eq!(report.examined, 2);
        assert_eq!(judge.calls.lock().expect("lock poisoned").len(), 6);
    }

    #[tokio::test]
    async fn test_no_samples_used() {
        let aggregator = EvaluationAggregator::new(judge_with(vec![]));
        let records = vec![SourceRecord::new("a"), SourceRecord::new("b")];

        let err = aggregator
            .evaluate(
                "SHORTEN",
                &records,
                |_| async { Err::<String, _>("down") },
                10,
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            EvaluationError::NoSamplesUsed {
                dataset: "SHORTEN".to_string(),
                examined: 2
            }
        );
    }

    #[tokio::test]
    async fn test_failed_verdict_excludes_record() {
        let judge = judge_with(vec![(
            "rewritten a",
            Criterion::Completeness,
            Verdict::Failed("timeout".into()),
        )]);
        let aggregator = EvaluationAggregator::new(judge);

        let err = aggregator
            .evaluate("SHORTEN", &[SourceRecord::new("a")], echo, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::NoSamplesUsed { examined: 1, .. }));
    }
}
