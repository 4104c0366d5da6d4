//! LLM-as-judge evaluation of rewritten emails.
//!
//! Each sampled record is rewritten into a candidate, judged on three
//! independent criteria, and scored by [`extract_score`]. The
//! [`EvaluationAggregator`] keeps only records where every criterion
//! produced a score and reports per-criterion averages and trends.

pub mod aggregator;
pub mod judge;
pub mod rewriter;
pub mod score;
pub mod summary;

pub use aggregator::{AggregateReport, CriterionSummary, EvaluationAggregator, SourceRecord};
pub use judge::{Criterion, Judge, LlmJudge, Verdict};
pub use rewriter::{clean_body, LlmRewriter, RewriteAction, Rewriter, DEFAULT_TONE};
pub use score::{extract_score, JUDGE_FAILURE_PREFIX, MAX_SCORE};
pub use summary::render_summary;
