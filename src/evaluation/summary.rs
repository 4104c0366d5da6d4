//! Plain-text rendering of aggregate reports.

use std::fmt::Write;

use super::aggregator::AggregateReport;
use super::judge::Criterion;
use super::score::MAX_SCORE;

/// Width of a full-score bar, in characters.
const BAR_WIDTH: usize = 20;

/// Renders averages as a bar chart on the 0..=5 scale, followed by the
/// per-sample trend table.
pub fn render_summary(report: &AggregateReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} - Average Evaluation Scores (0-{})", report.dataset, MAX_SCORE);
    for summary in &report.criteria {
        let _ = writeln!(
            out,
            "  {:<13} {} {:.2}",
            summary.criterion.label(),
            bar(summary.average),
            summary.average
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{} - Score Trend Across Samples", report.dataset);
    let _ = write!(out, "  {:>6}", "Sample");
    for criterion in Criterion::ALL {
        let _ = write!(out, "  {:>12}", criterion.label());
    }
    let _ = writeln!(out);

    for i in 0..report.samples_used {
        let _ = write!(out, "  {:>6}", i + 1);
        for criterion in Criterion::ALL {
            match report.trend(criterion).get(i) {
                Some(score) => {
                    let _ = write!(out, "  {:>12}", score);
                }
                None => {
                    let _ = write!(out, "  {:>12}", "-");
                }
            }
        }
        let _ = writeln!(out);
    }

    out
}

fn bar(average: f64) -> String {
    let ratio = (average / f64::from(MAX_SCORE)).clamp(0.0, 1.0);
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::aggregator::CriterionSummary;

    fn report() -> AggregateReport {
        AggregateReport {
            dataset: "SHORTEN".to_string(),
            samples_used: 2,
            examined: 3,
            skipped_empty: 0,
            generation_failures: 0,
            partially_scored: 1,
            criteria: vec![
                CriterionSummary {
                    criterion: Criterion::Faithfulness,
                    average: 5.0,
                    trend: vec![5, 5],
                },
                CriterionSummary {
                    criterion: Criterion::Completeness,
                    average: 2.5,
                    trend: vec![3, 2],
                },
                CriterionSummary {
                    criterion: Criterion::Robustness,
                    average: 0.0,
                    trend: vec![0, 0],
                },
            ],
        }
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(5.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(0.0), ".".repeat(BAR_WIDTH));
        assert_eq!(bar(2.5).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_render_summary_contains_averages_and_trend_rows() {
        let text = render_summary(&report());

        assert!(text.contains("SHORTEN - Average Evaluation Scores (0-5)"));
        assert!(text.contains("Completeness"));
        assert!(text.contains("2.50"));
        assert!(text.contains("SHORTEN - Score Trend Across Samples"));

        let rows: Vec<&str> = text
            .lines()
            .filter(|line| line.trim_start().starts_with(|c: char| c.is_ascii_digit()))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].split_whitespace().eq(["2", "5", "2", "0"]));
    }
}
