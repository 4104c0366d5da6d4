//! Judge rubrics, one per evaluation criterion.
//!
//! Each rubric pairs a system prompt (definition and 0-5 scale) with a
//! response-format block appended to the user prompt. All three ask for the
//! same leading shape: `Score: <0-5> / 5`, then `Verdict: <label>`, then
//! reasoning bullets.

use serde::{Deserialize, Serialize};

/// System prompt and response format for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeRubric {
    pub system: String,
    pub response_format: String,
}

impl JudgeRubric {
    pub(crate) fn from_static(parts: (&str, &str)) -> Self {
        Self {
            system: parts.0.to_string(),
            response_format: parts.1.to_string(),
        }
    }
}

pub const FAITHFULNESS_RUBRIC: (&str, &str) = (
    "You are an expert evaluator judging FAITHFULNESS of a rewritten text.

Definition:
- Meaning must be preserved.
- No hallucinated facts.
- No intent distortion.

Scoring:
5 = Perfectly faithful
4 = Minor wording changes
3 = Slight meaning drift
2 = Important meaning changes
1 = Major distortions
0 = Completely unfaithful

You MUST explain the score clearly.",
    "Respond in EXACT format:

Score: <0-5> / 5
Verdict: <Short label>

Reasoning:
- Bullet-point justification
- Mention added, altered, or removed facts",
);

pub const COMPLETENESS_RUBRIC: (&str, &str) = (
    "You are an expert evaluator judging COMPLETENESS.

Definition:
- All key ideas must be retained.
- Minor shortening allowed.
- Missing important info lowers score.

Scoring:
5 = Fully complete
4 = One minor detail missing
3 = Some details missing
2 = Many details missing
1 = Barely complete
0 = Almost nothing preserved",
    "Respond in EXACT format:

Score: <0-5> / 5
Verdict: <Short label>

Reasoning:
- Bullet-point explanation
- Mention retained and missing points

Missing Elements:
- List missing ideas or \"None\"",
);

pub const ROBUSTNESS_RUBRIC: (&str, &str) = (
    "You are an expert evaluator judging ROBUSTNESS of a rewritten text.

Definition of Robustness:
- Output should remain stable and sensible.
- Should not hallucinate under ambiguity.
- Should avoid overconfidence or unsafe assumptions.

Scoring:
5 = Very robust and reliable
4 = Mostly robust, minor weaknesses
3 = Some instability or vague assumptions
2 = Fragile response
1 = Very unstable or misleading
0 = Unsafe or nonsensical

Explain your score clearly.",
    "Evaluate ROBUSTNESS and respond in EXACT format:

Score: <0-5> / 5
Verdict: <Short label>

Reasoning:
- Bullet-point explanation
- Mention ambiguity handling
- Mention hallucination risks",
);

/// Renders the judge user prompt for one (original, generated) pair.
pub fn render_judge_prompt(rubric: &JudgeRubric, original: &str, generated: &str) -> String {
    format!(
        "ORIGINAL TEXT:\n{original}\n\nGENERATED TEXT:\n{generated}\n\n{format}",
        original = original,
        generated = generated,
        format = rubric.response_format,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_judge_prompt_layout() {
        let rubric = JudgeRubric::from_static(FAITHFULNESS_RUBRIC);
        let prompt = render_judge_prompt(&rubric, "Meeting moved to 3pm.", "Meeting is at 3pm.");

        let original_at = prompt.find("ORIGINAL TEXT:").expect("original block");
        let generated_at = prompt.find("GENERATED TEXT:").expect("generated block");
        assert!(original_at < generated_at);
        assert!(prompt.contains("Score: <0-5> / 5"));
        assert!(prompt.ends_with("- Mention added, altered, or removed facts"));
    }

    #[test]
    fn test_every_rubric_requests_score_line() {
        for rubric in [FAITHFULNESS_RUBRIC, COMPLETENESS_RUBRIC, ROBUSTNESS_RUBRIC] {
            assert!(rubric.1.contains("Score: <0-5> / 5"));
            assert!(rubric.1.contains("Verdict:"));
        }
    }
}
