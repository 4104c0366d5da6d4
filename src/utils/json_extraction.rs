//! JSON extraction utilities for parsing LLM responses.
//!
//! Generation prompts demand bare JSON, but models still wrap answers in
//! markdown fences from time to time. These helpers strip the fence and
//! isolate the JSON object so the caller can parse it strictly.
//!
//! # Example
//!
//! ```
//! use mail_forge::utils::json_extraction::{extract_json_object, JsonExtractionResult};
//!
//! let response = "```json\n{\"id\": 1, \"subject\": \"Hi\"}\n```";
//! let result = extract_json_object(response);
//! assert_eq!(result.json(), Some("{\"id\": 1, \"subject\": \"Hi\"}"));
//! ```

use thiserror::Error;

/// Error type for JSON extraction failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JsonExtractionError {
    #[error("JSON appears truncated: {unclosed_braces} unclosed braces. Partial: {partial_preview}...")]
    Truncated {
        partial_preview: String,
        unclosed_braces: usize,
    },
    #[error("No JSON object found in response. Content starts with: '{content_preview}'")]
    NotFound { content_preview: String },
}

/// Result of a JSON extraction attempt
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtractionResult {
    /// A balanced JSON object was isolated
    Success(String),
    /// An object started but never closed
    Truncated {
        partial_json: String,
        unclosed_braces: usize,
    },
    /// No object-like content at all
    NotFound,
}

impl JsonExtractionResult {
    /// Returns true if JSON was successfully extracted
    pub fn is_success(&self) -> bool {
        matches!(self, JsonExtractionResult::Success(_))
    }

    /// Returns the extracted JSON string for the Success case
    pub fn json(&self) -> Option<&str> {
        match self {
            JsonExtractionResult::Success(json) => Some(json),
            _ => None,
        }
    }

    /// Converts the result to a Result, using `content` for the NotFound preview
    pub fn into_result_with_context(self, content: &str) -> Result<String, JsonExtractionError> {
        match self {
            JsonExtractionResult::Success(json) => Ok(json),
            JsonExtractionResult::Truncated {
                partial_json,
                unclosed_braces,
            } => Err(JsonExtractionError::Truncated {
                partial_preview: preview(&partial_json, 100),
                unclosed_braces,
            }),
            JsonExtractionResult::NotFound => Err(JsonExtractionError::NotFound {
                content_preview: preview(content.trim(), 50),
            }),
        }
    }
}

/// Char-boundary-safe prefix of `s`.
fn preview(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Removes a wrapping markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// Content without a leading fence is returned trimmed and otherwise untouched.
/// A missing closing fence is tolerated.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) on the opening line.
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        Some(_) => rest,
        None => rest
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim_start(),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Finds the index of the brace closing the object that starts at `s[0]`.
///
/// Handles nested braces and string literals with escaped quotes.
pub fn find_matching_brace(s: &str) -> Option<usize> {
    if !s.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Counts braces left open at the end of `s`, ignoring string contents.
fn unclosed_braces(s: &str) -> usize {
    let mut depth: isize = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for c in s.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth -= 1,
            _ => {}
        }
    }

    depth.max(0) as usize
}

/// Isolates the first JSON object in an LLM response.
///
/// Fences are stripped first; the object is the span from the first `{` to
/// its matching `}`. Anything outside that span is discarded.
pub fn extract_json_object(content: &str) -> JsonExtractionResult {
    let unfenced = strip_code_fences(content);

    let Some(start) = unfenced.find('{') else {
        return JsonExtractionResult::NotFound;
    };
    let candidate = &unfenced[start..];

    match find_matching_brace(candidate) {
        Some(end) => JsonExtractionResult::Success(candidate[..=end].to_string()),
        None => JsonExtractionResult::Truncated {
            partial_json: candidate.to_string(),
            unclosed_braces: unclosed_braces(candidate).max(1),
        },
    }
}
