//! Pull structured JSON out of free-form generator output.
//!
//! Models wrap JSON in prose or markdown fences. Extraction looks for the
//! first bracket-balanced array span that parses as a list of `T`; failing
//! that, the first balanced object span that parses as a single `T`.
//! Brackets inside JSON strings are ignored while balancing. Input is
//! scanned in linear time however many brackets it contains.

use serde::de::DeserializeOwned;

use super::GenerationError;

/// Extract a list of `T` from `raw`.
pub fn extract_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, GenerationError> {
    for span in balanced_spans(raw, b'[', b']') {
        if let Ok(items) = serde_json::from_str::<Vec<T>>(span) {
            return Ok(items);
        }
    }

    for span in balanced_spans(raw, b'{', b'}') {
        if let Ok(item) = serde_json::from_str::<T>(span) {
            return Ok(vec![item]);
        }
    }

    Err(GenerationError::Parse {
        reason: "no parseable JSON array or object found".to_string(),
        raw: raw.to_string(),
    })
}

/// Every balanced `open..close` span in `text`, in order of start position.
///
/// One pass with a stack of open positions. Quotes only start a string once
/// some bracket is open, so prose around the JSON cannot flip string state.
/// Unmatched closes are skipped and unmatched opens never yield a span.
fn balanced_spans(text: &str, open: u8, close: u8) -> impl Iterator<Item = &str> {
    let mut opens = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == open {
            opens.push(i);
        } else if b == b'"' {
            in_string = !opens.is_empty();
        } else if b == close {
            if let Some(start) = opens.pop() {
                spans.push((start, i));
            }
        }
    }

    // Inner spans close first; callers want outermost-first.
    spans.sort_unstable_by_key(|&(start, _)| start);
    spans.into_iter().map(move |(start, end)| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GeneratedStep, GeneratedTask};

    #[test]
    fn extracts_array_from_markdown_fence() {
        let raw = "Here is your roadmap:\n```json\n[\n  {\"order\": 1, \"title\": \"Learn syntax\"},\n  {\"order\": 2, \"title\": \"Build a CLI\"}\n]\n```\nGood luck!";
        let steps: Vec<GeneratedStep> = extract_list(raw).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].title, "Build a CLI");
    }

    #[test]
    fn brackets_inside_strings_do_not_break_balancing() {
        let raw = r#"[{"title": "Read [chapter 2] of \"The Book ]\""}]"#;
        let tasks: Vec<GeneratedTask> = extract_list(raw).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Read [chapter 2] of \"The Book ]\"");
    }

    #[test]
    fn skips_unparseable_leading_array() {
        let raw = "Steps [1] and [2] below: [{\"title\": \"Warm up\"}]";
        let tasks: Vec<GeneratedTask> = extract_list(raw).unwrap();
        assert_eq!(tasks, vec![GeneratedTask { title: "Warm up".into() }]);
    }

    #[test]
    fn single_object_becomes_one_element_list() {
        let raw = "Sure! {\"title\": \"Run 2km\"} That's it.";
        let tasks: Vec<GeneratedTask> = extract_list(raw).unwrap();
        assert_eq!(tasks, vec![GeneratedTask { title: "Run 2km".into() }]);
    }

    #[test]
    fn empty_array_is_valid() {
        let tasks: Vec<GeneratedTask> = extract_list("[]").unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn no_json_is_a_parse_error_with_raw_text() {
        let raw = "I cannot help with that.";
        let err = extract_list::<GeneratedTask>(raw).unwrap_err();
        match err {
            GenerationError::Parse { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn long_run_of_unclosed_brackets_is_scanned_once() {
        let raw = format!("{}[{{\"title\": \"Deep\"}}]", "[".repeat(20_000));
        let tasks: Vec<GeneratedTask> = extract_list(&raw).unwrap();
        assert_eq!(tasks, vec![GeneratedTask { title: "Deep".into() }]);
    }

    #[test]
    fn stray_closing_brackets_are_skipped() {
        let raw = "] ]] oops } [{\"title\": \"Stretch\"}]";
        let tasks: Vec<GeneratedTask> = extract_list(raw).unwrap();
        assert_eq!(tasks, vec![GeneratedTask { title: "Stretch".into() }]);
    }

    #[test]
    fn unbalanced_array_is_a_parse_error() {
        let err = extract_list::<GeneratedTask>("[{\"title\": \"x\"").unwrap_err();
        assert!(matches!(err, GenerationError::Parse { .. }));
    }
}
