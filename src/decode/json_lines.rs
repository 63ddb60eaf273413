// ABOUTME: Splits concatenated or newline-separated JSON objects from CLI output.
// ABOUTME: Records that fail to parse are dropped individually.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Split text into top-level JSON object records.
///
/// Braces inside string literals are ignored, so `}{` boundaries and
/// newlines both separate records. Surrounding noise is skipped.
pub fn split_records(text: &str) -> Vec<Value> {
    parse_records(text)
}

/// Split and deserialize each record as `T`.
pub fn parse_records<T: DeserializeOwned>(text: &str) -> Vec<T> {
    object_spans(text)
        .into_iter()
        .filter_map(|raw| match serde_json::from_str::<T>(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(error = %e, record = raw, "dropping unparseable record");
                None
            }
        })
        .collect()
}

fn object_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        tracing::debug!(trailing = &text[start..], "dropping unterminated record");
    }
    spans
}
