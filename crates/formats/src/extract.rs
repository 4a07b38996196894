//! Recovers a [`TripSummary`] from chat-history service output.
//!
//! Two input shapes are accepted. A single block of free text is searched for
//! the summary signature and the embedded object is bounded with a
//! balanced-brace scan, so nested objects and braces inside string values do
//! not cut it short. A sequence of fragments is filtered to the ones that look
//! like whole objects and the first that decodes wins.
//!
//! Extraction is pure: no I/O, no retries, and decoder errors are folded into
//! [`ExtractError::ParseFailure`] instead of escaping.

use crate::chat_output::ChatHistoryOutput;
use crate::trip_summary::TripSummary;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Nothing in the input looked like a summary.
    #[error("no summary found")]
    NoSummaryFound,
    /// Something summary-shaped was present but could not be decoded.
    #[error("summary could not be parsed: {reason}")]
    ParseFailure { reason: String },
}

impl ExtractError {
    fn parse(reason: impl Into<String>) -> Self {
        ExtractError::ParseFailure {
            reason: reason.into(),
        }
    }
}

/// Dispatches on the shape of the service output.
pub fn extract_summary(output: &ChatHistoryOutput) -> Result<TripSummary, ExtractError> {
    match output {
        ChatHistoryOutput::Text(text) => extract_from_text(text),
        ChatHistoryOutput::Fragments(fragments) => extract_from_fragments(fragments),
    }
}

/// Extracts the first signature-marked summary embedded in `text`.
pub fn extract_from_text(text: &str) -> Result<TripSummary, ExtractError> {
    let start = find_signature(text).ok_or(ExtractError::NoSummaryFound)?;
    let tail = &text[start..];
    let end = balanced_object_end(tail)
        .ok_or_else(|| ExtractError::parse("summary object is not terminated"))?;
    decode_object(&tail[..end])
}

/// Extracts the first decodable object among `fragments`, in order.
///
/// Returns `NoSummaryFound` when no fragment is shaped like an object and
/// `ParseFailure` when candidates existed but none decoded.
pub fn extract_from_fragments<I, S>(fragments: I) -> Result<TripSummary, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates = 0usize;
    let mut last_reason = String::new();

    for fragment in fragments {
        let trimmed = fragment.as_ref().trim();
        if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
            continue;
        }
        candidates += 1;
        match decode_object(trimmed) {
            Ok(summary) => return Ok(summary),
            Err(ExtractError::ParseFailure { reason }) => last_reason = reason,
            Err(ExtractError::NoSummaryFound) => {}
        }
    }

    if candidates == 0 {
        return Err(ExtractError::NoSummaryFound);
    }
    Err(ExtractError::parse(format!(
        "{candidates} candidate fragment(s) failed to decode; last error: {last_reason}"
    )))
}

/// Byte offset of the first `{` that opens an object whose first key is
/// `"title"`. ASCII whitespace between the brace and the key is tolerated.
pub fn find_signature(text: &str) -> Option<usize> {
    text.match_indices('{').map(|(idx, _)| idx).find(|&idx| {
        text[idx + 1..]
            .trim_start_matches(|c: char| c.is_ascii_whitespace())
            .starts_with("\"title\"")
    })
}

/// Length of the object that starts at byte 0 of `s`, closing brace included.
///
/// Braces inside JSON strings are ignored; backslash escapes inside strings
/// are honoured. Returns `None` if `s` does not start with `{` or the object
/// never closes.
pub fn balanced_object_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }

    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut escape = false;

    for (i, &c) in bytes.iter().enumerate() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_object(candidate: &str) -> Result<TripSummary, ExtractError> {
    // Only objects count; a bare array would otherwise decode positionally.
    if !candidate.trim_start().starts_with('{') {
        return Err(ExtractError::parse("candidate is not an object"));
    }
    serde_json::from_str(candidate).map_err(|e| ExtractError::parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        ExtractError, balanced_object_end, extract_from_fragments, extract_from_text,
        extract_summary, find_signature,
    };
    use crate::chat_output::ChatHistoryOutput;
    use crate::trip_summary::TripSummary;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn spain() -> TripSummary {
        TripSummary {
            title: "Spain Trip".to_string(),
            destination: "Spain".to_string(),
            ..TripSummary::default()
        }
    }

    #[test]
    fn text_without_signature_is_no_summary() {
        assert_eq!(
            extract_from_text("Chat not found"),
            Err(ExtractError::NoSummaryFound)
        );
        // An object is present but its first key is not the title.
        assert_eq!(
            extract_from_text(r#"data: {"destination":"Spain","title":"x"}"#),
            Err(ExtractError::NoSummaryFound)
        );
    }

    #[test]
    fn text_with_embedded_summary() {
        let text = r#"Here is the summary of the chat:
{"title":"Spain Trip","destination":"Spain"}
Let me know if you need anything else {or not}."#;
        assert_eq!(extract_from_text(text), Ok(spain()));
    }

    #[test]
    fn signature_tolerates_whitespace_after_brace() {
        let text = "summary:\n{\n  \"title\": \"Spain Trip\",\n  \"destination\": \"Spain\"\n}";
        assert_eq!(find_signature(text), Some(9));
        assert_eq!(extract_from_text(text), Ok(spain()));
    }

    #[test]
    fn nested_objects_are_bounded_by_balance_not_first_brace() {
        let text = r#"{"title":"Spain Trip","meta":{"source":"chat"},"destination":"Spain"} trailing }"#;
        assert_eq!(extract_from_text(text), Ok(spain()));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"title":"Spain } Trip {","requirements":"say \"}\" twice"} tail"#;
        let s = extract_from_text(text).unwrap();
        assert_eq!(s.title, "Spain } Trip {");
        assert_eq!(s.requirements, r#"say "}" twice"#);
    }

    #[test]
    fn unterminated_summary_is_parse_failure() {
        let text = r#"{"title":"Spain Trip","destination":"Spa"#;
        assert!(matches!(
            extract_from_text(text),
            Err(ExtractError::ParseFailure { .. })
        ));
    }

    #[test]
    fn malformed_summary_is_parse_failure() {
        let text = r#"{"title":"Spain Trip", destination: Spain}"#;
        let err = extract_from_text(text).unwrap_err();
        assert!(matches!(err, ExtractError::ParseFailure { .. }));
        assert!(err.to_string().starts_with("summary could not be parsed"));
    }

    #[test]
    fn nested_object_in_text_field_is_parse_failure() {
        let text = r#"{"title":{"en":"Spain Trip"}}"#;
        assert!(matches!(
            extract_from_text(text),
            Err(ExtractError::ParseFailure { .. })
        ));
    }

    #[test]
    fn lenient_fields_and_defaults() {
        let text = r#"{"title":"Summer Trip - SF Crew","budget":5000,"dates":null,"names":"Ana, Ben"}"#;
        let s = extract_from_text(text).unwrap();
        assert_eq!(
            s,
            TripSummary {
                title: "Summer Trip - SF Crew".to_string(),
                budget: "5000".to_string(),
                participant_names: vec!["Ana".to_string(), "Ben".to_string()],
                ..TripSummary::default()
            }
        );
    }

    #[test]
    fn empty_fragment_sequence_is_no_summary() {
        let empty: [&str; 0] = [];
        assert_eq!(
            extract_from_fragments(empty),
            Err(ExtractError::NoSummaryFound)
        );
    }

    #[test]
    fn fragments_without_candidates_are_no_summary() {
        let frags = ["Looking up the chat...", "not json", "{ unbalanced"];
        assert_eq!(
            extract_from_fragments(frags),
            Err(ExtractError::NoSummaryFound)
        );
    }

    #[test]
    fn first_decodable_fragment_wins() {
        let frags = [
            "not json",
            r#"{"title":"Spain Trip","destination":"Spain"}"#,
            r#"{"title":"Later"}"#,
        ];
        assert_eq!(extract_from_fragments(frags), Ok(spain()));
    }

    #[test]
    fn candidate_fragments_that_all_fail_are_parse_failure() {
        let frags = vec![
            "{not json}".to_string(),
            "  {\"title\": }  ".to_string(),
        ];
        let err = extract_from_fragments(&frags).unwrap_err();
        match err {
            ExtractError::ParseFailure { reason } => {
                assert!(reason.starts_with("2 candidate fragment(s)"), "{reason}");
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn fragment_without_title_still_decodes() {
        let frags = [r#"  {"destination":"Spain"}  "#];
        let s = extract_from_fragments(frags).unwrap();
        assert_eq!(s.destination, "Spain");
        assert_eq!(s.title, "");
    }

    #[test]
    fn extract_summary_dispatches_on_shape() {
        let text = ChatHistoryOutput::Text(r#"x {"title":"Spain Trip","destination":"Spain"}"#.into());
        assert_eq!(extract_summary(&text), Ok(spain()));

        let frags = ChatHistoryOutput::Fragments(vec![]);
        assert_eq!(extract_summary(&frags), Err(ExtractError::NoSummaryFound));
    }

    #[test]
    fn balanced_end_requires_leading_brace() {
        assert_eq!(balanced_object_end("x{}"), None);
        assert_eq!(balanced_object_end("{}"), Some(2));
        assert_eq!(balanced_object_end(r#"{"a":{"b":"}"}} rest"#), Some(15));
    }

    #[test]
    fn encoded_summary_round_trips() {
        let original = TripSummary {
            title: "Spain Trip".to_string(),
            requirements: "Beach days, one museum {at least}".to_string(),
            destination: "Spain".to_string(),
            duration: "7 days".to_string(),
            dates: "Jun 15 - Jun 22, 2025".to_string(),
            budget: "$5000".to_string(),
            participant_names: vec!["Ana".to_string(), "Ben".to_string()],
        };
        let encoded = original.to_signature_json().unwrap();
        let text = format!("Summary of the group chat:\n{encoded}\nDone.");
        assert_eq!(extract_from_text(&text), Ok(original));
    }

    #[test]
    fn padded_and_blank_names_round_trip() {
        let original = TripSummary {
            title: "Spain Trip".to_string(),
            participant_names: vec![" Ana ".into(), "".into(), "Smith, Jr.".into()],
            ..TripSummary::default()
        };
        let encoded = original.to_signature_json().unwrap();
        assert_eq!(extract_from_text(&encoded), Ok(original));
    }

    proptest! {
        #[test]
        fn round_trip_survives_arbitrary_text_fields(
            title in any::<String>(),
            requirements in any::<String>(),
            budget in any::<String>(),
            names in proptest::collection::vec(any::<String>(), 0..4),
        ) {
            let original = TripSummary {
                title,
                requirements,
                budget,
                participant_names: names,
                ..TripSummary::default()
            };
            let encoded = original.to_signature_json().unwrap();
            let text = format!("chat summary follows\n{encoded}\n}} stray");
            prop_assert_eq!(extract_from_text(&text), Ok(original));
        }
    }
}
