//! Response parser — the line grammar over raw completion text.
//!
//! The model's output is semi-structured free text punctuated by keyword
//! markers. Parsing is purely lexical: no semantic understanding, just
//! marker detection with defined precedence and failure cases.
//!
//! Precedence:
//! 1. `Final Answer:` anywhere terminates — the trailing content is the
//!    answer, regardless of any Action text.
//! 2. The first `Action:` / `Action Input:` pair yields an action; each
//!    value is the remainder of its marker's line, trimmed. Later action
//!    blocks are ignored (one action per cycle).
//! 3. Neither marker present: the whole text is a direct terminal answer.
//!
//! An `Action:` marker without a following `Action Input:` is the one hard
//! failure: [`ParseError::MissingActionInput`].

use thiserror::Error;

const FINAL_ANSWER_MARKER: &str = "Final Answer:";
const ACTION_MARKER: &str = "Action:";
const ACTION_INPUT_MARKER: &str = "Action Input:";

/// The structured interpretation of one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// The model declared termination with `Final Answer:`.
    FinalAnswer(String),
    /// The model requested a tool invocation.
    Action { tool: String, input: String },
    /// No markers at all: the whole text stands as the answer.
    Direct(String),
}

/// Malformed model output that cannot be interpreted as an action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Action '{tool}' is missing its Action Input line")]
    MissingActionInput { tool: String },
}

/// Parse one raw completion into a [`ParsedResponse`].
pub fn parse(text: &str) -> Result<ParsedResponse, ParseError> {
    if let Some(idx) = text.find(FINAL_ANSWER_MARKER) {
        let answer = text[idx + FINAL_ANSWER_MARKER.len()..].trim().to_string();
        return Ok(ParsedResponse::FinalAnswer(answer));
    }

    let mut lines = text.lines();
    let tool = loop {
        match lines.next() {
            // `Action Input:` contains `Action:`-like text, so the input
            // marker must be ruled out before matching the action marker.
            Some(line) if line.contains(ACTION_INPUT_MARKER) => continue,
            Some(line) => {
                if let Some(idx) = line.find(ACTION_MARKER) {
                    break line[idx + ACTION_MARKER.len()..].trim().to_string();
                }
            }
            None => return Ok(ParsedResponse::Direct(text.trim().to_string())),
        }
    };

    // The input is the first `Action Input:` line after the action line.
    for line in lines {
        if let Some(idx) = line.find(ACTION_INPUT_MARKER) {
            let input = line[idx + ACTION_INPUT_MARKER.len()..].trim().to_string();
            return Ok(ParsedResponse::Action { tool, input });
        }
    }

    Err(ParseError::MissingActionInput { tool })
}

/// Best-effort extraction of a final answer from text.
///
/// Returns the trailing content after `Final Answer:` if the marker is
/// present, otherwise `None`. Used by the forced-termination path, where
/// the whole text is accepted when the model skipped the marker.
pub fn extract_final_answer(text: &str) -> Option<String> {
    text.find(FINAL_ANSWER_MARKER)
        .map(|idx| text[idx + FINAL_ANSWER_MARKER.len()..].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_answer_extracted() {
        let result = parse("I am confident now.\nFinal Answer: 42").unwrap();
        assert_eq!(result, ParsedResponse::FinalAnswer("42".into()));
    }

    #[test]
    fn final_answer_takes_precedence_over_action() {
        let text = "Action: search\nAction Input: something\nFinal Answer: Paris";
        let result = parse(text).unwrap();
        assert_eq!(result, ParsedResponse::FinalAnswer("Paris".into()));
    }

    #[test]
    fn final_answer_keeps_trailing_content() {
        let text = "Final Answer: Paris is the capital.\nIt has 2.1M people.";
        let result = parse(text).unwrap();
        assert_eq!(
            result,
            ParsedResponse::FinalAnswer("Paris is the capital.\nIt has 2.1M people.".into())
        );
    }

    #[test]
    fn action_and_input_extracted() {
        let text = "I should look this up.\nAction: Search\nAction Input: X";
        let result = parse(text).unwrap();
        assert_eq!(
            result,
            ParsedResponse::Action {
                tool: "Search".into(),
                input: "X".into()
            }
        );
    }

    #[test]
    fn action_values_are_trimmed() {
        let text = "Action:   search  \nAction Input:   capital of France  ";
        let result = parse(text).unwrap();
        assert_eq!(
            result,
            ParsedResponse::Action {
                tool: "search".into(),
                input: "capital of France".into()
            }
        );
    }

    #[test]
    fn only_first_action_block_honored() {
        let text = "Action: search\nAction Input: first\nAction: other\nAction Input: second";
        let result = parse(text).unwrap();
        assert_eq!(
            result,
            ParsedResponse::Action {
                tool: "search".into(),
                input: "first".into()
            }
        );
    }

    #[test]
    fn missing_action_input_is_an_error() {
        let text = "I will search.\nAction: search\nbut I forgot the input";
        let err = parse(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingActionInput {
                tool: "search".into()
            }
        );
    }

    #[test]
    fn no_markers_degrades_to_direct_answer() {
        let text = "The capital of France is Paris.";
        let result = parse(text).unwrap();
        assert_eq!(result, ParsedResponse::Direct(text.into()));
    }

    #[test]
    fn direct_answer_is_trimmed() {
        let result = parse("  plain text  \n").unwrap();
        assert_eq!(result, ParsedResponse::Direct("plain text".into()));
    }

    #[test]
    fn extract_final_answer_best_effort() {
        assert_eq!(
            extract_final_answer("blah\nFinal Answer:  Paris "),
            Some("Paris".into())
        );
        assert_eq!(extract_final_answer("no marker here"), None);
    }

    #[test]
    fn action_input_line_does_not_match_as_action() {
        // An input marker before any action marker must not be mistaken
        // for the action itself.
        let text = "Action Input: stray\nAction: search\nAction Input: real";
        let result = parse(text).unwrap();
        assert_eq!(
            result,
            ParsedResponse::Action {
                tool: "search".into(),
                input: "real".into()
            }
        );
    }
}
