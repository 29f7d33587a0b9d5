//! Extraction of flow event payloads from single log lines.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Marker the on-device flow monitor writes in front of each event.
pub const DEFAULT_MARKER: &str = "FLOW_EVENT:";

/// Pre-compiled pattern for [`DEFAULT_MARKER`].
static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FLOW_EVENT:(\{.*)").unwrap());

/// Errors building a [`LineExtractor`].
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The marker was empty.
    #[error("event marker cannot be empty")]
    EmptyMarker,

    /// The marker could not be turned into a pattern.
    #[error("invalid event marker {marker:?}: {source}")]
    InvalidMarker {
        marker: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of scanning one line.
#[derive(Debug)]
pub enum Extraction {
    /// The line carries no flow event.
    NoMatch,
    /// A decoded event payload.
    Record(Map<String, Value>),
    /// The marker was present but its payload is not a JSON object.
    Malformed(serde_json::Error),
}

impl Extraction {
    /// Returns the decoded payload, if any.
    pub fn into_record(self) -> Option<Map<String, Value>> {
        match self {
            Self::Record(map) => Some(map),
            Self::NoMatch | Self::Malformed(_) => None,
        }
    }
}

/// Finds `<marker>{...}` in a line and decodes the JSON object.
///
/// Only the first marker on a line is considered. The payload runs from the
/// `{` right after the marker to the last `}` on the line; text after that
/// brace (carriage returns, trailing log noise) is ignored.
#[derive(Debug, Clone)]
pub struct LineExtractor {
    pattern: Regex,
}

impl LineExtractor {
    pub fn new(marker: &str) -> Result<Self, ExtractError> {
        if marker.is_empty() {
            return Err(ExtractError::EmptyMarker);
        }

        let pattern = Regex::new(&format!(r"{}(\{{.*)", regex::escape(marker))).map_err(
            |source| ExtractError::InvalidMarker {
                marker: marker.to_string(),
                source,
            },
        )?;

        Ok(Self { pattern })
    }

    /// Scans a single line.
    pub fn extract(&self, line: &str) -> Extraction {
        let Some(caps) = self.pattern.captures(line) else {
            return Extraction::NoMatch;
        };

        let tail = &caps[1];
        let payload = tail.rfind('}').map_or(tail, |end| &tail[..=end]);

        match serde_json::from_str::<Map<String, Value>>(payload) {
            Ok(map) => Extraction::Record(map),
            Err(err) => Extraction::Malformed(err),
        }
    }
}

impl Default for LineExtractor {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    const LOADING: &str = r#"12-15 23:31:39.730  2459  2459 D FlowRecorder: FLOW_EVENT:{"flow":"cardState","timestamp":1702683099730,"value":"Loading"}"#;

    #[test]
    fn line_without_marker_is_no_match() {
        let extractor = LineExtractor::default();

        for line in [
            "",
            "12-15 23:31:39.731  2459  2459 I ActivityManager: Displayed",
            r#"{"flow":"cardState","timestamp":1}"#,
            "FLOW_EVENT without colon",
        ] {
            assert!(matches!(extractor.extract(line), Extraction::NoMatch), "{line}");
        }
    }

    #[test]
    fn decodes_logcat_line() {
        let record = LineExtractor::default().extract(LOADING).into_record().unwrap();

        assert_eq!(
            Value::Object(record),
            json!({"flow": "cardState", "timestamp": 1_702_683_099_730_i64, "value": "Loading"})
        );
    }

    #[test]
    fn keeps_nested_values_and_unknown_fields() {
        let line = r#"D FlowRecorder: FLOW_EVENT:{"flow":"saveState","timestamp":5,"value":{"ok":[1,2,{"n":null}]},"thread":"main"}"#;
        let record = LineExtractor::default().extract(line).into_record().unwrap();

        assert_eq!(record["value"], json!({"ok": [1, 2, {"n": null}]}));
        assert_eq!(record["thread"], json!("main"));
        let keys: Vec<_> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, ["flow", "timestamp", "value", "thread"]);
    }

    #[test]
    fn ignores_trailing_text_after_last_brace() {
        let line = format!("{LOADING}\r");
        assert!(LineExtractor::default().extract(&line).into_record().is_some());
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let line = r#"D FlowRecorder: FLOW_EVENT:{"flow":"cardState","timestamp":17"#;
        assert!(matches!(
            LineExtractor::default().extract(line),
            Extraction::Malformed(_)
        ));
    }

    #[test]
    fn invalid_json_payload_is_malformed() {
        let line = r#"FLOW_EVENT:{"flow" "cardState"}"#;
        assert!(matches!(
            LineExtractor::default().extract(line),
            Extraction::Malformed(_)
        ));
    }

    #[test]
    fn custom_marker_is_matched_literally() {
        let extractor = LineExtractor::new("EVT(1):").unwrap();

        assert!(
            extractor
                .extract(r#"x EVT(1):{"flow":"a"}"#)
                .into_record()
                .is_some()
        );
        assert!(matches!(
            extractor.extract(r#"x EVT1:{"flow":"a"}"#),
            Extraction::NoMatch
        ));
    }

    #[test]
    fn empty_marker_is_rejected() {
        assert!(matches!(LineExtractor::new(""), Err(ExtractError::EmptyMarker)));
    }
}
