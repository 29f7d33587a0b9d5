//! Collection of emissions from a whole log.

use std::io::{self, BufRead};

use thiserror::Error;

use crate::emission::{Emission, UNKNOWN_FLOW};
use crate::extract::{Extraction, LineExtractor};

/// Errors reading a log.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The underlying reader failed.
    #[error("failed to read line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// A line whose marker was followed by an undecodable payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-indexed line number.
    pub line: usize,
    /// The line as read, without trailing whitespace.
    pub content: String,
    /// Decoder error message.
    pub reason: String,
}

/// Everything extracted from one log.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Emissions in the order they appear in the log.
    pub emissions: Vec<Emission>,
    /// Lines skipped because their payload did not decode.
    pub malformed: Vec<MalformedLine>,
    /// Number of emissions grouped under [`UNKNOWN_FLOW`] for lack of a
    /// `flow` field.
    pub missing_flow: usize,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }
}

/// Reads `reader` to the end and collects every flow event.
///
/// Lines are split on `\n` and decoded lossily, so invalid UTF-8 never stops
/// collection; only failures of the reader itself are errors. Malformed
/// payloads are logged and recorded in [`Collection::malformed`]. An input
/// without any events yields an empty collection.
pub fn collect<R: BufRead>(extractor: &LineExtractor, reader: R) -> Result<Collection, CollectError> {
    let mut collection = Collection::default();

    for (idx, raw) in reader.split(b'\n').enumerate() {
        let line_number = idx + 1;
        let raw = raw.map_err(|source| CollectError::Io {
            line: line_number,
            source,
        })?;
        // Native code can log arbitrary bytes.
        let raw = raw.strip_suffix(b"\r").unwrap_or(&raw);
        let line = String::from_utf8_lossy(raw);

        match extractor.extract(&line) {
            Extraction::NoMatch => {}
            Extraction::Record(payload) => {
                let emission = Emission::new(payload, line_number);
                if emission.flow().is_none() {
                    tracing::warn!(
                        line = line_number,
                        "flow event without a flow name, grouping under {UNKNOWN_FLOW:?}"
                    );
                    collection.missing_flow += 1;
                }
                collection.emissions.push(emission);
            }
            Extraction::Malformed(err) => {
                let content = line.trim_end().to_string();
                tracing::warn!(line = line_number, %content, error = %err, "failed to parse flow event JSON");
                collection.malformed.push(MalformedLine {
                    line: line_number,
                    content,
                    reason: err.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        emissions = collection.emissions.len(),
        malformed = collection.malformed.len(),
        "collected flow events"
    );

    Ok(collection)
}

/// Collects flow events from an in-memory log.
pub fn collect_str(extractor: &LineExtractor, text: &str) -> Collection {
    // Reading from a byte slice cannot fail.
    collect(extractor, text.as_bytes()).unwrap_or_default()
}
