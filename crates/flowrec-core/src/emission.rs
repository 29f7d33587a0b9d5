//! Flow emissions captured from logcat output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flow name used for emissions whose payload carries no `flow` field.
pub const UNKNOWN_FLOW: &str = "unknown";

/// Key under which the source line number is serialized.
pub const LOG_LINE_KEY: &str = "_logLine";

/// One value observed on a monitored flow.
///
/// The decoded payload is kept verbatim (field order included) so that
/// fields the recorder does not interpret still reach the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    #[serde(flatten)]
    payload: Map<String, Value>,

    /// 1-indexed line of the source log this emission was read from.
    #[serde(rename = "_logLine")]
    log_line: usize,
}

impl Emission {
    /// Creates an emission from a decoded payload and its source line.
    ///
    /// A `_logLine` key already present in the payload is replaced by
    /// `log_line`.
    pub fn new(mut payload: Map<String, Value>, log_line: usize) -> Self {
        payload.remove(LOG_LINE_KEY);
        Self { payload, log_line }
    }

    /// The flow name, if the payload has a string `flow` field.
    pub fn flow(&self) -> Option<&str> {
        self.payload.get("flow").and_then(Value::as_str)
    }

    /// The flow name, falling back to [`UNKNOWN_FLOW`].
    pub fn flow_or_unknown(&self) -> &str {
        self.flow().unwrap_or(UNKNOWN_FLOW)
    }

    /// Milliseconds since the epoch, as reported by the device.
    pub fn timestamp(&self) -> Option<i64> {
        self.payload.get("timestamp").and_then(Value::as_i64)
    }

    /// The emitted value.
    pub fn value(&self) -> Option<&Value> {
        self.payload.get("value")
    }

    /// The full decoded payload, without the line annotation.
    pub const fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub const fn log_line(&self) -> usize {
        self.log_line
    }
}
