//! The recording document written for each captured session.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::emission::Emission;
use crate::group::FlowGroups;
use crate::stats::Statistics;

/// Tool name stamped into every recording.
pub const TOOL_NAME: &str = "flow-recorder";

/// Recording format version.
pub const FORMAT_VERSION: &str = "1.0";

/// Recording metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub session_id: String,
    /// When the recording was assembled (not when the events happened).
    pub recorded_at: String,
    pub tool: String,
    pub version: String,
}

/// A full capture of one observation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub meta: Meta,
    #[serde(default)]
    pub statistics: Statistics,
    /// Emissions in log order.
    pub emissions: Vec<Emission>,
}

impl Recording {
    /// Assembles a recording stamped with the current time.
    pub fn assemble(emissions: Vec<Emission>, session_id: impl Into<String>) -> Self {
        Self::assemble_at(emissions, session_id, Utc::now())
    }

    /// Assembles a recording stamped with `recorded_at`.
    pub fn assemble_at(
        emissions: Vec<Emission>,
        session_id: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let statistics = Statistics::summarize(&emissions);

        Self {
            meta: Meta {
                session_id: session_id.into(),
                recorded_at: recorded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                tool: TOOL_NAME.to_string(),
                version: FORMAT_VERSION.to_string(),
            },
            statistics,
            emissions,
        }
    }

    /// Groups this recording's emissions by flow.
    pub fn flow_groups(&self) -> FlowGroups<'_> {
        FlowGroups::new(&self.emissions)
    }
}
