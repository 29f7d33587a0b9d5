//! Core pipeline for the flow recorder.
//!
//! This crate turns logcat output from the in-app flow monitor into a
//! recording:
//! - Extraction: finding `FLOW_EVENT:{...}` payloads in log lines
//! - Collection: gathering emissions in log order with their line numbers
//! - Grouping and statistics over the collected emissions
//! - Fixture rendering: Kotlin test fixtures from a recording

mod collect;
pub mod emission;
mod extract;
pub mod fixture;
mod group;
pub mod recording;
mod stats;

pub use collect::{Collection, CollectError, MalformedLine, collect, collect_str};
pub use emission::{Emission, UNKNOWN_FLOW};
pub use extract::{DEFAULT_MARKER, ExtractError, Extraction, LineExtractor};
pub use fixture::{DEFAULT_FIXTURE_PACKAGE, FixtureError, FixtureRenderer};
pub use group::FlowGroups;
pub use recording::{Meta, Recording};
pub use stats::{FlowCounts, Statistics, Summary};
