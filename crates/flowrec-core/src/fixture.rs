//! Kotlin test fixture generation from a recording.
//!
//! The output is plain text meant to be dropped into the app's unit test
//! sources. Nothing here checks that it compiles; string contents are
//! escaped so that recorded values cannot break out of their literals.

use std::collections::HashSet;
use std::fmt::{self, Write};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::emission::Emission;
use crate::recording::Recording;

/// Package the generated fixture declares unless configured otherwise.
pub const DEFAULT_FIXTURE_PACKAGE: &str = "protect.card_locker.fixtures";

/// Indentation of the embedded JSON block.
const JSON_INDENT: &[u8] = b"        ";

/// Errors rendering a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The emissions could not be serialized.
    #[error("failed to serialize emissions: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the output failed.
    #[error("failed to write fixture: {0}")]
    Format(#[from] fmt::Error),
}

/// Renders recordings as Kotlin `object` fixtures.
#[derive(Debug, Clone)]
pub struct FixtureRenderer {
    package: String,
}

impl Default for FixtureRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_PACKAGE)
    }
}

impl FixtureRenderer {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }

    /// Renders `recording` as Kotlin source.
    ///
    /// The fixture holds the whole emission list as a JSON text block plus
    /// one `<flow>Emissions` list per flow with each value and its timestamp.
    pub fn render(&self, recording: &Recording) -> Result<String, FixtureError> {
        let mut out = String::new();
        let groups = recording.flow_groups();
        let flows: Vec<_> = groups.flows().map(comment_safe).collect();

        writeln!(out, "// Auto-generated test fixture")?;
        writeln!(out, "// Session: {}", comment_safe(&recording.meta.session_id))?;
        writeln!(out, "// Recorded: {}", comment_safe(&recording.meta.recorded_at))?;
        writeln!(out, "// DO NOT EDIT - Regenerate by recording a new session")?;
        writeln!(out)?;
        writeln!(out, "package {}", self.package)?;
        writeln!(out)?;
        writeln!(out, "/**")?;
        writeln!(out, " * Recorded flow emissions from a real user interaction session")?;
        writeln!(out, " *")?;
        writeln!(out, " * Statistics:")?;
        writeln!(
            out,
            " * - Total emissions: {}",
            recording.statistics.total_emissions()
        )?;
        writeln!(out, " * - Duration: {}ms", recording.statistics.duration_ms())?;
        writeln!(out, " * - Flows captured: {}", flows.join(", "))?;
        writeln!(out, " */")?;
        writeln!(
            out,
            "object {}Fixture {{",
            object_name(&recording.meta.session_id)
        )?;
        writeln!(out)?;
        writeln!(out, "    // Raw emission data as JSON strings")?;
        writeln!(out, "    // Parse these in your tests to recreate the flow sequence")?;
        writeln!(out, "    val emissions = \"\"\"")?;
        writeln!(out, "{}", raw_string_body(&pretty_json(&recording.emissions)?))?;
        writeln!(out, "    \"\"\".trimIndent()")?;

        let mut taken = HashSet::new();
        for (flow, emissions) in groups.iter() {
            writeln!(out)?;
            writeln!(
                out,
                "    // {} emissions from {}",
                emissions.len(),
                comment_safe(flow)
            )?;
            writeln!(
                out,
                "    val {}Emissions = listOf(",
                unique_identifier(flow, &mut taken)
            )?;
            for (i, emission) in emissions.iter().enumerate() {
                let comma = if i + 1 < emissions.len() { "," } else { "" };
                writeln!(
                    out,
                    "        {}{comma}  // t={}",
                    value_literal(emission)?,
                    emission
                        .timestamp()
                        .map_or_else(|| "?".to_string(), |ts| ts.to_string())
                )?;
            }
            writeln!(out, "    )")?;
        }

        writeln!(out, "}}")?;
        Ok(out)
    }
}

/// Serializes with the fixture's 8-space indentation.
fn pretty_json(emissions: &[Emission]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    emissions.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Kotlin literal for one emission's value.
///
/// Objects and arrays become compact JSON in a raw string; everything else
/// becomes a regular string literal.
fn value_literal(emission: &Emission) -> Result<String, serde_json::Error> {
    Ok(match emission.value() {
        Some(value @ (Value::Object(_) | Value::Array(_))) => {
            format!("\"\"\"{}\"\"\"", raw_string_body(&serde_json::to_string(value)?))
        }
        Some(Value::String(s)) => format!("\"{}\"", escape_string(s)),
        Some(other) => format!("\"{other}\""),
        None => "\"null\"".to_string(),
    })
}

/// Escapes text for a Kotlin `"..."` literal.
fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Raw strings have no escapes; only `$` templates need neutralizing.
fn raw_string_body(s: &str) -> String {
    s.replace('$', "${'$'}")
}

/// Keeps text on one line and unable to close a block comment.
fn comment_safe(s: &str) -> String {
    s.replace(['\n', '\r'], " ").replace("*/", "* /")
}

/// Maps arbitrary text to a Kotlin identifier.
fn kotlin_identifier(raw: &str) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// [`kotlin_identifier`], suffixed with `_2`, `_3`, ... when flows with
/// different names sanitize to the same identifier.
fn unique_identifier(raw: &str, taken: &mut HashSet<String>) -> String {
    let base = kotlin_identifier(raw);
    let mut ident = base.clone();
    let mut n = 2;
    while !taken.insert(ident.clone()) {
        ident = format!("{base}_{n}");
        n += 1;
    }
    ident
}

/// Title-cases the session id for the fixture object name.
///
/// A letter following a non-letter is upper-cased and every other letter is
/// lower-cased, so `flow-recording_1a` becomes `Flow_Recording_1A`.
fn object_name(session_id: &str) -> String {
    let mut name = String::with_capacity(session_id.len());
    let mut after_letter = false;
    for c in session_id.chars() {
        if c.is_alphabetic() {
            if after_letter {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            name.push(c);
            after_letter = false;
        }
    }
    kotlin_identifier(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Utc};

    use crate::collect::collect_str;
    use crate::extract::LineExtractor;

    fn recording(log: &str, session_id: &str) -> Recording {
        let emissions = collect_str(&LineExtractor::default(), log).emissions;
        let recorded_at = DateTime::parse_from_rfc3339("2025-12-15T23:32:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        Recording::assemble_at(emissions, session_id, recorded_at)
    }

    #[test]
    fn renders_fixture() {
        let log = r#"FLOW_EVENT:{"flow":"cardState","timestamp":100,"value":"Loading"}
FLOW_EVENT:{"flow":"saveState","timestamp":150,"value":{"id":1,"price":"$5"}}
FLOW_EVENT:{"flow":"cardState","timestamp":200,"value":"Say \"hi\""}"#;
        let fixture = FixtureRenderer::default()
            .render(&recording(log, "flow-recording-demo"))
            .unwrap();

        insta::assert_snapshot!(fixture, @r#"
// Auto-generated test fixture
// Session: flow-recording-demo
// Recorded: 2025-12-15T23:32:00.000Z
// DO NOT EDIT - Regenerate by recording a new session

package protect.card_locker.fixtures

/**
 * Recorded flow emissions from a real user interaction session
 *
 * Statistics:
 * - Total emissions: 3
 * - Duration: 100ms
 * - Flows captured: cardState, saveState
 */
object Flow_Recording_DemoFixture {

    // Raw emission data as JSON strings
    // Parse these in your tests to recreate the flow sequence
    val emissions = """
[
        {
                "flow": "cardState",
                "timestamp": 100,
                "value": "Loading",
                "_logLine": 1
        },
        {
                "flow": "saveState",
                "timestamp": 150,
                "value": {
                        "id": 1,
                        "price": "${'$'}5"
                },
                "_logLine": 2
        },
        {
                "flow": "cardState",
                "timestamp": 200,
                "value": "Say \"hi\"",
                "_logLine": 3
        }
]
    """.trimIndent()

    // 2 emissions from cardState
    val cardStateEmissions = listOf(
        "Loading",  // t=100
        "Say \"hi\""  // t=200
    )

    // 1 emissions from saveState
    val saveStateEmissions = listOf(
        """{"id":1,"price":"${'$'}5"}"""  // t=150
    )
}
"#);
    }

    #[test]
    fn scalar_values_are_quoted_as_text() {
        let log = r#"FLOW_EVENT:{"flow":"counter","timestamp":1,"value":42}
FLOW_EVENT:{"flow":"counter","timestamp":2,"value":true}
FLOW_EVENT:{"flow":"counter","timestamp":3,"value":null}
FLOW_EVENT:{"flow":"counter","timestamp":4}"#;
        let fixture = FixtureRenderer::default().render(&recording(log, "s")).unwrap();

        assert!(fixture.contains("        \"42\",  // t=1\n"), "{fixture}");
        assert!(fixture.contains("        \"true\",  // t=2\n"), "{fixture}");
        assert!(fixture.contains("        \"null\",  // t=3\n"), "{fixture}");
        assert!(fixture.contains("        \"null\"  // t=4\n"), "{fixture}");
    }

    #[test]
    fn arrays_are_embedded_as_raw_json() {
        let log = r#"FLOW_EVENT:{"flow":"groups","timestamp":9,"value":["a","b"]}"#;
        let fixture = FixtureRenderer::default().render(&recording(log, "s")).unwrap();

        assert!(fixture.contains(r#"        """["a","b"]"""  // t=9"#), "{fixture}");
    }

    #[test]
    fn flow_names_become_identifiers() {
        assert_eq!(kotlin_identifier("cardState"), "cardState");
        assert_eq!(kotlin_identifier("card-state.v2"), "card_state_v2");
        assert_eq!(kotlin_identifier("2fa"), "_2fa");
        assert_eq!(kotlin_identifier(""), "_");
    }

    #[test]
    fn colliding_flow_names_get_distinct_lists() {
        let log = r#"FLOW_EVENT:{"flow":"card-state","timestamp":1,"value":"a"}
FLOW_EVENT:{"flow":"card.state","timestamp":2,"value":"b"}
FLOW_EVENT:{"flow":"card_state_2","timestamp":3,"value":"c"}"#;
        let fixture = FixtureRenderer::default().render(&recording(log, "s")).unwrap();

        assert_eq!(fixture.matches("val card_stateEmissions = ").count(), 1, "{fixture}");
        assert_eq!(fixture.matches("val card_state_2Emissions = ").count(), 1, "{fixture}");
        assert_eq!(fixture.matches("val card_state_2_2Emissions = ").count(), 1, "{fixture}");
        assert!(fixture.contains("    // 1 emissions from card.state\n    val card_state_2Emissions"));
    }

    #[test]
    fn object_name_is_title_cased() {
        assert_eq!(
            object_name("flow_recording_20251219_021109"),
            "Flow_Recording_20251219_021109"
        );
        assert_eq!(object_name("card-CREATE"), "Card_Create");
        assert_eq!(object_name("2nd session"), "_2Nd_Session");
    }

    #[test]
    fn string_escapes_cover_templates_and_quotes() {
        assert_eq!(escape_string(r#"a"b\c$d"#), r#"a\"b\\c\$d"#);
        assert_eq!(escape_string("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn missing_timestamp_is_marked() {
        let fixture = FixtureRenderer::default()
            .render(&recording(r#"FLOW_EVENT:{"flow":"a","value":"x"}"#, "s"))
            .unwrap();

        assert!(fixture.contains("\"x\"  // t=?"), "{fixture}");
    }

    #[test]
    fn uses_configured_package() {
        let fixture = FixtureRenderer::new("com.example.fixtures")
            .render(&recording(r#"FLOW_EVENT:{"flow":"a","timestamp":1}"#, "s"))
            .unwrap();

        assert!(fixture.contains("\npackage com.example.fixtures\n"));
    }
}
