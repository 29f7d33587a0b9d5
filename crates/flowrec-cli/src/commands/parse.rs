//! Parse command: logcat capture to JSON recording (and optional fixture).

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use flowrec_core::{Collection, LineExtractor, Recording, UNKNOWN_FLOW, collect};

use crate::Config;
use crate::commands::fixture;

/// Printed when a capture holds no flow events.
const NO_EMISSIONS_HELP: &str = "No flow emissions found in logcat

Troubleshooting:
  1. Check if FlowMonitor.kt is integrated
  2. Verify .monitor() is called on flows
  3. Ensure you interacted with monitored features";

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Logcat capture to read.
    pub input: PathBuf,

    /// Recording to write; its file stem becomes the session id.
    pub output: PathBuf,

    /// Also write a Kotlin fixture next to the recording.
    #[arg(long)]
    pub generate_fixture: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ParseArgs, config: &Config) -> Result<()> {
    if !args.input.exists() {
        bail!("input file not found: {}", args.input.display());
    }

    writeln!(writer, "Reading logcat from: {}", args.input.display())?;

    let collection = read_capture(&args.input, &config.marker)?;
    if collection.is_empty() {
        bail!(NO_EMISSIONS_HELP);
    }

    let session_id = session_id(&args.output)?;
    let Collection {
        emissions,
        malformed,
        missing_flow,
    } = collection;
    let recording = Recording::assemble(emissions, session_id);

    write_recording(&args.output, &recording)?;

    let stats = &recording.statistics;
    writeln!(
        writer,
        "Parsed {} emissions from {} flows",
        stats.total_emissions(),
        stats.flow_count()
    )?;
    writeln!(writer, "Duration: {}ms", stats.duration_ms())?;
    writeln!(writer, "Saved to: {}", args.output.display())?;

    if args.generate_fixture {
        let fixture_path = args.output.with_extension("kt");
        fixture::write_fixture(&fixture_path, &recording, &config.fixture_package)?;
        writeln!(writer, "Generated Kotlin fixture: {}", fixture_path.display())?;
        writeln!(
            writer,
            "   Copy this to: {}/",
            config.fixture_source_dir().display()
        )?;
    }

    if !malformed.is_empty() {
        writeln!(
            writer,
            "Skipped {} line(s) with malformed JSON (first at line {})",
            malformed.len(),
            malformed[0].line
        )?;
    }
    if missing_flow > 0 {
        writeln!(
            writer,
            "{missing_flow} emission(s) had no flow name and were grouped under {UNKNOWN_FLOW:?}"
        )?;
    }

    if let Some(summary) = stats.summary() {
        writeln!(writer)?;
        writeln!(writer, "Emissions by flow:")?;
        for (flow, count) in summary.emissions_by_flow.iter() {
            writeln!(writer, "   {flow}: {count} emissions")?;
        }
    }

    Ok(())
}

fn read_capture(path: &Path, marker: &str) -> Result<Collection> {
    let extractor = LineExtractor::new(marker).context("invalid marker in configuration")?;
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let collection = collect(&extractor, BufReader::new(file))
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(collection)
}

fn session_id(output: &Path) -> Result<String> {
    output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .with_context(|| format!("cannot derive a session id from {}", output.display()))
}

fn write_recording(path: &Path, recording: &Recording) -> Result<()> {
    let mut json = serde_json::to_string_pretty(recording).context("failed to encode recording")?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use serde_json::Value;

    const CAPTURE: &str = r#"12-15 23:31:39.730  2459  2459 D FlowRecorder: FLOW_EVENT:{"flow":"cardState","timestamp":1702683099730,"value":"Loading"}
12-15 23:31:39.731  2459  2459 I ActivityTaskManager: Displayed protect.card_locker/.LoyaltyCardEditActivity
12-15 23:31:39.830  2459  2459 D FlowRecorder: FLOW_EVENT:{"flow":"cardState","timestamp":1702683099830,"value":"Loaded"}
"#;

    fn args(dir: &Path, input: &str, generate_fixture: bool) -> ParseArgs {
        let input_path = dir.join("logcat.txt");
        fs::write(&input_path, input).unwrap();
        ParseArgs {
            input: input_path,
            output: dir.join("card_session.json"),
            generate_fixture,
        }
    }

    fn run_to_string(args: &ParseArgs) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, args, &Config::default())?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn writes_recording_and_summary() {
        let temp = tempfile::tempdir().unwrap();
        let args = args(temp.path(), CAPTURE, false);

        let output = run_to_string(&args).unwrap();
        let output = output.replace(&temp.path().display().to_string(), "[TEMP]");

        assert_snapshot!(output, @r"
        Reading logcat from: [TEMP]/logcat.txt
        Parsed 2 emissions from 1 flows
        Duration: 100ms
        Saved to: [TEMP]/card_session.json

        Emissions by flow:
           cardState: 2 emissions
        ");

        let recording: Value =
            serde_json::from_str(&fs::read_to_string(&args.output).unwrap()).unwrap();
        assert_eq!(recording["meta"]["sessionId"], "card_session");
        assert_eq!(recording["statistics"]["durationMs"], 100);
        assert_eq!(recording["emissions"][1]["_logLine"], 3);
        assert!(!args.output.with_extension("kt").exists());
    }

    #[test]
    fn generates_fixture_on_request() {
        let temp = tempfile::tempdir().unwrap();
        let args = args(temp.path(), CAPTURE, true);

        let output = run_to_string(&args).unwrap();

        let fixture = fs::read_to_string(temp.path().join("card_session.kt")).unwrap();
        assert!(fixture.contains("object Card_SessionFixture {"));
        assert!(fixture.contains("val cardStateEmissions = listOf("));
        assert!(output.contains("Copy this to: app/src/test/java/protect/card_locker/fixtures/"));
    }

    #[test]
    fn malformed_lines_do_not_abort() {
        let temp = tempfile::tempdir().unwrap();
        let capture = format!(
            "D FlowRecorder: FLOW_EVENT:{{\"flow\":\"cardState\",\"timestamp\":1\n{CAPTURE}"
        );
        let args = args(temp.path(), &capture, false);

        let output = run_to_string(&args).unwrap();

        assert!(output.contains("Parsed 2 emissions from 1 flows"), "{output}");
        assert!(output.contains("Skipped 1 line(s) with malformed JSON (first at line 1)"));
    }

    #[test]
    fn reports_emissions_without_flow() {
        let temp = tempfile::tempdir().unwrap();
        let capture = format!("FLOW_EVENT:{{\"timestamp\":5,\"value\":1}}\n{CAPTURE}");
        let args = args(temp.path(), &capture, false);

        let output = run_to_string(&args).unwrap();

        assert!(output.contains(r#"1 emission(s) had no flow name and were grouped under "unknown""#));
        assert!(output.contains("   unknown: 1 emissions"));
    }

    #[test]
    fn empty_capture_is_an_error_with_guidance() {
        let temp = tempfile::tempdir().unwrap();
        let args = args(temp.path(), "nothing to see here\n", false);

        let err = run_to_string(&args).unwrap_err();

        assert!(err.to_string().starts_with("No flow emissions found in logcat"));
        assert!(err.to_string().contains("Verify .monitor() is called on flows"));
        assert!(!args.output.exists());
    }

    #[test]
    fn missing_input_is_reported_before_parsing() {
        let temp = tempfile::tempdir().unwrap();
        let args = ParseArgs {
            input: temp.path().join("absent.txt"),
            output: temp.path().join("out.json"),
            generate_fixture: false,
        };

        let mut output = Vec::new();
        let err = run(&mut output, &args, &Config::default()).unwrap_err();

        assert!(err.to_string().starts_with("input file not found"));
        assert!(output.is_empty());
    }
}
