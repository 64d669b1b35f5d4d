//! Timecode and payload extraction via mkvextract.
//!
//! Both extraction passes are batched: every selected track is handed to
//! one mkvextract invocation as `id:path` specs, so a container is read
//! once per pass regardless of how many tracks are converted.

use std::fs;
use std::path::Path;
use std::process::Command;

use super::types::{ExtractionError, ExtractionResult};
use crate::tools::ToolRunner;

/// Extract per-frame timecodes (v2 format) for several tracks in one pass.
///
/// Specs pair a track id with its destination `.tc` file.
pub fn extract_timecodes(
    runner: &ToolRunner,
    mkvextract: &str,
    input: &Path,
    specs: &[(u64, &Path)],
) -> ExtractionResult<()> {
    run_mkvextract(runner, mkvextract, "timecodes_v2", input, specs)
}

/// Extract raw track payloads for several tracks in one pass.
pub fn extract_payloads(
    runner: &ToolRunner,
    mkvextract: &str,
    input: &Path,
    specs: &[(u64, &Path)],
) -> ExtractionResult<()> {
    run_mkvextract(runner, mkvextract, "tracks", input, specs)
}

fn run_mkvextract(
    runner: &ToolRunner,
    mkvextract: &str,
    mode: &str,
    input: &Path,
    specs: &[(u64, &Path)],
) -> ExtractionResult<()> {
    if specs.is_empty() {
        return Ok(());
    }

    let mut cmd = Command::new(mkvextract);
    cmd.arg(mode).arg(input);
    for (id, path) in specs {
        cmd.arg(format!("{}:{}", id, path.display()));
    }

    runner.run(&mut cmd)?;
    Ok(())
}

/// Recover a track's delay from its extracted timecode file.
///
/// The v2 format puts a header on the first line; the first real timecode
/// follows on the second. That value, rounded to whole milliseconds, is the
/// track's delay. Negative values clamp to zero.
pub fn read_delay_millis(tc_path: &Path) -> ExtractionResult<i64> {
    let content = fs::read_to_string(tc_path).map_err(|e| ExtractionError::BadTimecodeFile {
        path: tc_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let Some(line) = content.lines().nth(1) else {
        return Err(ExtractionError::BadTimecodeFile {
            path: tc_path.to_path_buf(),
            reason: "missing first timecode line".to_string(),
        });
    };

    let millis: f64 = line
        .trim()
        .parse()
        .map_err(|_| ExtractionError::BadTimecodeFile {
            path: tc_path.to_path_buf(),
            reason: format!("not a timecode: {:?}", line.trim()),
        })?;

    Ok((millis.round() as i64).max(0))
}
