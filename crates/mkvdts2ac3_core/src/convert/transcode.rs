//! The decode|encode pipeline for one track.

use std::process::Command;

use crate::config::ToolSettings;
use crate::models::ConversionJob;
use crate::tools::{RunStatus, ToolResult, ToolRunner};

/// Convert one extracted DTS payload to AC-3.
///
/// The decoder's stdout feeds the encoder's stdin directly; the
/// uncompressed intermediate never touches disk. The encoder reads `-`
/// (its stdin) and writes the job's AC-3 path.
pub fn transcode(
    runner: &ToolRunner,
    tools: &ToolSettings,
    decoder_args: &[String],
    encoder_args: &[String],
    job: &ConversionJob,
) -> ToolResult<RunStatus> {
    let mut decoder = Command::new(&tools.dcadec);
    decoder.args(decoder_args).arg(&job.dts_path);

    let mut encoder = Command::new(&tools.aften);
    encoder.args(encoder_args).arg("-").arg(&job.ac3_path);

    runner.run_piped(&mut decoder, &mut encoder)
}
