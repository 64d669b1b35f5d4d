//! Job-related data structures (conversion jobs, remux plans, reports).

use std::collections::BTreeSet;
use std::path::PathBuf;

use super::enums::{FileStatus, OutputMode};
use super::media::TrackDescriptor;

/// One selected DTS track and the files its conversion goes through.
///
/// The temp paths derive deterministically from the container title and the
/// track id; `delay_ms` is filled in after timecode extraction (the catalog
/// cannot know the true delay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// The source track being converted.
    pub track: TrackDescriptor,
    /// Extracted timecodes file (`<title>.<id>.tc`).
    pub tc_path: PathBuf,
    /// Extracted raw DTS payload (`<title>.<id>.dts`).
    pub dts_path: PathBuf,
    /// Encoded AC-3 output (`<title>.<id>.ac3`).
    pub ac3_path: PathBuf,
    /// Delay recovered from the timecodes, in milliseconds.
    pub delay_ms: i64,
    /// Keep the extracted DTS file after encoding.
    pub keep_dts: bool,
    /// Size of the extracted DTS payload, once known.
    pub dts_size: Option<u64>,
    /// Size of the encoded AC-3 file, once known.
    pub ac3_size: Option<u64>,
}

impl ConversionJob {
    /// Create a job for a track with its derived temp paths.
    pub fn new(
        track: TrackDescriptor,
        tc_path: PathBuf,
        dts_path: PathBuf,
        ac3_path: PathBuf,
        keep_dts: bool,
    ) -> Self {
        Self {
            track,
            tc_path,
            dts_path,
            ac3_path,
            delay_ms: 0,
            keep_dts,
            dts_size: None,
            ac3_size: None,
        }
    }

    /// Set the recovered delay.
    pub fn with_delay(mut self, delay_ms: i64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Track id of the source track.
    pub fn track_id(&self) -> u64 {
        self.track.id
    }
}

/// A single item in the remux plan (one new AC-3 track).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    /// The conversion job supplying the AC-3 file.
    pub job: ConversionJob,
    /// Whether this track gets the default flag in the output.
    pub is_default: bool,
    /// Resolved name for the new track, when one applies.
    pub track_name: Option<String>,
}

impl PlanItem {
    /// Create a plan item for a job.
    pub fn new(job: ConversionJob) -> Self {
        Self {
            job,
            is_default: false,
            track_name: None,
        }
    }

    /// Set as default track.
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Set the name the new track carries in the output.
    pub fn with_track_name(mut self, name: impl Into<String>) -> Self {
        self.track_name = Some(name.into());
        self
    }
}

/// The remux decision for one container.
///
/// Invariant: at most one item carries `is_default = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemuxPlan {
    /// New AC-3 tracks in selection order.
    pub items: Vec<PlanItem>,
    /// Audio tracks of the original to keep when dropping its DTS tracks.
    /// `None` means all original tracks are kept (no audio directive at
    /// all); `Some` with an empty set means drop every original audio track.
    pub retained_audio_ids: Option<BTreeSet<u64>>,
    /// Where the result ends up.
    pub output_mode: OutputMode,
}

impl RemuxPlan {
    /// Number of items flagged as default (0 or 1 by construction).
    pub fn default_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_default).count()
    }

    /// Whether a remux command is needed at all.
    pub fn needs_remux(&self) -> bool {
        self.output_mode != OutputMode::ExternalOnly
    }
}

/// Outcome of one input file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// The input container path.
    pub input: PathBuf,
    /// Final status.
    pub status: FileStatus,
    /// Skip reason or failure message.
    pub detail: Option<String>,
    /// Delivered output (the remuxed container), when one was produced.
    pub output: Option<PathBuf>,
    /// Number of tracks converted.
    pub tracks_converted: usize,
}

impl FileReport {
    /// Report a successful conversion.
    pub fn converted(input: PathBuf, output: Option<PathBuf>, tracks: usize) -> Self {
        Self {
            input,
            status: FileStatus::Converted,
            detail: None,
            output,
            tracks_converted: tracks,
        }
    }

    /// Report a skipped file with a reason.
    pub fn skipped(input: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            input,
            status: FileStatus::Skipped,
            detail: Some(reason.into()),
            output: None,
            tracks_converted: 0,
        }
    }

    /// Report a failed file with the error message.
    pub fn failed(input: PathBuf, message: impl Into<String>) -> Self {
        Self {
            input,
            status: FileStatus::Failed,
            detail: Some(message.into()),
            output: None,
            tracks_converted: 0,
        }
    }
}

/// Results of a whole batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Per-file reports in input order.
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file's report.
    pub fn push(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    /// Number of files with the given status.
    fn count(&self, status: FileStatus) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }

    /// Files converted successfully.
    pub fn converted(&self) -> usize {
        self.count(FileStatus::Converted)
    }

    /// Files skipped.
    pub fn skipped(&self) -> usize {
        self.count(FileStatus::Skipped)
    }

    /// Files that failed.
    pub fn failed(&self) -> usize {
        self.count(FileStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TrackType, DTS_CODEC};

    fn make_job(id: u64) -> ConversionJob {
        let track = TrackDescriptor::new(id, TrackType::Audio, DTS_CODEC);
        ConversionJob::new(
            track,
            PathBuf::from(format!("/tmp/movie.{}.tc", id)),
            PathBuf::from(format!("/tmp/movie.{}.dts", id)),
            PathBuf::from(format!("/tmp/movie.{}.ac3", id)),
            false,
        )
    }

    #[test]
    fn plan_counts_defaults() {
        let plan = RemuxPlan {
            items: vec![
                PlanItem::new(make_job(2)).with_default(true),
                PlanItem::new(make_job(4)),
            ],
            retained_audio_ids: None,
            output_mode: OutputMode::InPlaceReplace,
        };
        assert_eq!(plan.default_count(), 1);
        assert!(plan.needs_remux());
    }

    #[test]
    fn external_plan_needs_no_remux() {
        let plan = RemuxPlan {
            items: vec![PlanItem::new(make_job(2))],
            retained_audio_ids: None,
            output_mode: OutputMode::ExternalOnly,
        };
        assert!(!plan.needs_remux());
    }

    #[test]
    fn summary_counts_by_status() {
        let mut summary = BatchSummary::new();
        summary.push(FileReport::converted(PathBuf::from("a.mkv"), None, 1));
        summary.push(FileReport::skipped(PathBuf::from("b.mkv"), "already AC-3"));
        summary.push(FileReport::failed(PathBuf::from("c.mkv"), "no DTS tracks"));

        assert_eq!(summary.converted(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 1);
    }
}
