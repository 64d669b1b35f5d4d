//! Core enums used throughout the pipeline.

use std::str::FromStr;

/// Type of media track, as reported by the container inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackType {
    Video,
    Audio,
    Subtitles,
}

impl std::fmt::Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackType::Video => write!(f, "video"),
            TrackType::Audio => write!(f, "audio"),
            TrackType::Subtitles => write!(f, "subtitles"),
        }
    }
}

impl FromStr for TrackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(TrackType::Video),
            "audio" => Ok(TrackType::Audio),
            "subtitles" => Ok(TrackType::Subtitles),
            other => Err(format!("unknown track type '{}'", other)),
        }
    }
}

/// How DTS tracks are chosen from a container's catalog.
///
/// Exactly one policy applies per run. An explicitly named track id wins
/// over `AllDts` when both are configured (with a warning, never an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Convert exactly the named track id.
    Explicit(u64),
    /// Convert every DTS track, in ascending id order.
    AllDts,
    /// Convert the lowest-id DTS track only.
    FirstDts,
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionPolicy::Explicit(id) => write!(f, "explicit track {}", id),
            SelectionPolicy::AllDts => write!(f, "all DTS tracks"),
            SelectionPolicy::FirstDts => write!(f, "first DTS track"),
        }
    }
}

/// Where the conversion result ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Remux and overwrite the original container.
    InPlaceReplace,
    /// Remux into a new `<title>.new.mkv` next to the original.
    AdjacentNewFile,
    /// No remux; deliver standalone AC-3 files next to the original.
    ExternalOnly,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::InPlaceReplace => write!(f, "replace original"),
            OutputMode::AdjacentNewFile => write!(f, "new adjacent file"),
            OutputMode::ExternalOnly => write!(f, "external AC-3 files"),
        }
    }
}

/// Final status of one input file after the batch ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Tracks were converted and delivered.
    Converted,
    /// Nothing to do (e.g. an AC-3 track already present).
    Skipped,
    /// Processing failed; the file was left alone.
    Failed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Converted => write!(f, "converted"),
            FileStatus::Skipped => write!(f, "skipped"),
            FileStatus::Failed => write!(f, "failed"),
        }
    }
}
