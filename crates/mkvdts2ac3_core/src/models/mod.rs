//! Data models for mkvdts2ac3.
//!
//! This module contains the core data structures used throughout the
//! conversion pipeline:
//! - Enums for track types, selection policy, output mode
//! - Media structures (track descriptors, the per-container catalog)
//! - Job structures (conversion jobs, remux plans, batch reports)

mod enums;
mod jobs;
mod media;

pub use enums::{FileStatus, OutputMode, SelectionPolicy, TrackType};
pub use jobs::{BatchSummary, ConversionJob, FileReport, PlanItem, RemuxPlan};
pub use media::{TrackCatalog, TrackDescriptor, AC3_CODEC, DTS_CODEC};
