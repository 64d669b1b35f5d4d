//! Remux plan construction.
//!
//! Shapes the [`RemuxPlan`] for one container from its conversion jobs and
//! the run options. Conflicting options were rejected before any file was
//! touched, so plan construction itself cannot fail.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::RunOptions;
use crate::logging::JobLog;
use crate::models::{ConversionJob, OutputMode, PlanItem, RemuxPlan, TrackCatalog};

/// Where the remux output of a container goes before delivery.
pub fn remux_output_path(working_dir: &Path, title: &str) -> PathBuf {
    working_dir.join(format!("{}.new.mkv", title))
}

/// Build the remux plan for one container.
pub fn build_remux_plan(
    catalog: &TrackCatalog,
    jobs: Vec<ConversionJob>,
    opts: &RunOptions,
    log: &JobLog,
) -> RemuxPlan {
    let output_mode = opts.output_mode();

    // Audio retention applies only when the original DTS tracks leave the
    // container. The retained set is every catalog audio track that was not
    // selected for conversion; ascending order comes with the set.
    let retained_audio_ids = if opts.removes_dts() && output_mode != OutputMode::ExternalOnly {
        let selected: BTreeSet<u64> = jobs.iter().map(|j| j.track_id()).collect();
        let retained: BTreeSet<u64> = catalog
            .audio_tracks()
            .map(|t| t.id)
            .filter(|id| !selected.contains(id))
            .collect();
        Some(retained)
    } else {
        None
    };

    let single = jobs.len() == 1;
    let remuxing = output_mode != OutputMode::ExternalOnly;
    if opts.custom_title.is_some() && !single && remuxing {
        log.warn("--custom applies to single-track conversions only; using source track names");
    }

    let items: Vec<PlanItem> = jobs
        .into_iter()
        .enumerate()
        .map(|(index, job)| {
            let name = effective_track_name(&job, single, opts);
            let mut item = PlanItem::new(job).with_default(opts.mark_default && remuxing && index == 0);
            if let Some(name) = name {
                item = item.with_track_name(name);
            }
            item
        })
        .collect();

    RemuxPlan {
        items,
        retained_audio_ids,
        output_mode,
    }
}

/// Name the new AC-3 track carries: a custom title wins on single-track
/// conversions; otherwise the source track's own name, when it has one.
fn effective_track_name(job: &ConversionJob, single: bool, opts: &RunOptions) -> Option<String> {
    if single {
        if let Some(title) = &opts.custom_title {
            return Some(title.clone());
        }
    }
    if !job.track.name.is_empty() {
        return Some(job.track.name.clone());
    }
    None
}
