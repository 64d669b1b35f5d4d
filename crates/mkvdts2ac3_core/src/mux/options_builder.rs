//! mkvmerge command options builder.
//!
//! Builds the command-line tokens for the remux invocation from a
//! [`RemuxPlan`]. Token order follows the shape mkvmerge expects: global
//! options, audio retention, the original file, then one directive group
//! per appended AC-3 input.

use std::path::Path;

use crate::config::RunOptions;
use crate::models::{PlanItem, RemuxPlan};

/// Builder for mkvmerge command-line options.
///
/// Generates a list of string tokens that form a complete mkvmerge command
/// (everything after the program name).
pub struct MkvmergeOptionsBuilder<'a> {
    plan: &'a RemuxPlan,
    opts: &'a RunOptions,
    original: &'a Path,
    output: &'a Path,
}

impl<'a> MkvmergeOptionsBuilder<'a> {
    /// Create a new options builder.
    pub fn new(
        plan: &'a RemuxPlan,
        opts: &'a RunOptions,
        original: &'a Path,
        output: &'a Path,
    ) -> Self {
        Self {
            plan,
            opts,
            original,
            output,
        }
    }

    /// Build the complete mkvmerge token list.
    pub fn build(&self) -> Vec<String> {
        let mut tokens = vec!["-q".to_string()];

        self.add_track_order(&mut tokens);

        tokens.push("-o".to_string());
        tokens.push(self.output.to_string_lossy().to_string());

        self.add_audio_retention(&mut tokens);

        tokens.push(self.original.to_string_lossy().to_string());

        for item in &self.plan.items {
            self.add_job_options(&mut tokens, item);
        }

        tokens
    }

    /// Put the new AC-3 tracks ahead of everything from the original.
    ///
    /// The original container is input 0; each appended AC-3 file is one
    /// input holding a single track, so the order entries are `1:0`, `2:0`
    /// and so on, one per plan item.
    fn add_track_order(&self, tokens: &mut Vec<String>) {
        if !self.opts.initial_order || self.plan.items.is_empty() {
            return;
        }

        let entries: Vec<String> = (1..=self.plan.items.len())
            .map(|input| format!("{}:0", input))
            .collect();
        tokens.push("--track-order".to_string());
        tokens.push(entries.join(","));
    }

    /// Keep or drop the original audio tracks.
    fn add_audio_retention(&self, tokens: &mut Vec<String>) {
        let Some(retained) = &self.plan.retained_audio_ids else {
            return;
        };

        if retained.is_empty() {
            tokens.push("-A".to_string());
        } else {
            let ids: Vec<String> = retained.iter().map(|id| id.to_string()).collect();
            tokens.push("-a".to_string());
            tokens.push(ids.join(","));
        }
    }

    /// Directive group for a single appended AC-3 file.
    ///
    /// Each AC-3 input holds one track, so every directive addresses track 0
    /// of its own file.
    fn add_job_options(&self, tokens: &mut Vec<String>, item: &PlanItem) {
        if item.is_default {
            tokens.push("--default-track".to_string());
            tokens.push("0".to_string());
        }

        tokens.push("--language".to_string());
        tokens.push(format!("0:{}", item.job.track.lang));

        if item.job.delay_ms > 0 {
            tokens.push("--sync".to_string());
            tokens.push(format!("0:{}", item.job.delay_ms));
        }

        if let Some(name) = &item.track_name {
            tokens.push("--track-name".to_string());
            tokens.push(format!("0:{}", name));
        }

        tokens.push(item.job.ac3_path.to_string_lossy().to_string());
    }
}
