//! Container inspection via the muxer's identify listing.
//!
//! `mkvmerge -i` prints one line per track; everything else in the listing
//! (version banner, container line, attachments, chapters) is noise here.

use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use super::types::{ExtractionError, ExtractionResult};
use crate::models::{TrackCatalog, TrackDescriptor, TrackType};
use crate::tools::{ToolError, ToolRunner};

/// Track line grammar of the identify listing.
fn track_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Track ID (?P<id>\d+): (?P<type>video|audio|subtitles) \((?P<codec>[A-Z0-9_/]+)\)")
            .unwrap()
    })
}

/// Inspect a container and build its track catalog.
///
/// Identification is read-only, so this executes even in dry-run mode; the
/// catalog is needed to plan the run at all.
pub fn catalog_for(
    runner: &ToolRunner,
    mkvmerge: &str,
    input: &Path,
) -> ExtractionResult<TrackCatalog> {
    if !input.exists() {
        return Err(ExtractionError::FileNotFound(input.to_path_buf()));
    }
    if input.extension().and_then(|e| e.to_str()) != Some("mkv") {
        return Err(ExtractionError::InvalidInputFile(input.to_path_buf()));
    }

    let mut cmd = Command::new(mkvmerge);
    cmd.arg("-i").arg(input);

    let listing = match runner.capture(&mut cmd) {
        Ok(listing) => listing,
        // A non-zero identify exit means the container is unusable, not
        // that the tool is broken.
        Err(ToolError::Failed { .. }) => {
            return Err(ExtractionError::InvalidInputFile(input.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let catalog = parse_catalog(&listing);
    if catalog.is_empty() {
        return Err(ExtractionError::InvalidInputFile(input.to_path_buf()));
    }
    Ok(catalog)
}

/// Parse an identify listing into a catalog.
///
/// Lines not matching the track grammar are skipped. Language and name are
/// not present in this listing, so descriptors keep their defaults.
pub fn parse_catalog(listing: &str) -> TrackCatalog {
    let mut catalog = TrackCatalog::new();

    for line in listing.lines() {
        let Some(caps) = track_line().captures(line) else {
            continue;
        };
        let id = match caps["id"].parse::<u64>() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let track_type = match caps["type"].parse::<TrackType>() {
            Ok(track_type) => track_type,
            Err(_) => continue,
        };
        catalog.insert(TrackDescriptor::new(id, track_type, &caps["codec"]));
    }

    catalog
}
