//! Conversion planning: working-file derivation and tool argument lists.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{ConversionJob, TrackDescriptor};

/// Default decoder arguments. `-o wavall` keeps every channel in the
/// uncompressed stream; custom pairs may override it.
const DEFAULT_DECODER_ARGS: [(&str, &str); 1] = [("-o", "wavall")];

/// Errors from building a conversion plan.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A custom tool argument was not of the form `-flag=value`.
    #[error("invalid custom argument {pair:?} (expected -flag=value)")]
    InvalidCustomArgument { pair: String },
}

/// Result type for plan operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// The three working files one conversion occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempPaths {
    /// Extracted timecodes (v2 text format).
    pub tc: PathBuf,
    /// Extracted raw DTS payload.
    pub dts: PathBuf,
    /// Encoded AC-3 payload.
    pub ac3: PathBuf,
}

/// Derive the working files for one track.
///
/// Pure function of (working dir, title, track id); calling it twice with
/// the same inputs yields identical paths. Uniqueness within a run holds
/// because processing is strictly sequential.
pub fn derive_temp_paths(working_dir: &Path, title: &str, track_id: u64) -> TempPaths {
    let stem = format!("{}.{}", title, track_id);
    TempPaths {
        tc: working_dir.join(format!("{}.tc", stem)),
        dts: working_dir.join(format!("{}.dts", stem)),
        ac3: working_dir.join(format!("{}.ac3", stem)),
    }
}

/// Title of a container: its filename without the final extension.
pub fn container_title(input: &Path) -> Option<String> {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

/// Build one conversion job per selected track, in selection order.
pub fn build_jobs(
    working_dir: &Path,
    title: &str,
    selection: &[TrackDescriptor],
    keep_dts: bool,
) -> Vec<ConversionJob> {
    selection
        .iter()
        .map(|track| {
            let paths = derive_temp_paths(working_dir, title, track.id);
            ConversionJob::new(track.clone(), paths.tc, paths.dts, paths.ac3, keep_dts)
        })
        .collect()
}

/// Decoder argument list: the defaults, overridden or extended by custom
/// `-flag=value` pairs. A pair whose flag matches a default replaces its
/// value in place; new flags append in caller order.
pub fn decoder_args(custom: &[String]) -> PlanResult<Vec<String>> {
    let mut args: Vec<(String, String)> = DEFAULT_DECODER_ARGS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for pair in custom {
        let (flag, value) = split_pair(pair)?;
        match args.iter_mut().find(|(k, _)| *k == flag) {
            Some(entry) => entry.1 = value,
            None => args.push((flag, value)),
        }
    }

    Ok(args.into_iter().flat_map(|(k, v)| [k, v]).collect())
}

/// Encoder argument list: no defaults, custom pairs in caller order.
pub fn encoder_args(custom: &[String]) -> PlanResult<Vec<String>> {
    let mut args = Vec::new();
    for pair in custom {
        let (flag, value) = split_pair(pair)?;
        args.push(flag);
        args.push(value);
    }
    Ok(args)
}

fn split_pair(pair: &str) -> PlanResult<(String, String)> {
    let (flag, value) = pair
        .split_once('=')
        .ok_or_else(|| PlanError::InvalidCustomArgument {
            pair: pair.to_string(),
        })?;
    if !flag.starts_with('-') || flag.len() < 2 {
        return Err(PlanError::InvalidCustomArgument {
            pair: pair.to_string(),
        });
    }
    Ok((flag.to_string(), value.to_string()))
}
