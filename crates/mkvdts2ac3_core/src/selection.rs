//! Track selection.
//!
//! A pure function from (catalog, policy) to the list of DTS tracks to
//! convert, always in ascending id order.

use thiserror::Error;

use crate::models::{SelectionPolicy, TrackCatalog, TrackDescriptor};

/// Errors from applying a selection policy to a catalog.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// The explicitly requested track id is not in the container.
    #[error("track {id} does not exist in this container")]
    InvalidTrack { id: u64 },

    /// The explicitly requested track exists but is not DTS audio.
    #[error("track {id} is {codec}, not DTS audio")]
    NotDts { id: u64, codec: String },

    /// The container has no DTS audio at all.
    #[error("no DTS tracks found")]
    NoDtsTracks,
}

/// Result type for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Pick the tracks a policy selects from a catalog.
///
/// Existence is checked before codec, so a bogus id reports `InvalidTrack`
/// even when the container has no DTS audio either.
pub fn select_tracks(
    catalog: &TrackCatalog,
    policy: SelectionPolicy,
) -> SelectionResult<Vec<TrackDescriptor>> {
    match policy {
        SelectionPolicy::Explicit(id) => {
            let track = catalog.get(id).ok_or(SelectionError::InvalidTrack { id })?;
            if !track.is_dts() {
                return Err(SelectionError::NotDts {
                    id,
                    codec: track.codec.clone(),
                });
            }
            Ok(vec![track.clone()])
        }
        SelectionPolicy::AllDts => {
            let tracks: Vec<TrackDescriptor> = catalog.dts_tracks().cloned().collect();
            if tracks.is_empty() {
                return Err(SelectionError::NoDtsTracks);
            }
            Ok(tracks)
        }
        SelectionPolicy::FirstDts => {
            let first = catalog.dts_tracks().next().ok_or(SelectionError::NoDtsTracks)?;
            Ok(vec![first.clone()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TrackType, AC3_CODEC, DTS_CODEC};

    fn mixed_catalog() -> TrackCatalog {
        let mut catalog = TrackCatalog::new();
        catalog.insert(TrackDescriptor::new(1, TrackType::Video, "V_MPEG4/ISO/AVC"));
        catalog.insert(TrackDescriptor::new(4, TrackType::Audio, DTS_CODEC));
        catalog.insert(TrackDescriptor::new(2, TrackType::Audio, DTS_CODEC));
        catalog.insert(TrackDescriptor::new(3, TrackType::Audio, AC3_CODEC));
        catalog.insert(TrackDescriptor::new(5, TrackType::Subtitles, "S_TEXT/UTF8"));
        catalog
    }

    #[test]
    fn all_dts_returns_ascending_dts_only() {
        let selected = select_tracks(&mixed_catalog(), SelectionPolicy::AllDts).unwrap();
        let ids: Vec<u64> = selected.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(selected.iter().all(|t| t.codec == DTS_CODEC));
    }

    #[test]
    fn first_dts_returns_lowest_id() {
        let selected = select_tracks(&mixed_catalog(), SelectionPolicy::FirstDts).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 2);
    }

    #[test]
    fn explicit_picks_exactly_that_track() {
        let selected = select_tracks(&mixed_catalog(), SelectionPolicy::Explicit(4)).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 4);
    }

    #[test]
    fn explicit_missing_id_is_invalid_track() {
        let result = select_tracks(&mixed_catalog(), SelectionPolicy::Explicit(9));
        assert!(matches!(result, Err(SelectionError::InvalidTrack { id: 9 })));
    }

    #[test]
    fn explicit_non_dts_is_not_dts() {
        let result = select_tracks(&mixed_catalog(), SelectionPolicy::Explicit(3));
        match result {
            Err(SelectionError::NotDts { id, codec }) => {
                assert_eq!(id, 3);
                assert_eq!(codec, AC3_CODEC);
            }
            other => panic!("expected NotDts, got {:?}", other),
        }
    }

    #[test]
    fn invalid_track_wins_over_missing_dts() {
        // Catalog with no DTS at all: a bogus explicit id must still be
        // reported as the id problem, not as NoDtsTracks.
        let mut catalog = TrackCatalog::new();
        catalog.insert(TrackDescriptor::new(1, TrackType::Video, "V_MPEG4/ISO/AVC"));
        let result = select_tracks(&catalog, SelectionPolicy::Explicit(7));
        assert!(matches!(result, Err(SelectionError::InvalidTrack { id: 7 })));
    }

    #[test]
    fn dts_free_catalog_fails_both_policies() {
        let mut catalog = TrackCatalog::new();
        catalog.insert(TrackDescriptor::new(1, TrackType::Video, "V_MPEG4/ISO/AVC"));
        catalog.insert(TrackDescriptor::new(2, TrackType::Audio, AC3_CODEC));

        assert!(matches!(
            select_tracks(&catalog, SelectionPolicy::AllDts),
            Err(SelectionError::NoDtsTracks)
        ));
        assert!(matches!(
            select_tracks(&catalog, SelectionPolicy::FirstDts),
            Err(SelectionError::NoDtsTracks)
        ));
    }
}
