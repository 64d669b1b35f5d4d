//! Media-related data structures (track descriptors and the catalog).

use std::collections::BTreeMap;

use super::enums::TrackType;

/// Codec id the converter looks for.
pub const DTS_CODEC: &str = "A_DTS";
/// Codec id the converter produces (and guards against duplicating).
pub const AC3_CODEC: &str = "A_AC3";

/// One track as reported by the container inspector.
///
/// Built once per run from the parsed inspector listing and never mutated
/// afterwards. Language, name and delay are not recoverable from the
/// inspector's track listing alone; they keep their defaults ("und", empty,
/// 0) unless a secondary source fills them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    /// Track ID within the container (mkvmerge numbering).
    pub id: u64,
    /// Type of track (video, audio, subtitles).
    pub track_type: TrackType,
    /// Codec identifier (e.g., "A_DTS", "V_MPEG4/ISO/AVC").
    pub codec: String,
    /// Language code (ISO 639-2, e.g., "eng", "und").
    pub lang: String,
    /// Track name. Empty when the track has none.
    pub name: String,
    /// Container delay in milliseconds, when resolvable.
    pub delay_ms: i64,
}

impl TrackDescriptor {
    /// Create a descriptor with stubbed metadata.
    pub fn new(id: u64, track_type: TrackType, codec: impl Into<String>) -> Self {
        Self {
            id,
            track_type,
            codec: codec.into(),
            lang: "und".to_string(),
            name: String::new(),
            delay_ms: 0,
        }
    }

    /// Set the language code.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the track name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether this is a DTS audio track.
    pub fn is_dts(&self) -> bool {
        self.track_type == TrackType::Audio && self.codec == DTS_CODEC
    }

    /// Whether this is an audio track of any codec.
    pub fn is_audio(&self) -> bool {
        self.track_type == TrackType::Audio
    }

    /// Get a display string for this track.
    pub fn display_name(&self) -> String {
        let name_part = if self.name.is_empty() {
            String::new()
        } else {
            format!(" - {}", self.name)
        };
        format!(
            "{} track {} ({}){}",
            self.track_type, self.id, self.codec, name_part
        )
    }
}

/// All tracks of one container, keyed and iterated by ascending track id.
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    tracks: BTreeMap<u64, TrackDescriptor>,
}

impl TrackCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor. Later descriptors with the same id replace
    /// earlier ones (track ids are unique per container).
    pub fn insert(&mut self, track: TrackDescriptor) {
        self.tracks.insert(track.id, track);
    }

    /// Look up a track by id.
    pub fn get(&self, id: u64) -> Option<&TrackDescriptor> {
        self.tracks.get(&id)
    }

    /// Whether a track with this id exists.
    pub fn contains(&self, id: u64) -> bool {
        self.tracks.contains_key(&id)
    }

    /// All tracks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.values()
    }

    /// All DTS audio tracks in ascending id order.
    pub fn dts_tracks(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.iter().filter(|t| t.is_dts())
    }

    /// All audio tracks (any codec) in ascending id order.
    pub fn audio_tracks(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.iter().filter(|t| t.is_audio())
    }

    /// Number of tracks in the catalog.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the catalog has no tracks at all.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
