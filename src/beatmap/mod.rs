//! The beatmap entity and its section storage.
//!
//! A [`Beatmap`] is a thin typed view over the raw key/value sections of an
//! `.osu` file. Only `General`, `Editor`, `Metadata` and `Difficulty` are kept.

pub mod parser;

pub use parser::{BeatmapParser, ParseError, ValueSplit};

use crate::api::BeatmapLookup;
use crate::error::Result;
use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One `key -> value` section, in file order.
pub type Section = IndexMap<String, String>;

/// All recognized sections, in file order.
pub type Sections = IndexMap<SectionKind, Section>;

/// The sections of an `.osu` file that are retained after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    General,
    Editor,
    Metadata,
    Difficulty,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::General,
        SectionKind::Editor,
        SectionKind::Metadata,
        SectionKind::Difficulty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::General => "General",
            SectionKind::Editor => "Editor",
            SectionKind::Metadata => "Metadata",
            SectionKind::Difficulty => "Difficulty",
        }
    }

    /// Maps a header name (brackets already removed) to a kind.
    /// Unrecognized sections yield `None`.
    pub fn from_header(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A descriptive metadata value that may be absent from the file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MetadataField {
    Known(String),
    #[default]
    Unknown,
}

impl MetadataField {
    /// Display text used for [`MetadataField::Unknown`].
    pub const UNKNOWN: &'static str = "unknown";

    pub fn as_str(&self) -> &str {
        match self {
            MetadataField::Known(value) => value,
            MetadataField::Unknown => Self::UNKNOWN,
        }
    }

    pub fn known(&self) -> Option<&str> {
        match self {
            MetadataField::Known(value) => Some(value),
            MetadataField::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, MetadataField::Known(_))
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a [`Beatmap`] inside a factory call. Transitions only move
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LoadState {
    /// Freshly constructed, no sections.
    #[default]
    Unbound,
    /// Backing file confirmed on disk.
    Cached,
    /// Sections populated from the backing file.
    Parsed,
    /// Max combo overwritten by the lookup service.
    Enriched,
}

#[derive(Debug, Clone, Default)]
pub struct Beatmap {
    sections: Sections,
    path: Option<PathBuf>,
    state: LoadState,
    // Set by checksum enrichment only.
    max_combo: Option<u32>,
    canonical_id: Option<u64>,
    canonical_set_id: Option<u64>,
}

impl Beatmap {
    /// An unbound beatmap with no sections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parsed beatmap with no backing file.
    pub fn from_sections(sections: Sections) -> Self {
        Self {
            sections,
            state: LoadState::Parsed,
            ..Self::default()
        }
    }

    /// Reads and parses `path`, binding the result to it.
    pub fn from_file(path: impl AsRef<Path>, parser: &BeatmapParser) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        let mut beatmap = Self::bound_to(path.to_path_buf());
        beatmap.populate(parser.parse_bytes(&bytes)?);
        Ok(beatmap)
    }

    fn bound_to(path: PathBuf) -> Self {
        let mut beatmap = Self::new();
        beatmap.path = Some(path);
        beatmap.advance(LoadState::Cached);
        beatmap
    }

    fn populate(&mut self, sections: Sections) {
        self.sections = sections;
        self.advance(LoadState::Parsed);
    }

    /// Applies the authoritative values returned by a checksum lookup.
    /// The max combo is replaced unconditionally.
    pub(crate) fn enrich(&mut self, lookup: &BeatmapLookup) {
        self.max_combo = Some(lookup.max_combo);
        self.canonical_id = Some(lookup.id);
        if lookup.beatmapset_id > 0 {
            self.canonical_set_id = Some(lookup.beatmapset_id);
        }
        self.advance(LoadState::Enriched);
    }

    fn advance(&mut self, next: LoadState) {
        debug_assert!(next > self.state, "{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.get(&kind)
    }

    pub fn get(&self, kind: SectionKind, key: &str) -> Option<&str> {
        self.section(kind)?.get(key).map(String::as_str)
    }

    fn metadata(&self, key: &str) -> Option<&str> {
        self.get(SectionKind::Metadata, key)
    }

    fn metadata_number<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.metadata(key)?.trim().parse().ok()
    }

    fn metadata_text(&self, key: &str) -> MetadataField {
        match self.metadata(key) {
            Some(value) => MetadataField::Known(value.to_string()),
            None => MetadataField::Unknown,
        }
    }

    /// `BeatmapID`, falling back to the id resolved by a lookup, then 0.
    pub fn id(&self) -> u64 {
        self.metadata_number::<u64>("BeatmapID")
            .filter(|id| *id > 0)
            .or(self.canonical_id)
            .unwrap_or(0)
    }

    /// `BeatmapSetID`, falling back to the set resolved by a lookup, then 0.
    pub fn set_id(&self) -> u64 {
        self.metadata_number::<u64>("BeatmapSetID")
            .filter(|id| *id > 0)
            .or(self.canonical_set_id)
            .unwrap_or(0)
    }

    pub fn artist(&self) -> MetadataField {
        self.metadata_text("Artist")
    }

    pub fn title(&self) -> MetadataField {
        self.metadata_text("Title")
    }

    /// The difficulty (variant) name, stored as `Version` in the file.
    pub fn difficulty(&self) -> MetadataField {
        self.metadata_text("Version")
    }

    /// The enriched max combo if any, else `MaxCombo` from the file, else 0.
    /// Raw `.osu` files never carry `MaxCombo`.
    pub fn max_combo(&self) -> u32 {
        self.max_combo
            .or_else(|| self.metadata_number("MaxCombo"))
            .unwrap_or(0)
    }

    /// MD5 checksum of the backing file, as lowercase hex.
    pub fn checksum(&self) -> Result<Option<String>> {
        let Some(path) = self.path() else {
            return Ok(None);
        };
        let bytes = fs::read(path)?;
        Ok(Some(format!("{:x}", md5::compute(bytes))))
    }
}
