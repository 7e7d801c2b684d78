//! Error types shared by every component.

use crate::beatmap::parser::ParseError;
use crate::net::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a performance engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// The engine could not load or understand the beatmap file.
    #[error("invalid beatmap: {0}")]
    InvalidBeatmap(String),
    /// The engine loaded the map but failed to compute attributes.
    #[error("calculation failed: {0}")]
    CalculationFailed(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// API credentials are absent or malformed.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("invalid config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The OAuth endpoint rejected the configured client.
    #[error(
        "the client id and/or secret provided is invalid, see https://osu.ppy.sh/home/account/edit#oauth"
    )]
    InvalidCredentials,

    /// A checksum lookup was requested but no API client is configured.
    #[error("lookup service unavailable: no API credentials configured")]
    LookupUnavailable,

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("invalid beatmap checksum {0:?}: expected 32 hex digits")]
    InvalidChecksum(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The raw beatmap could not be downloaded.
    #[error(
        "failed to get beatmap {id} from osu! ({source}); if this is a custom beatmap, pass the beatmap path directly instead"
    )]
    BeatmapUnavailable {
        id: u64,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cache entry not found: {}", .0.display())]
    CacheMiss(PathBuf),

    /// A cache key that would resolve outside its directory.
    #[error("invalid cache key {0:?}")]
    InvalidCacheKey(String),

    /// The beatmap has no backing file to hand to the engine.
    #[error("beatmap is not bound to a file")]
    UnboundBeatmap,

    #[error("beatmap file is gone: {}", path.display())]
    MissingBeatmapFile { path: PathBuf },

    #[error("invalid play: {0}")]
    InvalidPlay(String),

    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
