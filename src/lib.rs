//! Beatmap acquisition, caching and performance orchestration for osu!.
//!
//! ## Usage
//!
//! ```no_run
//! use osrpp::{BeatmapRepository, CacheStore, Config, HttpTransport};
//! use osrpp::{PerformanceCalculator, PlayParams};
//!
//! # fn main() -> osrpp::Result<()> {
//! let config = Config::default();
//! let repository = BeatmapRepository::new(
//!     CacheStore::new(&config.cache_dir),
//!     HttpTransport::new(&config),
//!     config.endpoints.clone(),
//! );
//!
//! let beatmap = repository.load_id(2690223)?;
//! let attrs = PerformanceCalculator::new()
//!     .calculate(&beatmap, &PlayParams::new(16, 100.0, 532, 0))?;
//! println!("{} - {}: {:.2}pp", beatmap.artist(), beatmap.title(), attrs.pp);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod beatmap;
pub mod cache;
pub mod config;
pub mod error;
pub mod net;
pub mod performance;
pub mod repository;

pub use api::{BeatmapLookup, LookupService, OsuApiClient};
pub use beatmap::{Beatmap, BeatmapParser, LoadState, MetadataField, SectionKind, ValueSplit};
pub use cache::{CacheEntry, CacheStore};
pub use config::{Config, Credentials, Endpoints};
pub use error::{CalcError, Error, Result};
pub use net::{HttpTransport, Transport, TransportError};
pub use performance::{PerformanceAttributes, PerformanceCalculator, PerformanceEngine, PlayParams};
pub use repository::BeatmapRepository;
