//! Performance calculation module.
//!
//! [`PerformanceCalculator`] checks that a beatmap still has its backing file
//! and hands that file, together with the play parameters, to a
//! [`PerformanceEngine`]. One synchronous engine call per play, no retries.

pub mod builtin;
pub mod calculator;

pub use builtin::RosuEngine;
pub use calculator::{GameMode, PerformanceAttributes, PerformanceEngine, PlayParams};

use crate::beatmap::Beatmap;
use crate::error::{Error, Result};
use log::{debug, warn};

#[derive(Debug, Clone)]
pub struct PerformanceCalculator<E: PerformanceEngine = RosuEngine> {
    engine: E,
}

impl Default for PerformanceCalculator<RosuEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceCalculator<RosuEngine> {
    pub fn new() -> Self {
        Self::with_engine(RosuEngine::new())
    }
}

impl<E: PerformanceEngine> PerformanceCalculator<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Rates one play on `beatmap`.
    ///
    /// Fails before reaching the engine if the play is invalid or the
    /// beatmap's backing file is missing.
    pub fn calculate(
        &self,
        beatmap: &Beatmap,
        params: &PlayParams,
    ) -> Result<PerformanceAttributes> {
        params.validate()?;

        let path = beatmap.path().ok_or(Error::UnboundBeatmap)?;
        if !path.is_file() {
            warn!(
                "[Beatmap] Cached beatmap file is gone: {}. Try running again?",
                path.display()
            );
            return Err(Error::MissingBeatmapFile {
                path: path.to_path_buf(),
            });
        }

        debug!(
            "[PP] {} on {} (mods {}, {:.2}%, combo {:?}, {} misses)",
            self.engine.full_id(),
            path.display(),
            params.mods,
            params.accuracy,
            params.combo,
            params.misses
        );
        Ok(self.engine.calculate(path, params)?)
    }
}
