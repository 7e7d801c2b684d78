//! Trait definition for performance engines.
//!
//! An engine turns a beatmap file plus the parameters of one play into
//! [`PerformanceAttributes`]. The built-in engine wraps rosu-pp; tests use
//! their own.

use crate::error::{CalcError, Error, Result};
use std::fmt::Debug;
use std::path::Path;

/// The parameters of a single play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
    /// Legacy mod bitmask (e.g. 16 = HR, 24 = HDHR).
    pub mods: u32,
    /// Accuracy in percent, 0 to 100.
    pub accuracy: f64,
    /// Achieved combo. `None` means a full combo.
    pub combo: Option<u32>,
    pub misses: u32,
}

impl Default for PlayParams {
    fn default() -> Self {
        Self {
            mods: 0,
            accuracy: 100.0,
            combo: None,
            misses: 0,
        }
    }
}

impl PlayParams {
    pub fn new(mods: u32, accuracy: f64, combo: u32, misses: u32) -> Self {
        Self {
            mods,
            accuracy,
            combo: Some(combo),
            misses,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.accuracy) {
            return Err(Error::InvalidPlay(format!(
                "accuracy must be between 0 and 100, got {}",
                self.accuracy
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Osu,
    Taiko,
    Catch,
    Mania,
}

/// Rating of one play and the breakdown the engine exposes for its mode.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceAttributes {
    pub mode: GameMode,
    /// Total performance points.
    pub pp: f64,
    pub stars: f64,
    pub max_combo: u32,
    pub aim: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub flashlight: Option<f64>,
    pub difficulty: Option<f64>,
}

impl PerformanceAttributes {
    /// Attributes with only the totals set.
    pub fn new(mode: GameMode, pp: f64, stars: f64, max_combo: u32) -> Self {
        Self {
            mode,
            pp,
            stars,
            max_combo,
            aim: None,
            speed: None,
            accuracy: None,
            flashlight: None,
            difficulty: None,
        }
    }
}

/// Trait that all performance engines must implement.
pub trait PerformanceEngine: Send + Sync + Debug {
    /// Unique identifier (e.g., "rosu-pp").
    fn id(&self) -> &str;

    /// Version string of the underlying algorithm.
    fn version(&self) -> &str;

    /// Rates one play on the beatmap stored at `path`.
    fn calculate(
        &self,
        path: &Path,
        params: &PlayParams,
    ) -> std::result::Result<PerformanceAttributes, CalcError>;

    /// Returns a full engine ID including version.
    fn full_id(&self) -> String {
        format!("{}_{}", self.id(), self.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_bounds() {
        assert!(PlayParams::new(0, 100.0, 500, 0).validate().is_ok());
        assert!(PlayParams::new(0, 0.0, 0, 10).validate().is_ok());
        assert!(PlayParams::new(0, 100.1, 500, 0).validate().is_err());
        assert!(PlayParams::new(0, -1.0, 500, 0).validate().is_err());
        assert!(PlayParams::new(0, f64::NAN, 500, 0).validate().is_err());
    }

    #[test]
    fn test_default_is_full_combo_ss() {
        let params = PlayParams::default();
        assert_eq!(params.combo, None);
        assert_eq!(params.accuracy, 100.0);
    }
}
