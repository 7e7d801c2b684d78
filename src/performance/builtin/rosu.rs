//! osu! performance engine using rosu-pp.

use crate::error::CalcError;
use crate::performance::{GameMode, PerformanceAttributes, PerformanceEngine, PlayParams};
use rosu_pp::any::PerformanceAttributes as RosuAttributes;
use std::path::Path;

/// osu! performance engine using rosu-pp.
#[derive(Debug, Clone)]
pub struct RosuEngine {
    version: String,
}

impl Default for RosuEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RosuEngine {
    pub fn new() -> Self {
        Self {
            version: "v3".to_string(),
        }
    }
}

impl PerformanceEngine for RosuEngine {
    fn id(&self) -> &str {
        "rosu-pp"
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn calculate(
        &self,
        path: &Path,
        params: &PlayParams,
    ) -> Result<PerformanceAttributes, CalcError> {
        let map = rosu_pp::Beatmap::from_path(path)
            .map_err(|e| CalcError::InvalidBeatmap(format!("{}: {}", path.display(), e)))?;

        let mut performance = rosu_pp::Performance::new(&map)
            .mods(params.mods)
            .accuracy(params.accuracy)
            .misses(params.misses);
        if let Some(combo) = params.combo {
            performance = performance.combo(combo);
        }

        Ok(convert(performance.calculate()))
    }
}

fn convert(attrs: RosuAttributes) -> PerformanceAttributes {
    let stars = attrs.stars();
    let max_combo = attrs.max_combo();

    match attrs {
        RosuAttributes::Osu(osu) => PerformanceAttributes {
            aim: Some(osu.pp_aim),
            speed: Some(osu.pp_speed),
            accuracy: Some(osu.pp_acc),
            flashlight: Some(osu.pp_flashlight),
            ..PerformanceAttributes::new(GameMode::Osu, osu.pp, stars, max_combo)
        },
        RosuAttributes::Taiko(taiko) => PerformanceAttributes {
            accuracy: Some(taiko.pp_acc),
            difficulty: Some(taiko.pp_difficulty),
            ..PerformanceAttributes::new(GameMode::Taiko, taiko.pp, stars, max_combo)
        },
        RosuAttributes::Catch(catch) => {
            PerformanceAttributes::new(GameMode::Catch, catch.pp, stars, max_combo)
        }
        RosuAttributes::Mania(mania) => PerformanceAttributes {
            difficulty: Some(mania.pp_difficulty),
            ..PerformanceAttributes::new(GameMode::Mania, mania.pp, stars, max_combo)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture(mode: u8) -> String {
        format!(
            "osu file format v14

[General]
Mode: {}

[Difficulty]
HPDrainRate:5
CircleSize:4
OverallDifficulty:8
ApproachRate:9
SliderMultiplier:1.4
SliderTickRate:1

[TimingPoints]
0,500,4,2,0,100,1,0

[HitObjects]
64,192,1000,1,0,0:0:0:0:
256,192,1300,1,0,0:0:0:0:
448,192,1600,1,0,0:0:0:0:
",
            mode
        )
    }

    fn rate(mode: u8) -> PerformanceAttributes {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.osu");
        fs::write(&path, fixture(mode)).unwrap();
        RosuEngine::new()
            .calculate(&path, &PlayParams::default())
            .unwrap()
    }

    #[test]
    fn test_standard_breakdown() {
        let attrs = rate(0);
        assert_eq!(attrs.mode, GameMode::Osu);
        assert_eq!(attrs.max_combo, 3);
        assert!(attrs.pp > 0.0);
        assert!(attrs.stars.is_finite());
        assert!(attrs.aim.is_some());
        assert!(attrs.speed.is_some());
        assert!(attrs.accuracy.is_some());
        assert!(attrs.flashlight.is_some());
        assert!(attrs.difficulty.is_none());
    }

    #[test]
    fn test_mania_breakdown() {
        let attrs = rate(3);
        assert_eq!(attrs.mode, GameMode::Mania);
        assert!(attrs.pp.is_finite());
        assert!(attrs.difficulty.is_some());
        assert!(attrs.aim.is_none());
        assert!(attrs.speed.is_none());
    }

    #[test]
    fn test_unreadable_file_is_invalid_beatmap() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RosuEngine::new();
        let err = engine
            .calculate(&dir.path().join("missing.osu"), &PlayParams::default())
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidBeatmap(_)));
    }

    #[test]
    fn test_full_id() {
        assert_eq!(RosuEngine::new().full_id(), "rosu-pp_v3");
    }
}
