//! Quick `.osu` section parser.
//!
//! This is not a full beatmap decoder: it only collects the colon-separated
//! key/value lines of the four sections the rest of the crate reads. Timing
//! points and hit objects are left to the performance engine.

use super::{Section, SectionKind, Sections};
use thiserror::Error;

/// A line inside a recognized section that is not `key:value`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed line {line_number} in [{section}]: expected `key:value`, got {line:?}")]
pub struct ParseError {
    pub section: SectionKind,
    /// 1-based.
    pub line_number: usize,
    pub line: String,
}

/// How a `key:value` line is cut when the value itself contains colons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueSplit {
    /// Split once, keep everything after the first colon.
    #[default]
    Remainder,
    /// Split on every colon and keep only the second token. Matches older
    /// cache-derived output, where `Source:Foo:Bar` reads as `Foo`.
    SecondToken,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BeatmapParser {
    split: ValueSplit,
}

impl BeatmapParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_split(split: ValueSplit) -> Self {
        Self { split }
    }

    pub fn value_split(&self) -> ValueSplit {
        self.split
    }

    /// Decodes `bytes` permissively and parses the result.
    /// Invalid UTF-8 is replaced, never rejected.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Sections, ParseError> {
        self.parse_str(&String::from_utf8_lossy(bytes))
    }

    pub fn parse_str(&self, text: &str) -> Result<Sections, ParseError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut sections = Sections::new();
        let mut current: Option<SectionKind> = None;

        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with('[') {
                let name = line.replace(['[', ']'], "");
                current = SectionKind::from_header(name.trim());
                // A repeated header starts the section over.
                if let Some(kind) = current {
                    sections.insert(kind, Section::new());
                }
                continue;
            }

            let Some(kind) = current else {
                continue;
            };
            if line.starts_with("//") {
                continue;
            }

            let (key, value) = self.split_line(line).ok_or_else(|| ParseError {
                section: kind,
                line_number: index + 1,
                line: line.to_string(),
            })?;
            sections
                .entry(kind)
                .or_default()
                .insert(key.to_string(), value.to_string());
        }

        Ok(sections)
    }

    fn split_line<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        match self.split {
            ValueSplit::Remainder => line.split_once(':'),
            ValueSplit::SecondToken => {
                let mut tokens = line.split(':');
                let key = tokens.next()?;
                let value = tokens.next()?;
                Some((key, value))
            }
        }
    }
}

/// Parses with the default [`ValueSplit::Remainder`] policy.
pub fn parse(bytes: &[u8]) -> Result<Sections, ParseError> {
    BeatmapParser::new().parse_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "osu file format v14

[General]
AudioFilename: audio.mp3
Mode: 0

[Editor]
DistanceSpacing: 1.2

[Metadata]
Title:Blue Zenith
Artist:xi
Version:FOUR DIMENSIONS
Source:Foo:Bar
BeatmapID:123
BeatmapSetID:456

[Difficulty]
HPDrainRate:6
OverallDifficulty:9

[Events]
0,0,\"bg.jpg\",0,0

[TimingPoints]
1022,342.857142857143,4,2,1,70,1,0

[HitObjects]
256,192,1022,5,0,0:0:0:0:
";

    #[test]
    fn test_parse_recognized_sections_only() {
        let sections = parse(SAMPLE.as_bytes()).unwrap();
        let kinds: Vec<_> = sections.keys().copied().collect();
        assert_eq!(kinds, SectionKind::ALL.to_vec());

        let metadata = &sections[&SectionKind::Metadata];
        assert_eq!(metadata["BeatmapID"], "123");
        assert_eq!(metadata["Title"], "Blue Zenith");
        assert_eq!(sections[&SectionKind::General]["AudioFilename"], " audio.mp3");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let sections = parse(SAMPLE.as_bytes()).unwrap();
        let keys: Vec<_> = sections[&SectionKind::Metadata].keys().cloned().collect();
        assert_eq!(
            keys,
            ["Title", "Artist", "Version", "Source", "BeatmapID", "BeatmapSetID"]
        );
    }

    #[test]
    fn test_value_keeps_colons_by_default() {
        let sections = parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(sections[&SectionKind::Metadata]["Source"], "Foo:Bar");
    }

    #[test]
    fn test_second_token_truncates_value() {
        let parser = BeatmapParser::with_value_split(ValueSplit::SecondToken);
        let sections = parser.parse_str(SAMPLE).unwrap();
        assert_eq!(sections[&SectionKind::Metadata]["Source"], "Foo");
    }

    #[test]
    fn test_malformed_line_aborts_parse() {
        let text = "[Metadata]\nTitle:ok\nthis line has no colon\nArtist:never read\n";
        for split in [ValueSplit::Remainder, ValueSplit::SecondToken] {
            let err = BeatmapParser::with_value_split(split)
                .parse_str(text)
                .unwrap_err();
            assert_eq!(err.section, SectionKind::Metadata);
            assert_eq!(err.line_number, 3);
            assert_eq!(err.line, "this line has no colon");
        }
    }

    #[test]
    fn test_malformed_line_in_unrecognized_section_is_ignored() {
        let text = "[Events]\nno colon here\n[Metadata]\nTitle:x\n";
        let sections = parse(text.as_bytes()).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[&SectionKind::Metadata]["Title"], "x");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut bytes = b"[Metadata]\nArtist:".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"x\r\nTitle:y\r\n");

        let sections = parse(&bytes).unwrap();
        let metadata = &sections[&SectionKind::Metadata];
        assert_eq!(metadata["Artist"], "\u{fffd}\u{fffd}x");
        assert_eq!(metadata["Title"], "y");
    }

    #[test]
    fn test_whitespace_comments_and_bom() {
        let text = "\u{feff}[Metadata]\n   \n// comment without colon\n\t\nTitle:x\n";
        let sections = parse(text.as_bytes()).unwrap();
        assert_eq!(sections[&SectionKind::Metadata].len(), 1);
    }

    #[test]
    fn test_repeated_header_resets_section() {
        let text = "[Metadata]\nTitle:first\n[Difficulty]\nCircleSize:4\n[Metadata]\nArtist:second\n";
        let sections = parse(text.as_bytes()).unwrap();
        let metadata = &sections[&SectionKind::Metadata];
        assert_eq!(metadata.get("Title"), None);
        assert_eq!(metadata["Artist"], "second");
    }

    #[test]
    fn test_duplicate_key_overwrites() {
        let text = "[Metadata]\nTitle:a\nArtist:b\nTitle:c\n";
        let sections = parse(text.as_bytes()).unwrap();
        let metadata = &sections[&SectionKind::Metadata];
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get_index(0), Some((&"Title".to_string(), &"c".to_string())));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse(b"").unwrap().is_empty());
    }
}
