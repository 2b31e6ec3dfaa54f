use std::fmt;

use serde::{Deserialize, Serialize};

/// A tag that could not be mapped onto a known quality tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} tag {tag:?}")]
pub struct UnknownQualityTag {
    pub what: &'static str,
    pub tag: String,
}

/// Resolution reported by the library server, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    Sd,
    P240,
    P480,
    P576,
    P720,
    P1080,
    Uhd4k,
}

impl Resolution {
    pub fn parse(tag: &str) -> Result<Self, UnknownQualityTag> {
        let lowered = tag.trim().to_ascii_lowercase();
        let key = lowered.strip_suffix('p').unwrap_or(&lowered);
        match key {
            "sd" => Ok(Resolution::Sd),
            "240" => Ok(Resolution::P240),
            "480" => Ok(Resolution::P480),
            "576" => Ok(Resolution::P576),
            "720" => Ok(Resolution::P720),
            "1080" => Ok(Resolution::P1080),
            "4k" | "2160" | "uhd" => Ok(Resolution::Uhd4k),
            _ => Err(UnknownQualityTag {
                what: "resolution",
                tag: tag.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Sd => "SD",
            Resolution::P240 => "240p",
            Resolution::P480 => "480p",
            Resolution::P576 => "576p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
            Resolution::Uhd4k => "4K",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Resolution {
    type Error = UnknownQualityTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Resolution::parse(&value)
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.as_str().to_string()
    }
}

/// Physical media tier reported by a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DiscFormat {
    Dvd,
    BluRay,
    Uhd4k,
}

impl DiscFormat {
    pub fn parse(tag: &str) -> Result<Self, UnknownQualityTag> {
        let key: String = tag
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "dvd" => Ok(DiscFormat::Dvd),
            "bluray" | "bd" => Ok(DiscFormat::BluRay),
            "4k" | "4kdisc" | "4kbluray" | "4kuhd" | "uhd" | "uhdbluray" | "4kultrahd" => {
                Ok(DiscFormat::Uhd4k)
            }
            _ => Err(UnknownQualityTag {
                what: "disc format",
                tag: tag.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiscFormat::Dvd => "DVD",
            DiscFormat::BluRay => "Blu-ray",
            DiscFormat::Uhd4k => "4K-disc",
        }
    }

    /// Whether a disc in this format is an upgrade over a library copy at `resolution`.
    ///
    /// DVD is the baseline tier: it is reported for presence but never counts
    /// as an upgrade.
    pub fn beats(self, resolution: Resolution) -> bool {
        match self {
            DiscFormat::Uhd4k => true,
            DiscFormat::BluRay => resolution < Resolution::Uhd4k,
            DiscFormat::Dvd => false,
        }
    }
}

impl fmt::Display for DiscFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DiscFormat {
    type Error = UnknownQualityTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DiscFormat::parse(&value)
    }
}

impl From<DiscFormat> for String {
    fn from(value: DiscFormat) -> Self {
        value.as_str().to_string()
    }
}

/// True iff any of `formats` is an upgrade over `resolution`.
pub fn disc_beats_library_resolution(resolution: Resolution, formats: &[DiscFormat]) -> bool {
    formats.iter().any(|format| format.beats(resolution))
}

#[cfg(test)]
mod tests {
    use super::{disc_beats_library_resolution, DiscFormat, Resolution};

    #[test]
    fn resolutions_are_totally_ordered() {
        let ordered = [
            Resolution::Sd,
            Resolution::P240,
            Resolution::P480,
            Resolution::P576,
            Resolution::P720,
            Resolution::P1080,
            Resolution::Uhd4k,
        ];
        assert!(ordered.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn library_tags_parse_with_or_without_suffix() {
        assert_eq!(Resolution::parse("1080").unwrap(), Resolution::P1080);
        assert_eq!(Resolution::parse("1080p").unwrap(), Resolution::P1080);
        assert_eq!(Resolution::parse("4K").unwrap(), Resolution::Uhd4k);
        assert_eq!(Resolution::parse("sd").unwrap(), Resolution::Sd);
        assert!(Resolution::parse("8k").is_err());
    }

    #[test]
    fn disc_tags_parse_loosely() {
        assert_eq!(DiscFormat::parse("Blu-ray").unwrap(), DiscFormat::BluRay);
        assert_eq!(DiscFormat::parse("4K Blu-ray").unwrap(), DiscFormat::Uhd4k);
        assert_eq!(DiscFormat::parse("4K-disc").unwrap(), DiscFormat::Uhd4k);
        assert_eq!(DiscFormat::parse("dvd").unwrap(), DiscFormat::Dvd);
        assert!(DiscFormat::parse("VHS").is_err());
    }

    #[test]
    fn dvd_never_beats_anything() {
        assert!(!disc_beats_library_resolution(Resolution::Sd, &[DiscFormat::Dvd]));
        assert!(!disc_beats_library_resolution(Resolution::P240, &[DiscFormat::Dvd]));
    }

    #[test]
    fn any_beating_format_is_enough() {
        let formats = [DiscFormat::Dvd, DiscFormat::BluRay];
        assert!(disc_beats_library_resolution(Resolution::P720, &formats));
        assert!(!disc_beats_library_resolution(Resolution::P720, &[]));
    }
}
