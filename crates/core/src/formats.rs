//! Supported transcode targets.
//!
//! Each format knows the encoder command that produces it and the file
//! extension of its output. Command placeholders:
//!
//! | Placeholder | Value        |
//! |-------------|--------------|
//! | `{0}`       | source file  |
//! | `{1}`       | output file  |
//! | `{2}`       | title        |
//! | `{3}`       | artist       |
//! | `{4}`       | album        |
//! | `{5}`       | date         |
//! | `{6}`       | track number |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::runner::CommandTemplate;

/// Requested format name is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No way of transcoding to {name}")]
pub struct UnknownFormat {
    pub name: String,
}

/// A transcode target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Format {
    /// FLAC, 16 bit / 48 kHz.
    Flac16_48,
    /// FLAC, 16 bit / 44.1 kHz.
    Flac16_44,
    /// Apple Lossless.
    Alac,
    /// MP3 CBR 320k.
    Mp3_320,
    /// MP3 VBR V0.
    Mp3V0,
    /// MP3 VBR V1.
    Mp3V1,
    /// MP3 VBR V2.
    Mp3V2,
}

const FFMPEG: &str = "ffmpeg -threads 1";

impl Format {
    pub const ALL: [Format; 7] = [
        Self::Flac16_48,
        Self::Flac16_44,
        Self::Alac,
        Self::Mp3_320,
        Self::Mp3V0,
        Self::Mp3V1,
        Self::Mp3V2,
    ];

    /// Lowercase name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flac16_48 => "16-48",
            Self::Flac16_44 => "16-44",
            Self::Alac => "alac",
            Self::Mp3_320 => "320",
            Self::Mp3V0 => "v0",
            Self::Mp3V1 => "v1",
            Self::Mp3V2 => "v2",
        }
    }

    /// Tag used in output directory names, e.g. `[V0]`.
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Extension of the files this format produces.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Flac16_48 | Self::Flac16_44 => "flac",
            Self::Alac => "m4a",
            Self::Mp3_320 | Self::Mp3V0 | Self::Mp3V1 | Self::Mp3V2 => "mp3",
        }
    }

    /// Encoder command for one file.
    pub fn command(&self) -> CommandTemplate {
        let line = match self {
            Self::Flac16_48 => format!("{FFMPEG} -i {{0}} -acodec flac -sample_fmt s16 -ar 48000 {{1}}"),
            Self::Flac16_44 => format!("{FFMPEG} -i {{0}} -acodec flac -sample_fmt s16 -ar 44100 {{1}}"),
            Self::Alac => format!("{FFMPEG} -i {{0}} -acodec alac {{1}}"),
            Self::Mp3_320 => format!("{FFMPEG} -i {{0}} -acodec libmp3lame -ab 320k {{1}}"),
            Self::Mp3V0 => lame_vbr(0),
            Self::Mp3V1 => lame_vbr(1),
            Self::Mp3V2 => lame_vbr(2),
        };
        CommandTemplate::new(line)
    }

    /// Parses a comma separated list such as `"320,v0"`.
    ///
    /// Returns the recognised formats (deduplicated, in order) and the names
    /// that were not recognised.
    pub fn parse_list(list: &str) -> (Vec<Format>, Vec<UnknownFormat>) {
        let mut formats = Vec::new();
        let mut unknown = Vec::new();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name.parse::<Format>() {
                Ok(format) if !formats.contains(&format) => formats.push(format),
                Ok(_) => {}
                Err(e) => unknown.push(e),
            }
        }
        (formats, unknown)
    }
}

fn lame_vbr(quality: u8) -> String {
    format!(
        "flac --decode --stdout {{0}} | lame -V {quality} -q 0 --add-id3v2 \
         --tt {{2}} --ta {{3}} --tl {{4}} --ty {{5}} --tn {{6}} - {{1}}"
    )
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lower)
            .ok_or(UnknownFormat { name: lower })
    }
}

impl TryFrom<String> for Format {
    type Error = UnknownFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bracketed codec names recognised in album folder names, e.g. `[FLAC]`.
pub const CODEC_TAGS: &[&str] = &[
    "wav",
    "flac",
    "flac 24bit",
    "flac 16-44",
    "flac 16-48",
    "flac 24-44",
    "flac 24-48",
    "flac 24-96",
    "flac 24-196",
    "16-44",
    "16-48",
    "24-44",
    "24-48",
    "24-96",
    "24-196",
    "alac",
    "320",
    "256",
    "224",
    "192",
    "v0",
    "apx",
    "256 vbr",
    "v1",
    "224 vbr",
    "v2",
    "aps",
    "192 vbr",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("V0".parse::<Format>().unwrap(), Format::Mp3V0);
        assert_eq!("ALAC".parse::<Format>().unwrap(), Format::Alac);
        assert_eq!(" 16-44 ".parse::<Format>().unwrap(), Format::Flac16_44);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "ogg".parse::<Format>().unwrap_err();
        assert_eq!(err.name, "ogg");
        assert_eq!(err.to_string(), "No way of transcoding to ogg");
    }

    #[test]
    fn test_parse_list() {
        let (formats, unknown) = Format::parse_list("320,V0,wma,v0");
        assert_eq!(formats, [Format::Mp3_320, Format::Mp3V0]);
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].name, "wma");
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Format::Alac.extension(), "m4a");
        assert_eq!(Format::Flac16_48.extension(), "flac");
        assert_eq!(Format::Mp3V1.extension(), "mp3");
    }

    #[test]
    fn test_commands_render_with_tags() {
        let args = ["in.flac", "out.mp3", "Title", "Artist", "Album", "2001", "3/12"];
        for format in Format::ALL {
            let line = format.command().render(&args).unwrap();
            assert!(line.as_str().contains("in.flac"), "{format}");
            assert!(line.as_str().contains("out.mp3"), "{format}");
        }
    }

    #[test]
    fn test_vbr_pipeline_programs() {
        assert_eq!(Format::Mp3V2.command().programs(), ["flac", "lame"]);
        assert_eq!(Format::Mp3_320.command().programs(), ["ffmpeg"]);
    }

    #[test]
    fn test_label() {
        assert_eq!(Format::Mp3V0.label(), "V0");
        assert_eq!(Format::Flac16_44.label(), "16-44");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&vec![Format::Mp3_320, Format::Mp3V0]).unwrap();
        assert_eq!(json, r#"["320","v0"]"#);
        let parsed: Vec<Format> = serde_json::from_str(r#"["ALAC"]"#).unwrap();
        assert_eq!(parsed, [Format::Alac]);
    }
}
