//! Output directory naming.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::Path;

use crate::formats::{Format, CODEC_TAGS};

static CODEC_TAG: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = CODEC_TAGS.iter().map(|c| regex_lite::escape(c)).collect();
    Regex::new(&format!(r"(?i)\[({})\]", alternatives.join("|"))).expect("codec tag pattern is valid")
});

/// Removes the first of `prefixes` that `name` starts with.
pub fn strip_prefix<'a>(name: &'a str, prefixes: &[String]) -> &'a str {
    prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .find_map(|p| name.strip_prefix(p.as_str()))
        .unwrap_or(name)
}

/// Name of the directory a transcode of `source_dir` goes into.
///
/// Bracketed codec tags in the album's folder name (`[FLAC]`, `[24-96]`) are
/// replaced by the target format's tag; a name without one gets the tag
/// appended. Then the first matching snip prefix is removed and `prefix`
/// is prepended.
pub fn transcode_dir_name(
    source_dir: &Path,
    format: Format,
    prefix: &str,
    snip_prefixes: &[String],
) -> String {
    let name = source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tag = format!("[{}]", format.label());

    let renamed = if CODEC_TAG.is_match(&name) {
        CODEC_TAG.replace_all(&name, tag.as_str()).into_owned()
    } else {
        format!("{} {}", name.trim_end(), tag)
    };

    format!("{}{}", prefix, strip_prefix(&renamed, snip_prefixes))
}

/// Name of the torrent file for a directory called `dir_name`.
pub fn torrent_file_name(dir_name: &str) -> String {
    format!("{dir_name}.torrent")
}
