//! Derivation of filesystem-safe names from raw remote titles.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Substitution table applied to raw titles before they become path
/// segments. The path separators must never survive; the rest are
/// characters that confuse at least one supported filesystem.
pub const CLEAN_CHARS: &[(char, &str)] = &[
    ('/', "-"),
    ('\\', "-"),
    (':', "-"),
    ('*', "-"),
    ('?', ""),
    ('"', "'"),
    ('<', "-"),
    ('>', "-"),
    ('|', "-"),
];

const MAX_NAME_LEN: usize = 60;

/// Turn a raw remote title into a safe path segment.
///
/// Strips surrounding whitespace and periods, applies [`CLEAN_CHARS`] and
/// bounds the length. Over-long names happen when a sub-header title is
/// accidentally used to describe the content of the folder; the base name is
/// cut at 60 characters with a trailing ".." marker, keeping the extension.
pub fn corrected_name(raw: &str) -> String {
    let mut name: String = raw
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string();

    for (from, to) in CLEAN_CHARS {
        if name.contains(*from) {
            name = name.replace(*from, to);
        }
    }

    if name.chars().count() > MAX_NAME_LEN {
        let (base, extension) = split_extension(&name);
        let truncated: String = base.chars().take(MAX_NAME_LEN).collect();
        name = format!("{truncated}..{extension}");
    }

    name
}

/// Split off the extension, dot included, Python `splitext` style. A leading
/// dot does not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Append a literal suffix such as ".html" to a path without disturbing any
/// dots already in the file name.
pub fn append_extension(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}
