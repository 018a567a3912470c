//! File path helpers used to build source-viewer identifiers.
//!
//! The identifiers produced here must match the ones the HTML report embeds
//! for each trace target, so the rules are intentionally literal: split on
//! `/` only, replace every `.` with `_`.

/// Extension used when a file name has no dot-segment.
pub const DEFAULT_EXTENSION: &str = "sh";

/// Extension shown for extension-less files in health listings.
pub const LISTING_EXTENSION: &str = "txt";

/// Prefix for source-viewer element identifiers.
pub const TARGET_ID_PREFIX: &str = "Target_";

/// Return the last `/`-separated segment of `path`.
#[must_use]
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Return the extension of the base file name, or [`DEFAULT_EXTENSION`].
///
/// `archive.tar.gz` yields `gz`; `.gitignore` yields `gitignore`;
/// `Makefile` and names ending in a dot yield the default.
#[must_use]
pub fn file_extension(path: &str) -> &str {
    file_extension_or(path, DEFAULT_EXTENSION)
}

/// Like [`file_extension`], with a caller-chosen fallback.
#[must_use]
pub fn file_extension_or<'a>(path: &'a str, fallback: &'a str) -> &'a str {
    let base = base_name(path);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => fallback,
    }
}

/// Build the source-viewer identifier for a base file name.
#[must_use]
pub fn target_id(base: &str) -> String {
    format!("{TARGET_ID_PREFIX}{}", base.replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_of_nested_paths() {
        assert_eq!(base_name("docs/01_requirements.md"), "01_requirements.md");
        assert_eq!(base_name("a/b/c/d/e.sh"), "e.sh");
        assert_eq!(base_name("file.txt"), "file.txt");
        assert_eq!(base_name(""), "");
    }

    #[test]
    fn extension_uses_last_dot_segment() {
        assert_eq!(file_extension("docs/file.md"), "md");
        assert_eq!(file_extension("scripts/main.sh"), "sh");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension(".gitignore"), "gitignore");
    }

    #[test]
    fn extension_defaults_when_absent() {
        assert_eq!(file_extension("Makefile"), DEFAULT_EXTENSION);
        assert_eq!(file_extension(""), DEFAULT_EXTENSION);
        assert_eq!(file_extension("trailing."), DEFAULT_EXTENSION);
    }

    #[test]
    fn extension_fallback_is_caller_chosen() {
        assert_eq!(file_extension_or("Makefile", LISTING_EXTENSION), "txt");
        assert_eq!(file_extension_or("notes.", LISTING_EXTENSION), "txt");
        assert_eq!(file_extension_or("src/app.rs", LISTING_EXTENSION), "rs");
    }

    #[test]
    fn extension_ignores_dots_in_directories() {
        assert_eq!(file_extension("dir.v2/Makefile"), DEFAULT_EXTENSION);
    }

    #[test]
    fn target_id_replaces_every_dot() {
        assert_eq!(target_id("01_requirements.md"), "Target_01_requirements_md");
        assert_eq!(target_id("archive.tar.gz"), "Target_archive_tar_gz");
        assert_eq!(target_id("Makefile"), "Target_Makefile");
    }
}
