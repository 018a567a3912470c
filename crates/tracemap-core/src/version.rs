//! File version descriptors.
//!
//! The extractor stamps each file with `git:<rev>` when the file is tracked,
//! `mtime:<RFC 3339 timestamp>` otherwise, or `unknown`.

use chrono::DateTime;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileVersion {
    Git(String),
    Mtime(String),
    Unknown,
    /// Any other non-empty descriptor, kept verbatim.
    Other(String),
}

impl FileVersion {
    /// Parse a raw descriptor. `None` and empty strings are [`FileVersion::Unknown`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("" | "unknown") => Self::Unknown,
            Some(s) => {
                if let Some(rev) = s.strip_prefix("git:") {
                    Self::Git(rev.to_string())
                } else if let Some(ts) = s.strip_prefix("mtime:") {
                    Self::Mtime(ts.to_string())
                } else {
                    Self::Other(s.to_string())
                }
            }
        }
    }

    /// Short form shown next to a file name.
    ///
    /// Timestamps are shown to the minute: `2025-12-26T10:30:45Z` becomes
    /// `2025-12-26 10:30`.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Git(rev) => rev.clone(),
            Self::Mtime(ts) => display_timestamp(ts),
            Self::Unknown => "unknown".to_string(),
            Self::Other(raw) => raw.clone(),
        }
    }
}

impl Serialize for FileVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display())
    }
}

fn display_timestamp(ts: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(ts) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }

    // Not RFC 3339: drop a trailing `:SSZ` and the date/time separator.
    let replaced = ts.replacen('T', " ", 1);
    let bytes = replaced.as_bytes();
    let n = bytes.len();
    if n >= 4
        && bytes[n - 1] == b'Z'
        && bytes[n - 4] == b':'
        && bytes[n - 3].is_ascii_digit()
        && bytes[n - 2].is_ascii_digit()
    {
        replaced[..n - 4].to_string()
    } else {
        replaced
    }
}
