use std::fmt;
use std::io;
use std::path::PathBuf;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DatasetMissing,
    DatasetParseError,
    ConfigParseError,
    InvalidLayerOrder,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DatasetMissing => "E1001",
            Self::DatasetParseError => "E1002",
            Self::ConfigParseError => "E1003",
            Self::InvalidLayerOrder => "E2001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DatasetMissing => "Traceability data not found",
            Self::DatasetParseError => "Traceability data could not be parsed",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidLayerOrder => "Invalid layer order",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DatasetMissing => {
                Some("Regenerate the traceability output, or pass --data <PATH>.")
            }
            Self::DatasetParseError => {
                Some("Regenerate the traceability output; the JSON is incomplete or malformed.")
            }
            Self::ConfigParseError => Some("Fix syntax in .tracemap/config.toml and retry."),
            Self::InvalidLayerOrder => Some("List each layer name once in [layers] order."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// Snake-case identifier used in structured CLI error output.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::DatasetMissing => "dataset_missing",
            Self::DatasetParseError => "dataset_parse_error",
            Self::ConfigParseError => "config_parse_error",
            Self::InvalidLayerOrder => "invalid_layer_order",
            Self::InternalUnexpected => "internal_unexpected",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while loading the traceability dataset.
///
/// These are caller-boundary failures: once a [`crate::Dataset`] exists the
/// engine never fails on its content.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset file does not exist.
    #[error("traceability data not found at {}", .0.display())]
    Missing(PathBuf),

    /// The dataset file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The JSON is malformed or a required top-level field is absent.
    #[error("invalid traceability data: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DatasetError {
    /// Map to the stable machine code.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Missing(_) => ErrorCode::DatasetMissing,
            Self::Read { .. } => ErrorCode::InternalUnexpected,
            Self::Parse(_) => ErrorCode::DatasetParseError,
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The configured layer order names the same layer twice.
    #[error("layer '{0}' appears more than once in [layers] order")]
    DuplicateLayer(String),
}

impl ConfigError {
    /// Map to the stable machine code.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::DuplicateLayer(_) => ErrorCode::InvalidLayerOrder,
        }
    }
}
