use thiserror::Error;

/// Every failure in the engine keeps its kind so the dispatcher can decide
/// messaging; nothing is downgraded to a generic error on the way up.
#[derive(Debug, Error)]
pub enum Error {
    #[error("env 'ZV_INSTALL' is not set and no home directory could be found")]
    Configuration,

    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The index endpoint returned something that is not JSON at all.
    #[error("invalid version map format: {0}")]
    MalformedIndex(#[source] serde_json::Error),

    /// Valid JSON, but not the shape either index schema promises.
    #[error("version map has an unexpected shape: {0}")]
    IndexShape(String),

    #[error("unsupported Zig version '{0}'")]
    UnsupportedVersion(String),

    #[error("unsupported ZLS version '{0}'")]
    UnsupportedZlsVersion(String),

    #[error("unsupported archive type '{0}'")]
    UnsupportedArchive(String),

    #[error("no {version} release for {platform}")]
    UnsupportedSystem { version: String, platform: String },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("archive extraction failed: {0}")]
    Extraction(String),

    #[error("Zig {0} is already installed")]
    AlreadyInstalled(String),

    #[error("Zig {0} is not installed")]
    NotInstalled(String),

    #[error("Zig {0} is the active version; run `zv use <version>` to switch away before uninstalling it")]
    ActiveVersion(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
