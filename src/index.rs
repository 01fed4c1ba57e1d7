use crate::config::{InstallDirs, Settings};
use crate::errors::{Error, Result};
use crate::fetch::ArchiveKind;
use fs_err as fs;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const ZIG_INDEX_URL: &str = "https://ziglang.org/download/index.json";
pub const ZLS_INDEX_URL: &str =
    "https://zigtools-releases.nyc3.digitaloceanspaces.com/zls/index.json";

const USER_AGENT: &str = concat!("zv/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The two toolchain families zv manages. Their indexes live at different
/// URLs and use different schemas, normalized into one [`ReleaseIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Zig,
    Zls,
}

/// One (platform, architecture) download of one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub url: String,
    pub kind: ArchiveKind,
    pub shasum: Option<String>,
}

/// One release: platform key (e.g. `x86_64-linux`) to download descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    pub downloads: BTreeMap<String, DownloadDescriptor>,
    /// `master` entries carry the concrete version they were built from.
    pub version: Option<String>,
}

impl Release {
    pub fn download_for(&self, platform_key: &str) -> Option<&DownloadDescriptor> {
        self.downloads.get(platform_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseIndex {
    pub releases: BTreeMap<String, Release>,
}

impl ReleaseIndex {
    pub fn contains(&self, token: &str) -> bool {
        self.releases.contains_key(token)
    }

    pub fn get(&self, token: &str) -> Option<&Release> {
        self.releases.get(token)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.releases.keys().map(String::as_str)
    }
}

/// Shared blocking HTTP client: identifying User-Agent, bounded timeout.
pub fn http_client() -> Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Fetches and normalizes the remote release indexes. No retries here: a
/// transport failure surfaces as [`Error::Network`] and retry policy, if
/// any, belongs to the caller.
pub struct IndexClient {
    http: reqwest::blocking::Client,
    zig_url: String,
    zls_url: String,
    cache_path: PathBuf,
}

impl IndexClient {
    pub fn new(settings: &Settings, dirs: &InstallDirs) -> Result<Self> {
        let zig_url = settings
            .version_map_url()
            .unwrap_or(ZIG_INDEX_URL)
            .to_string();
        Ok(Self {
            http: http_client()?,
            zig_url,
            zls_url: ZLS_INDEX_URL.to_string(),
            cache_path: dirs.index_cache(),
        })
    }

    pub fn http(&self) -> &reqwest::blocking::Client {
        &self.http
    }

    /// fetch -> parse -> (on success) persist cache -> return. The cache
    /// write is a diagnostic convenience and must never fail the fetch.
    pub fn fetch(&self, kind: IndexKind) -> Result<ReleaseIndex> {
        let url = match kind {
            IndexKind::Zig => &self.zig_url,
            IndexKind::Zls => &self.zls_url,
        };
        tracing::debug!(url = %url, "fetching release index");
        let body = self.http.get(url).send()?.error_for_status()?.text()?;
        let index = parse_index(kind, &body)?;
        if kind == IndexKind::Zig {
            if let Err(e) = fs::write(&self.cache_path, &body) {
                tracing::warn!("could not cache release index at {:?}: {e}", self.cache_path);
            }
        }
        Ok(index)
    }

    #[cfg(test)]
    fn with_urls(zig_url: &str, zls_url: &str, cache_path: PathBuf) -> Self {
        Self {
            http: http_client().unwrap(),
            zig_url: zig_url.to_string(),
            zls_url: zls_url.to_string(),
            cache_path,
        }
    }
}

/// Normalize either remote schema into a [`ReleaseIndex`]. A JSON syntax
/// error means the server sent garbage ([`Error::MalformedIndex`]); valid
/// JSON of the wrong shape means the schema moved ([`Error::IndexShape`]).
pub fn parse_index(kind: IndexKind, body: &str) -> Result<ReleaseIndex> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        use serde_json::error::Category;
        match e.classify() {
            Category::Syntax | Category::Eof => Error::MalformedIndex(e),
            _ => Error::IndexShape(e.to_string()),
        }
    })?;

    let releases = match kind {
        IndexKind::Zig => &value,
        IndexKind::Zls => value
            .get("versions")
            .ok_or_else(|| Error::IndexShape("missing 'versions' field".to_string()))?,
    };
    let releases = releases
        .as_object()
        .ok_or_else(|| Error::IndexShape("version map is not an object".to_string()))?;

    let mut index = ReleaseIndex::default();
    for (token, entry) in releases {
        let entry = entry.as_object().ok_or_else(|| {
            Error::IndexShape(format!("release entry '{token}' is not an object"))
        })?;
        let mut release = Release {
            version: entry
                .get("version")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            ..Release::default()
        };
        for (key, member) in entry {
            // Platform members carry a tarball URL; everything else
            // (date, notes, docs links) is metadata.
            let Some(url) = member.get("tarball").and_then(|t| t.as_str()) else {
                continue;
            };
            let shasum = member
                .get("shasum")
                .and_then(|s| s.as_str())
                .map(str::to_string);
            release.downloads.insert(
                key.clone(),
                DownloadDescriptor {
                    url: url.to_string(),
                    kind: ArchiveKind::from_url(url),
                    shasum,
                },
            );
        }
        index.releases.insert(token.clone(), release);
    }
    Ok(index)
}
