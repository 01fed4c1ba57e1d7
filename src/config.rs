use crate::errors::{Error, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the installation base directory entirely when set.
pub const INSTALL_ENV: &str = "ZV_INSTALL";

/// On-disk layout rooted at the installation base directory:
///
/// ```text
/// <base>/
///   versions/<token>/        installed toolchains
///   current -> versions/<t>  active-version marker
///   staging/                 scratch for downloads and extraction
///   settings.json
///   index-cache.json
/// ```
#[derive(Debug, Clone)]
pub struct InstallDirs {
    base: PathBuf,
}

impl InstallDirs {
    /// Resolve the base directory from `ZV_INSTALL`, falling back to
    /// `~/.zv`. Neither being available is a configuration error, not an
    /// I/O one.
    pub fn resolve() -> Result<Self> {
        let base = match std::env::var_os(INSTALL_ENV) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => dirs::home_dir().ok_or(Error::Configuration)?.join(".zv"),
        };
        Ok(Self { base })
    }

    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn versions(&self) -> PathBuf {
        self.base.join("versions")
    }

    pub fn staging(&self) -> PathBuf {
        self.base.join("staging")
    }

    pub fn current_link(&self) -> PathBuf {
        self.base.join("current")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base.join("settings.json")
    }

    pub fn index_cache(&self) -> PathBuf {
        self.base.join("index-cache.json")
    }

    /// Create the directories mutating commands rely on.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(self.versions())?;
        fs::create_dir_all(self.staging())?;
        Ok(())
    }
}

/// Persisted user preferences. Loaded once at startup and handed to the
/// components that need them; mutations are written back immediately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Overrides the Zig version map URL when non-empty.
    pub version_map_url: Option<String>,
    /// `None` until the user expresses a preference.
    pub use_color: Option<bool>,
}

impl Settings {
    /// A missing or unreadable settings file means a fresh install; start
    /// from defaults rather than failing.
    pub fn load(dirs: &InstallDirs) -> Self {
        let path = dirs.settings_file();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!("ignoring corrupt settings file {path:?}: {e}");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    pub fn save(&self, dirs: &InstallDirs) -> Result<()> {
        fs::create_dir_all(dirs.base())?;
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(dirs.settings_file(), data)?;
        Ok(())
    }

    pub fn version_map_url(&self) -> Option<&str> {
        self.version_map_url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn set_version_map_url(&mut self, dirs: &InstallDirs, url: &str) -> Result<()> {
        self.version_map_url = Some(url.to_string());
        self.save(dirs)
    }

    pub fn reset_version_map_url(&mut self, dirs: &InstallDirs) -> Result<()> {
        self.version_map_url = None;
        self.save(dirs)
    }

    pub fn set_color(&mut self, dirs: &InstallDirs, on: bool) -> Result<()> {
        self.use_color = Some(on);
        self.save(dirs)
    }

    pub fn toggle_color(&mut self, dirs: &InstallDirs) -> Result<()> {
        let on = !self.use_color.unwrap_or(false);
        self.set_color(dirs, on)
    }
}
