use crate::config::InstallDirs;
use crate::errors::{Error, Result};
use crate::platform::platform;
use crate::resolve::{compare_tokens, VersionToken};
use fs_err as fs;
use std::path::{Path, PathBuf};

/// One entry of the installed set, as reported by [`ToolchainStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub token: VersionToken,
    pub path: PathBuf,
    pub active: bool,
}

/// Sole owner of the installed-versions tree and the `current` marker.
/// Mutations are visible to other processes only through whole renames:
/// a version either is in the set or is not, and the marker always points
/// at its old or new target, never nowhere.
pub struct ToolchainStore {
    dirs: InstallDirs,
}

impl ToolchainStore {
    pub fn new(dirs: InstallDirs) -> Self {
        Self { dirs }
    }

    pub fn version_dir(&self, token: &VersionToken) -> PathBuf {
        self.dirs.versions().join(token.as_str())
    }

    pub fn is_installed(&self, token: &VersionToken) -> bool {
        self.version_dir(token).is_dir()
    }

    /// Move a fully staged directory into the installed set under the
    /// version's name. A single rename, so a crash between download and
    /// promotion can never leave a half-installed version: until the
    /// rename lands the token simply is not installed.
    pub fn promote(&self, staged: &Path, token: &VersionToken) -> Result<()> {
        let target = self.version_dir(token);
        if target.exists() {
            return Err(Error::AlreadyInstalled(token.to_string()));
        }
        fs::create_dir_all(self.dirs.versions())?;
        fs::rename(staged, &target)?;
        Ok(())
    }

    /// Repoint the `current` marker at an installed version. The link is
    /// replaced by create-new-then-rename-over-old, never
    /// delete-then-create.
    pub fn activate(&self, token: &VersionToken) -> Result<()> {
        if !self.is_installed(token) {
            return Err(Error::NotInstalled(token.to_string()));
        }
        // relative target keeps the link valid if the base dir moves
        let target = Path::new("versions").join(token.as_str());
        platform().replace_link(&target, &self.dirs.current_link())
    }

    /// The token the marker points at, if any.
    pub fn active(&self) -> Option<VersionToken> {
        let target = std::fs::read_link(self.dirs.current_link()).ok()?;
        let name = target.file_name()?.to_str()?;
        VersionToken::parse(name)
    }

    /// Uninstalling the active version is refused: clearing the marker
    /// behind the user's back would break every shell resolving `current`.
    /// Switch first with `zv use`.
    pub fn uninstall(&self, token: &VersionToken) -> Result<()> {
        let target = self.version_dir(token);
        if !target.is_dir() {
            return Err(Error::NotInstalled(token.to_string()));
        }
        if self.active().as_ref() == Some(token) {
            return Err(Error::ActiveVersion(token.to_string()));
        }
        fs::remove_dir_all(&target)?;
        Ok(())
    }

    /// Installed versions, newest first; the active one is flagged.
    pub fn list(&self) -> Result<Vec<InstalledVersion>> {
        let versions_dir = self.dirs.versions();
        if !versions_dir.is_dir() {
            return Ok(Vec::new());
        }
        let active = self.active();
        let mut installed = Vec::new();
        for entry in fs::read_dir(&versions_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(token) = name.to_str().and_then(VersionToken::parse) else {
                continue;
            };
            installed.push(InstalledVersion {
                active: active.as_ref() == Some(&token),
                path: entry.path(),
                token,
            });
        }
        installed.sort_by(|a, b| compare_tokens(a.token.as_str(), b.token.as_str()));
        Ok(installed)
    }

    /// Merge a staged companion payload (ZLS) into an installed version's
    /// directory, replacing same-named entries from earlier installs.
    pub fn merge_companion(&self, staged: &Path, token: &VersionToken) -> Result<()> {
        let target = self.version_dir(token);
        if !target.is_dir() {
            return Err(Error::NotInstalled(token.to_string()));
        }
        for entry in fs::read_dir(staged)? {
            let entry = entry?;
            let to = target.join(entry.file_name());
            if to.is_dir() {
                fs::remove_dir_all(&to)?;
            } else if to.exists() {
                fs::remove_file(&to)?;
            }
            fs::rename(entry.path(), &to)?;
        }
        fs::remove_dir_all(staged)?;
        Ok(())
    }

    /// Drop leftovers from interrupted installs. Only the staging area is
    /// touched; the versions tree and the marker are out of bounds here.
    pub fn clean(&self) -> Result<()> {
        let staging = self.dirs.staging();
        if !staging.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(&staging)? {
            let entry = entry?;
            if entry.path().is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ToolchainStore) {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = InstallDirs::from_base(tmp.path());
        dirs.ensure().unwrap();
        (tmp, ToolchainStore::new(dirs))
    }

    fn stage(tmp: &tempfile::TempDir, name: &str) -> PathBuf {
        let staged = tmp.path().join("staging").join(name);
        std::fs::create_dir_all(staged.join("bin")).unwrap();
        std::fs::write(staged.join("bin/zig"), b"binary").unwrap();
        staged
    }

    fn token(s: &str) -> VersionToken {
        VersionToken::parse(s).unwrap()
    }

    #[test]
    fn promote_then_list_includes_the_token_once() {
        let (tmp, store) = store();
        let staged = stage(&tmp, "0.11.0-stage");
        store.promote(&staged, &token("0.11.0")).unwrap();

        assert!(!staged.exists(), "staged dir should be moved, not copied");
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].token, token("0.11.0"));
        assert!(!listed[0].active);
        assert!(listed[0].path.join("bin/zig").is_file());
    }

    #[test]
    fn staged_but_unpromoted_versions_are_not_installed() {
        // an install interrupted after download/extract but before the
        // final rename leaves the installed set unchanged
        let (tmp, store) = store();
        stage(&tmp, "0.12.0");
        assert!(!store.is_installed(&token("0.12.0")));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn promote_refuses_an_installed_token() {
        let (tmp, store) = store();
        store
            .promote(&stage(&tmp, "a"), &token("0.11.0"))
            .unwrap();
        let err = store
            .promote(&stage(&tmp, "b"), &token("0.11.0"))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyInstalled(t) if t == "0.11.0"));
    }

    #[test]
    fn activate_requires_an_installed_version() {
        let (_tmp, store) = store();
        let err = store.activate(&token("0.11.0")).unwrap_err();
        assert!(matches!(err, Error::NotInstalled(t) if t == "0.11.0"));
        assert_eq!(store.active(), None);
    }

    #[test]
    fn activate_flags_the_version_in_list() {
        let (tmp, store) = store();
        store.promote(&stage(&tmp, "a"), &token("0.11.0")).unwrap();
        store.activate(&token("0.11.0")).unwrap();

        assert_eq!(store.active(), Some(token("0.11.0")));
        let listed = store.list().unwrap();
        assert!(listed[0].active);
    }

    #[test]
    fn switching_never_leaves_the_marker_dangling() {
        let (tmp, store) = store();
        store.promote(&stage(&tmp, "a"), &token("0.11.0")).unwrap();
        store.promote(&stage(&tmp, "b"), &token("master")).unwrap();

        store.activate(&token("0.11.0")).unwrap();
        for _ in 0..3 {
            store.activate(&token("master")).unwrap();
            assert!(tmp.path().join("current").join("bin/zig").is_file());
            store.activate(&token("0.11.0")).unwrap();
            assert!(tmp.path().join("current").join("bin/zig").is_file());
        }
    }

    #[test]
    fn uninstall_of_the_active_version_is_refused() {
        let (tmp, store) = store();
        store.promote(&stage(&tmp, "a"), &token("0.11.0")).unwrap();
        store.activate(&token("0.11.0")).unwrap();

        let err = store.uninstall(&token("0.11.0")).unwrap_err();
        assert!(matches!(err, Error::ActiveVersion(t) if t == "0.11.0"));
        assert!(store.is_installed(&token("0.11.0")));

        // switching away unblocks the uninstall
        store.promote(&stage(&tmp, "b"), &token("0.12.0")).unwrap();
        store.activate(&token("0.12.0")).unwrap();
        store.uninstall(&token("0.11.0")).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].token, token("0.12.0"));
    }

    #[test]
    fn uninstall_of_an_absent_version_reports_not_installed() {
        let (_tmp, store) = store();
        let err = store.uninstall(&token("0.9.9")).unwrap_err();
        assert!(matches!(err, Error::NotInstalled(_)));
    }

    #[test]
    fn list_orders_newest_first_with_master_on_top() {
        let (tmp, store) = store();
        for v in ["0.10.1", "0.11.0", "master"] {
            store.promote(&stage(&tmp, v), &token(v)).unwrap();
        }
        let listed: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|iv| iv.token.to_string())
            .collect();
        assert_eq!(listed, vec!["master", "0.11.0", "0.10.1"]);
    }

    #[test]
    fn merge_companion_overlays_the_version_dir() {
        let (tmp, store) = store();
        store.promote(&stage(&tmp, "a"), &token("0.11.0")).unwrap();

        let zls = tmp.path().join("staging").join("0.11.0-zls");
        std::fs::create_dir_all(&zls).unwrap();
        std::fs::write(zls.join("zls"), b"zls binary").unwrap();
        store.merge_companion(&zls, &token("0.11.0")).unwrap();

        assert!(!zls.exists());
        let dir = store.version_dir(&token("0.11.0"));
        assert!(dir.join("zls").is_file());
        assert!(dir.join("bin/zig").is_file());
    }

    #[test]
    fn clean_sweeps_staging_but_spares_installs_and_marker() {
        let (tmp, store) = store();
        store.promote(&stage(&tmp, "a"), &token("0.11.0")).unwrap();
        store.activate(&token("0.11.0")).unwrap();

        let staging = tmp.path().join("staging");
        std::fs::write(staging.join("0.12.0.tar.gz.part"), b"partial").unwrap();
        std::fs::create_dir_all(staging.join("0.12.0/bin")).unwrap();

        store.clean().unwrap();
        assert_eq!(std::fs::read_dir(&staging).unwrap().count(), 0);
        assert!(store.is_installed(&token("0.11.0")));
        assert_eq!(store.active(), Some(token("0.11.0")));
    }
}
