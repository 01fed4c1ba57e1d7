use crate::errors::Result;
use crate::platform::PlatformOps;
use std::path::Path;

pub static UNIX_PLATFORM: Unix = Unix;

pub struct Unix;

impl PlatformOps for Unix {
    fn release_key(&self) -> String {
        format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)
    }

    fn make_executable(&self, path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
        Ok(())
    }

    fn replace_link(&self, target: &Path, link: &Path) -> Result<()> {
        use std::os::unix::fs::symlink;
        // Create the new link under a scratch name, then rename it over the
        // old one. rename(2) replaces atomically, so a concurrent reader
        // sees either the old target or the new one, never nothing.
        let tmp = scratch_name(link);
        let _ = std::fs::remove_file(&tmp);
        symlink(target, &tmp)?;
        std::fs::rename(&tmp, link)?;
        Ok(())
    }
}

fn scratch_name(link: &Path) -> std::path::PathBuf {
    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "link".to_string());
    link.with_file_name(format!(".{name}.tmp"))
}
