use crate::errors::Result;
use crate::platform::PlatformOps;
use std::path::Path;

pub static WINDOWS_PLATFORM: Windows = Windows;

pub struct Windows;

impl PlatformOps for Windows {
    fn release_key(&self) -> String {
        format!("{}-windows", std::env::consts::ARCH)
    }

    fn make_executable(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn replace_link(&self, target: &Path, link: &Path) -> Result<()> {
        use std::os::windows::fs::symlink_dir;
        let tmp = link.with_file_name(".current.tmp");
        if tmp.exists() {
            std::fs::remove_dir(&tmp)?;
        }
        symlink_dir(target, &tmp)?;
        // Windows cannot rename over an existing directory symlink, so the
        // old link is removed first. The window is as small as it can be
        // made without transactional NTFS.
        if link.exists() {
            std::fs::remove_dir(link)?;
        }
        std::fs::rename(&tmp, link)?;
        Ok(())
    }
}
