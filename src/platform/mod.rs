pub fn platform() -> &'static dyn PlatformOps {
    &ConcretePlatform
}

use crate::errors::Result;
use std::path::Path;

pub trait PlatformOps: Sync + Send {
    /// Key the release index uses for this host, e.g. `x86_64-linux`.
    fn release_key(&self) -> String;
    fn make_executable(&self, path: &Path) -> Result<()>;
    /// Repoint `link` at `target` without a window where the link is absent.
    fn replace_link(&self, target: &Path, link: &Path) -> Result<()>;
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UNIX_PLATFORM as ConcretePlatform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WINDOWS_PLATFORM as ConcretePlatform;
