use crate::config::{InstallDirs, Settings};
use crate::index::ZIG_INDEX_URL;
use anyhow::Result;

/// Known aliases for distribution servers that mirror the Zig index schema.
const MACH_INDEX_URL: &str = "https://machengine.org/zig/index.json";

pub fn run(url: &str, settings: &mut Settings, dirs: &InstallDirs) -> Result<()> {
    match url {
        "default" => {
            settings.reset_version_map_url(dirs)?;
            println!("Version map reset to {ZIG_INDEX_URL}");
        }
        "mach" => {
            settings.set_version_map_url(dirs, MACH_INDEX_URL)?;
            println!("Version map set to {MACH_INDEX_URL}");
        }
        custom => {
            if !custom.starts_with("http://") && !custom.starts_with("https://") {
                anyhow::bail!("version map URL must be http(s): got '{custom}'");
            }
            settings.set_version_map_url(dirs, custom)?;
            println!("Version map set to {custom}");
        }
    }
    Ok(())
}
