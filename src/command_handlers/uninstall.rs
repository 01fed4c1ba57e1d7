use crate::config::InstallDirs;
use crate::resolve::VersionToken;
use crate::store::ToolchainStore;
use anyhow::Result;

pub fn run(version_arg: &str, dirs: &InstallDirs) -> Result<()> {
    let Some(token) = VersionToken::parse(version_arg) else {
        anyhow::bail!("no version provided");
    };
    let store = ToolchainStore::new(dirs.clone());
    store.uninstall(&token)?;
    println!("Uninstalled Zig {token}");
    Ok(())
}
