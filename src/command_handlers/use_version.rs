use crate::config::InstallDirs;
use crate::resolve::VersionToken;
use crate::store::ToolchainStore;
use anyhow::Result;

pub fn run(version_arg: &str, dirs: &InstallDirs) -> Result<()> {
    let Some(token) = VersionToken::parse(version_arg) else {
        anyhow::bail!("no version provided");
    };
    let store = ToolchainStore::new(dirs.clone());
    store.activate(&token)?;
    println!("Switched to Zig {token}");
    Ok(())
}
