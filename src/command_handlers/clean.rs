use crate::config::InstallDirs;
use crate::store::ToolchainStore;
use anyhow::Result;

pub fn run(dirs: &InstallDirs) -> Result<()> {
    let store = ToolchainStore::new(dirs.clone());
    store.clean()?;
    println!("Removed staging artifacts");
    Ok(())
}
