use crate::config::{InstallDirs, Settings};
use crate::index::{IndexClient, IndexKind};
use crate::resolve::compare_tokens;
use crate::store::ToolchainStore;
use anyhow::Result;

pub fn run(all: bool, settings: &Settings, dirs: &InstallDirs) -> Result<()> {
    if all {
        list_remote(settings, dirs)
    } else {
        list_installed(dirs)
    }
}

fn list_installed(dirs: &InstallDirs) -> Result<()> {
    let store = ToolchainStore::new(dirs.clone());
    let installed = store.list()?;
    if installed.is_empty() {
        println!("No Zig versions installed. Run `zv install <version>` to get started.");
        return Ok(());
    }
    for entry in installed {
        if entry.active {
            println!("{} (active)", entry.token);
        } else {
            println!("{}", entry.token);
        }
    }
    Ok(())
}

fn list_remote(settings: &Settings, dirs: &InstallDirs) -> Result<()> {
    tracing::debug!(url = ?settings.version_map_url(), "version map override");
    let client = IndexClient::new(settings, dirs)?;
    let index = client.fetch(IndexKind::Zig)?;
    let mut tokens: Vec<&str> = index.tokens().collect();
    tokens.sort_by(|a, b| compare_tokens(a, b));
    for token in tokens {
        // show what master currently builds as, when the index says
        match index.get(token).and_then(|r| r.version.as_deref()) {
            Some(version) => println!("{token} ({version})"),
            None => println!("{token}"),
        }
    }
    Ok(())
}
