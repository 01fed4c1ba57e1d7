use crate::cli::Commands;
use crate::command_handlers::{clean, install, list, uninstall, use_version, vmu};
use crate::config::{InstallDirs, Settings};
use anyhow::Result;

pub fn dispatch(cmd: Commands, settings: &mut Settings, dirs: &InstallDirs) -> Result<()> {
    match cmd {
        Commands::Install { version, zls } => install::run(&version, zls, settings, dirs),
        Commands::Use { version } => use_version::run(&version, dirs),
        Commands::List { all } => list::run(all, settings, dirs),
        Commands::Uninstall { version } => uninstall::run(&version, dirs),
        Commands::Clean => clean::run(dirs),
        Commands::Vmu { url } => vmu::run(&url, settings, dirs),
    }
}
