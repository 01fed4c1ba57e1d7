mod cli;
mod command_handlers;
mod config;
mod errors;
mod fetch;
mod index;
mod platform;
mod resolve;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::{InstallDirs, Settings};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let dirs = InstallDirs::resolve()?;
    let mut settings = Settings::load(&dirs);

    if let Some(pref) = cli.color.as_deref() {
        match pref {
            "on" | "yes" | "enabled" => settings.set_color(&dirs, true)?,
            "off" | "no" | "disabled" => settings.set_color(&dirs, false)?,
            _ => settings.toggle_color(&dirs)?,
        }
    }

    command_handlers::dispatch::dispatch(cli.command, &mut settings, &dirs)?;
    Ok(())
}
