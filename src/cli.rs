use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version,
    name = "zv",
    about = "Manage Zig compiler and ZLS language server versions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Color output preference (on|off|toggle); persisted to settings
    #[arg(long, global = true, value_name = "WHEN")]
    pub color: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and install a version of Zig.
    /// Use `master` for the latest unstable build.
    #[command(alias = "i")]
    Install {
        /// Zig version to install (e.g. 0.11.0, or master)
        #[arg(value_name = "VERSION")]
        version: String,
        /// Also install the matching ZLS release
        #[arg(long, short = 'z')]
        zls: bool,
    },
    /// Switch the active Zig version
    Use {
        #[arg(value_name = "VERSION")]
        version: String,
    },
    /// List installed Zig versions
    #[command(alias = "ls")]
    List {
        /// List remote versions available for download instead
        #[arg(long, short = 'a')]
        all: bool,
    },
    /// Remove an installed version of Zig
    #[command(alias = "rm")]
    Uninstall {
        #[arg(value_name = "VERSION")]
        version: String,
    },
    /// Remove leftover download and staging artifacts
    Clean,
    /// Set the version map URL for custom Zig distribution servers
    Vmu {
        /// New index URL, or `default` to reset
        #[arg(value_name = "URL")]
        url: String,
    },
}
