pub mod clean;
pub mod dispatch;
pub mod install;
pub mod list;
pub mod uninstall;
pub mod use_version;
pub mod vmu;
