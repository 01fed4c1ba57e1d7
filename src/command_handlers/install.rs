use crate::config::{InstallDirs, Settings};
use crate::errors::Error;
use crate::fetch;
use crate::index::{IndexClient, IndexKind};
use crate::platform::platform;
use crate::resolve::{self, VersionToken};
use crate::store::ToolchainStore;
use anyhow::Result;

pub fn run(version_arg: &str, with_zls: bool, settings: &Settings, dirs: &InstallDirs) -> Result<()> {
    let Some(token) = VersionToken::parse(version_arg) else {
        anyhow::bail!("no version provided");
    };
    dirs.ensure()?;

    let client = IndexClient::new(settings, dirs)?;
    resolve::validate(&client, &token)?;
    if with_zls {
        resolve::validate_zls(&client, &token)?;
    }

    let store = ToolchainStore::new(dirs.clone());
    if store.is_installed(&token) {
        return Err(Error::AlreadyInstalled(token.to_string()).into());
    }

    install_zig(&client, &store, dirs, &token)?;
    store.activate(&token)?;
    println!("Installed Zig {token}");

    if with_zls {
        install_zls(&client, &store, dirs, &token)?;
        println!("Installed ZLS {token}");
    }
    Ok(())
}

fn install_zig(
    client: &IndexClient,
    store: &ToolchainStore,
    dirs: &InstallDirs,
    token: &VersionToken,
) -> Result<()> {
    // master validates without a fetch, but its download descriptor still
    // comes from the index: the alias appears there as a key.
    let index = client.fetch(IndexKind::Zig)?;
    let release = index
        .get(token.as_str())
        .ok_or_else(|| Error::UnsupportedVersion(token.to_string()))?;
    let key = platform().release_key();
    let desc = release
        .download_for(&key)
        .ok_or_else(|| Error::UnsupportedSystem {
            version: token.to_string(),
            platform: key,
        })?;

    let staging = dirs.staging();
    let name = token.to_string();
    let staged = fetch::fetch_and_extract(client.http(), desc, &staging, &name).map_err(|e| {
        fetch::discard_staged(&staging, &name);
        e
    })?;
    store.promote(&staged, token).map_err(|e| {
        fetch::discard_staged(&staging, &name);
        e
    })?;
    Ok(())
}

fn install_zls(
    client: &IndexClient,
    store: &ToolchainStore,
    dirs: &InstallDirs,
    token: &VersionToken,
) -> Result<()> {
    let index = client.fetch(IndexKind::Zls)?;
    let release = index
        .get(token.as_str())
        .ok_or_else(|| Error::UnsupportedZlsVersion(token.to_string()))?;
    let key = platform().release_key();
    let desc = release
        .download_for(&key)
        .ok_or_else(|| Error::UnsupportedSystem {
            version: format!("ZLS {token}"),
            platform: key,
        })?;

    let staging = dirs.staging();
    let name = format!("{token}-zls");
    let staged = fetch::fetch_and_extract(client.http(), desc, &staging, &name).map_err(|e| {
        fetch::discard_staged(&staging, &name);
        e
    })?;
    store.merge_companion(&staged, token).map_err(|e| {
        fetch::discard_staged(&staging, &name);
        e
    })?;
    Ok(())
}
