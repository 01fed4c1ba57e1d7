use crate::errors::{Error, Result};
use crate::index::DownloadDescriptor;
use crate::platform::platform;
use flate2::read::GzDecoder;
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use zip::ZipArchive;

/// Determined from the descriptor URL when the index is parsed, never
/// sniffed from downloaded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    TarXz,
    Zip,
    Other(String),
}

impl ArchiveKind {
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            ArchiveKind::TarGz
        } else if path.ends_with(".tar.xz") {
            ArchiveKind::TarXz
        } else if path.ends_with(".zip") {
            ArchiveKind::Zip
        } else {
            let ext = path.rsplit('.').next().unwrap_or(path);
            ArchiveKind::Other(ext.to_string())
        }
    }

    fn extension(&self) -> &str {
        match self {
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::TarXz => "tar.xz",
            ArchiveKind::Zip => "zip",
            ArchiveKind::Other(ext) => ext,
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Download the descriptor's archive into `staging` and unpack it under
/// `staging/<name>`. The download streams straight to a `.part` file so a
/// dropped connection leaves nothing but an orphan in staging, and the
/// extracted tree only ever exists inside the staging area until the store
/// promotes it.
pub fn fetch_and_extract(
    http: &reqwest::blocking::Client,
    desc: &DownloadDescriptor,
    staging: &Path,
    name: &str,
) -> Result<PathBuf> {
    // Reject unknown archive kinds before a single byte is downloaded.
    let extract: fn(&Path, &Path) -> Result<()> = match desc.kind {
        ArchiveKind::TarGz => extract_tar_gz,
        ArchiveKind::Zip => extract_zip,
        ref other => return Err(Error::UnsupportedArchive(other.to_string())),
    };

    fs::create_dir_all(staging)?;
    let part = staging.join(format!("{name}.{}.part", desc.kind.extension()));

    tracing::debug!(url = %desc.url, "downloading archive");
    let resp = http.get(&desc.url).send()?.error_for_status()?;
    let pb = match resp.content_length() {
        Some(total) => ProgressBar::new(total).with_style(
            ProgressStyle::with_template("{bar:30} {bytes}/{total_bytes} {msg}").unwrap(),
        ),
        None => ProgressBar::new_spinner(),
    };
    pb.set_message(format!("downloading {name}"));
    {
        let mut reader = pb.wrap_read(resp);
        let mut out = fs::File::create(&part)?;
        std::io::copy(&mut reader, &mut out)?;
    }
    pb.finish_and_clear();

    if let Some(expected) = &desc.shasum {
        verify_sha256(&part, expected)?;
    }

    let dest = staging.join(name);
    if dest.exists() {
        // stale leftovers from an interrupted extraction
        fs::remove_dir_all(&dest)?;
    }
    fs::create_dir_all(&dest)?;
    extract(&part, &dest)?;

    fs::remove_file(&part)?;
    Ok(dest)
}

/// Best-effort removal of everything staged under `name`: the extraction
/// dir and any `.part` downloads. Called on any failure after the download
/// started, so no partial state survives an error return.
pub fn discard_staged(staging: &Path, name: &str) {
    let dir = staging.join(name);
    if dir.exists() {
        let _ = fs::remove_dir_all(&dir);
    }
    let prefix = format!("{name}.");
    if let Ok(entries) = std::fs::read_dir(staging) {
        for entry in entries.flatten() {
            let fname = entry.file_name();
            let fname = fname.to_string_lossy();
            if fname.starts_with(&prefix) && fname.ends_with(".part") {
                let _ = fs::remove_file(entry.path());
            }
        }
    }
}

fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let actual = hex::encode(hasher.finalize());
    if actual != expected {
        return Err(Error::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Strip an archive entry path down to safe, destination-relative
/// components. Absolute paths, `..` segments, and drive prefixes are
/// extraction hazards and rejected outright.
fn sanitized_entry_path(raw: &Path) -> Result<PathBuf> {
    let mut safe = PathBuf::new();
    for comp in raw.components() {
        match comp {
            Component::Normal(c) => safe.push(c),
            Component::CurDir => {}
            _ => {
                return Err(Error::Extraction(format!(
                    "entry '{}' escapes the destination",
                    raw.display()
                )))
            }
        }
    }
    Ok(safe)
}

fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    for entry in archive
        .entries()
        .map_err(|e| Error::Extraction(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| Error::Extraction(e.to_string()))?;
        let raw = entry
            .path()
            .map_err(|e| Error::Extraction(e.to_string()))?
            .into_owned();
        let rel = sanitized_entry_path(&raw)?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        // unpack_in creates the parents itself and resolves the target
        // against `dest`, so a symlink entry planted earlier in the
        // archive cannot redirect this write outside the destination.
        // It preserves the entry's mode bits on unix.
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| Error::Extraction(format!("{}: {e}", raw.display())))?;
        if !unpacked {
            return Err(Error::Extraction(format!(
                "entry '{}' escapes the destination",
                raw.display()
            )));
        }
    }
    Ok(())
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::Extraction(e.to_string()))?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::Extraction(e.to_string()))?;
        let rel = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            Error::Extraction(format!("entry '{}' escapes the destination", entry.name()))
        })?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        if entry.unix_mode().map(|m| m & 0o111 != 0).unwrap_or(false) {
            platform().make_executable(&target)?;
        }
    }
    Ok(())
}
