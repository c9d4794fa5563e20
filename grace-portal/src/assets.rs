//! Copies media out of the site's original zip archive into the static
//! directory, keeping each entry's relative path.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

/// Extensions copied by `extract_media`, lower-case and without the dot.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "webp", "avif", "mp4", "webm", "ogg", "pdf",
];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("archive not found: {0} (place Hotel.zip there or pass its path)")]
    MissingArchive(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    pub copied: usize,
    pub ignored: usize,
    pub unsafe_paths: usize,
}

pub fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEDIA_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

pub fn extract_media(archive_path: &Path, static_dir: &Path) -> Result<ExtractReport, AssetError> {
    if !archive_path.is_file() {
        return Err(AssetError::MissingArchive(archive_path.to_path_buf()));
    }
    fs::create_dir_all(static_dir)?;

    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let mut report = ExtractReport::default();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        // Rejects absolute paths and `..` components.
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(entry = entry.name(), "skipping entry with unsafe path");
            report.unsafe_paths += 1;
            continue;
        };

        if !is_media(&relative) {
            report.ignored += 1;
            continue;
        }

        let target = static_dir.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        tracing::debug!(path = %relative.display(), "copied");
        report.copied += 1;
    }

    tracing::info!(
        copied = report.copied,
        ignored = report.ignored,
        unsafe_paths = report.unsafe_paths,
        "media extraction finished"
    );
    Ok(report)
}
