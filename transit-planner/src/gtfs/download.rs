//! Fetching and unpacking feed archives.

use std::fs::File;
use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use zip::ZipArchive;

use super::error::GtfsError;

/// Bytes between progress log lines.
const PROGRESS_STEP: u64 = 10 * 1024 * 1024;

/// Streams the body at `url` into `dest`, replacing any existing file.
///
/// Returns the number of bytes written.
pub async fn download_feed(url: &str, dest: &Path) -> Result<u64, GtfsError> {
    let response = reqwest::get(url).await?.error_for_status()?;
    let total = response.content_length();
    info!(url, bytes = ?total, "Downloading GTFS feed");

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    let mut next_report = PROGRESS_STEP;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;

        if written >= next_report {
            match total {
                Some(total) if total > 0 => {
                    debug!(written, total, percent = written * 100 / total, "Download progress")
                }
                _ => debug!(written, "Download progress"),
            }
            next_report += PROGRESS_STEP;
        }
    }
    file.flush().await?;

    info!(path = %dest.display(), bytes = written, "GTFS feed downloaded");
    Ok(written)
}

/// Extracts the archive at `zip_path` into `dir`.
///
/// `dir` is emptied first so files from an older feed can't linger.
/// Returns the number of archive entries.
pub fn extract_feed(zip_path: &Path, dir: &Path) -> Result<usize, GtfsError> {
    let mut archive = ZipArchive::new(File::open(zip_path)?)?;

    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;

    archive.extract(dir)?;
    info!(path = %dir.display(), entries = archive.len(), "GTFS feed extracted");
    Ok(archive.len())
}
