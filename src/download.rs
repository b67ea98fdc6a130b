//! Download trigger: fetch a server-hosted file and save it locally.
//!
//! The remote path is always `/download/` + the filename exactly as the
//! server reported it. Locally only the final path component is used, so a
//! name like `../../x.png` can't land outside the download directory.
//!
//! Writes are atomic: bytes stream into a hidden temp file next to the target,
//! which is renamed into place only once the transfer completed. An aborted
//! download leaves nothing behind.

use crate::api::ConversionApi;
use crate::error::{ApiError, ClientError};
use std::path::{Path, PathBuf};
use tracing::info;

/// Download `filename` into `dir`, returning the saved path.
pub async fn trigger_download<A: ConversionApi>(
    api: &A,
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, ClientError> {
    let local_name = local_file_name(filename).ok_or_else(|| ClientError::DownloadFailed {
        filename: filename.to_string(),
        reason: "name has no usable file component".into(),
    })?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ClientError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source,
        })?;

    let dest = dir.join(local_name);
    let tmp = tempfile::Builder::new()
        .prefix(".pdf2img-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|source| ClientError::OutputWriteFailed {
            path: dest.clone(),
            source,
        })?
        .into_temp_path();

    let written = api
        .download(filename, &tmp)
        .await
        .map_err(|e| match e {
            ApiError::Io { path, source } => ClientError::OutputWriteFailed { path, source },
            other => ClientError::DownloadFailed {
                filename: filename.to_string(),
                reason: other.to_string(),
            },
        })?;

    tmp.persist(&dest)
        .map_err(|e| ClientError::OutputWriteFailed {
            path: dest.clone(),
            source: e.error,
        })?;

    info!("Saved {} ({} bytes)", dest.display(), written);
    Ok(dest)
}

/// Final path component of a server filename, if it has one.
pub fn local_file_name(filename: &str) -> Option<&str> {
    // Treat both separators as separators regardless of the host OS.
    let last = filename.rsplit(['/', '\\']).next()?;
    match last {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
