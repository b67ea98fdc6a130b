//! The two-step conversion pipeline: upload, then convert.
//!
//! ```text
//! SelectedFile ──▶ POST /upload ──▶ staged name ──▶ POST /convert ──▶ ConversionResult
//!                  (multipart)                      (JSON + options)
//! ```
//!
//! Each step yields `Result<_, ClientError>` and the pipeline chains them with
//! `?`, so an upload failure never reaches the convert call. Nothing is
//! retried. UI bookkeeping (loading indicator, session) is the caller's job;
//! see [`crate::app::App::convert`].

use crate::api::{ConversionApi, ConvertRequest};
use crate::config::ConversionOptions;
use crate::error::ClientError;
use crate::intake::SelectedFile;
use crate::session::ConversionResult;
use std::time::Instant;
use tracing::{info, warn};

/// Upload `file`, then convert it with `options`.
pub async fn run_conversion<A: ConversionApi>(
    api: &A,
    file: &SelectedFile,
    options: &ConversionOptions,
) -> Result<ConversionResult, ClientError> {
    let start = Instant::now();
    info!("Starting conversion: {} ({} bytes)", file.name(), file.size());

    // ── Step 1: Upload ───────────────────────────────────────────────────
    let staged = upload_step(api, file).await?;

    // ── Step 2: Convert ──────────────────────────────────────────────────
    let result = convert_step(api, &staged, options).await?;

    info!(
        "Conversion complete: {} pages{} in {}ms",
        result.page_count(),
        if result.archive.is_some() { " + archive" } else { "" },
        start.elapsed().as_millis()
    );
    Ok(result)
}

/// Stage `file` on the server and return the server-assigned name.
pub async fn upload_step<A: ConversionApi>(
    api: &A,
    file: &SelectedFile,
) -> Result<String, ClientError> {
    let reply = api.upload(file).await.map_err(|e| {
        warn!("Upload of {} failed: {}", file.name(), e);
        ClientError::upload_failed(None)
    })?;

    if !reply.success {
        warn!("Server rejected upload: {:?}", reply.error);
        return Err(ClientError::upload_failed(reply.error.as_deref()));
    }

    match reply.filename {
        Some(staged) if !staged.is_empty() => {
            info!("Uploaded {} as {}", file.name(), staged);
            Ok(staged)
        }
        _ => {
            warn!("Upload reply reported success without a staged filename");
            Err(ClientError::upload_failed(reply.error.as_deref()))
        }
    }
}

/// Convert a staged upload with `options`.
pub async fn convert_step<A: ConversionApi>(
    api: &A,
    staged: &str,
    options: &ConversionOptions,
) -> Result<ConversionResult, ClientError> {
    let request = ConvertRequest::new(staged, options);

    let reply = api.convert(&request).await.map_err(|e| {
        warn!("Convert request for {} failed: {}", staged, e);
        ClientError::conversion_failed(None)
    })?;

    if !reply.success {
        warn!("Server rejected conversion: {:?}", reply.error);
        return Err(ClientError::conversion_failed(reply.error.as_deref()));
    }

    if let Some(count) = reply.count {
        if count != reply.files.len() {
            warn!(
                "Server reported {} pages but listed {} files",
                count,
                reply.files.len()
            );
        }
    }

    Ok(ConversionResult::new(reply.files, reply.zip_file))
}
