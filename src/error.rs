//! Error types for the pdf2img-client library.
//!
//! Two error types reflect two layers:
//!
//! * [`ClientError`] — **User-facing**: every variant's `Display` text is the
//!   message shown in the error banner. Returned by the [`crate::app::App`]
//!   operations and routed through the [`crate::notifier::ErrorNotifier`].
//!
//! * [`ApiError`] — **Transport**: what went wrong on the wire (connection
//!   refused, non-JSON body, write failure). These are logged and then folded
//!   into the generic [`ClientError`] message for the step that failed, so a
//!   dropped connection looks exactly like a `{ "success": false }` reply.

use std::path::PathBuf;
use thiserror::Error;

/// Fallback banner text when the upload step fails without server text.
pub const GENERIC_UPLOAD_FAILURE: &str = "Upload failed";

/// Fallback banner text when the convert step fails without server text.
pub const GENERIC_CONVERSION_FAILURE: &str = "Conversion failed";

/// Fallback banner text when the cleanup call fails without server text.
pub const GENERIC_CLEANUP_FAILURE: &str = "Cleanup failed";

/// All errors surfaced to the user by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Intake errors ─────────────────────────────────────────────────────
    /// The selected file's MIME type does not indicate PDF content.
    #[error("Please select a valid PDF file.")]
    InvalidType { mime: String },

    /// The selected file is larger than the configured limit.
    #[error("File size must be less than {}MB.", limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },

    /// The local file could not be inspected or read.
    #[error("Could not read '{path}': {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// `convert` was invoked with nothing selected.
    #[error("Please select a file first.")]
    NoFileSelected,

    /// `convert` was invoked while another conversion was still running.
    #[error("A conversion is already in progress.")]
    ConversionInProgress,

    /// The upload step failed; `message` is the server text when present.
    #[error("{message}")]
    UploadFailed { message: String },

    /// The convert step failed; `message` is the server text when present.
    #[error("{message}")]
    ConversionFailed { message: String },

    // ── Download / housekeeping errors ────────────────────────────────────
    /// Fetching `/download/{filename}` failed.
    #[error("Failed to download '{filename}': {reason}")]
    DownloadFailed { filename: String, reason: String },

    /// The downloaded file could not be written to disk.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server refused or failed the cleanup request.
    #[error("{message}")]
    CleanupFailed { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or option validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Build an [`ClientError::UploadFailed`], preferring the server's text.
    pub fn upload_failed(server_text: Option<&str>) -> Self {
        ClientError::UploadFailed {
            message: prefer_server_text(server_text, GENERIC_UPLOAD_FAILURE),
        }
    }

    /// Build a [`ClientError::ConversionFailed`], preferring the server's text.
    pub fn conversion_failed(server_text: Option<&str>) -> Self {
        ClientError::ConversionFailed {
            message: prefer_server_text(server_text, GENERIC_CONVERSION_FAILURE),
        }
    }

    /// Build a [`ClientError::CleanupFailed`], preferring the server's text.
    pub fn cleanup_failed(server_text: Option<&str>) -> Self {
        ClientError::CleanupFailed {
            message: prefer_server_text(server_text, GENERIC_CLEANUP_FAILURE),
        }
    }
}

fn prefer_server_text(server_text: Option<&str>, fallback: &str) -> String {
    match server_text.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

/// A failure talking to the conversion server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS, timeout or other transport failure.
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON document.
    #[error("Unexpected response from {endpoint} (HTTP {status}): {detail}")]
    Decode {
        endpoint: String,
        status: u16,
        detail: String,
    },

    /// The server answered a download with a non-success status.
    #[error("HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Local I/O while reading the upload or writing a download.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured base URL cannot address the endpoint.
    #[error("Invalid URL for {endpoint}: {detail}")]
    InvalidUrl { endpoint: String, detail: String },
}
