//! The conversion server's API surface.
//!
//! ```text
//! POST /upload            multipart `file`      → UploadResponse
//! POST /convert           JSON ConvertRequest   → ConvertResponse
//! GET  /download/{name}   raw bytes
//! POST /cleanup           (empty)               → CleanupResponse
//! ```
//!
//! [`ConversionApi`] is the seam between the orchestration logic and the
//! network: [`HttpApi`] talks to a real server, tests plug in a scripted
//! implementation.

pub mod http;
pub mod wire;

pub use http::HttpApi;
pub use wire::{CleanupResponse, ConvertRequest, ConvertResponse, UploadResponse};

use crate::error::ApiError;
use crate::intake::SelectedFile;
use std::future::Future;
use std::path::Path;

/// Path prefix under which converted files are served.
pub const DOWNLOAD_PREFIX: &str = "/download/";

/// Server-relative path of a downloadable file: the prefix plus `filename`,
/// untouched.
pub fn download_path(filename: &str) -> String {
    format!("{DOWNLOAD_PREFIX}{filename}")
}

/// The four calls a client makes against the conversion server.
///
/// Implementations report transport problems as [`ApiError`]; a well-formed
/// reply with `success: false` is *not* an error at this layer.
pub trait ConversionApi: Send + Sync {
    /// Stage `file` on the server.
    fn upload(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<UploadResponse, ApiError>> + Send;

    /// Rasterise a previously staged file.
    fn convert(
        &self,
        request: &ConvertRequest,
    ) -> impl Future<Output = Result<ConvertResponse, ApiError>> + Send;

    /// Fetch `/download/{filename}` into `dest`, returning the byte count.
    fn download(
        &self,
        filename: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<u64, ApiError>> + Send;

    /// Ask the server to purge staged uploads and outputs.
    fn cleanup(&self) -> impl Future<Output = Result<CleanupResponse, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_path_is_verbatim() {
        assert_eq!(download_path("page_1.png"), "/download/page_1.png");
        assert_eq!(
            download_path("converted_images_1a2b3c4d.zip"),
            "/download/converted_images_1a2b3c4d.zip"
        );
        assert_eq!(download_path("a b%20c.png"), "/download/a b%20c.png");
    }
}
