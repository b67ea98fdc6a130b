//! [`ConversionApi`] over HTTP with `reqwest`.
//!
//! Error replies from the server still carry a JSON body, so the status code
//! is never checked before decoding `/upload`, `/convert` and `/cleanup`
//! replies: a 400 with `{"error": "..."}` decodes into a response with
//! `success == false` and the orchestrator shows the server's text. Only a
//! body that is not JSON at all becomes an [`ApiError::Decode`].

use super::wire::{CleanupResponse, ConvertRequest, ConvertResponse, UploadResponse};
use super::{download_path, ConversionApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::intake::{FileContent, SelectedFile, PDF_MIME};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const UPLOAD: &str = "upload";
const CONVERT: &str = "convert";
const CLEANUP: &str = "cleanup";

/// HTTP client for one conversion server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Build a client from the session configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|source| ApiError::Http {
            endpoint: config.base_url.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Root URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of a downloadable file.
    pub fn download_url(&self, filename: &str) -> Result<Url, ApiError> {
        let path = download_path(filename);
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl {
            endpoint: path,
            detail: e.to_string(),
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url, ApiError> {
        self.base_url.join(name).map_err(|e| ApiError::InvalidUrl {
            endpoint: format!("/{name}"),
            detail: e.to_string(),
        })
    }
}

impl ConversionApi for HttpApi {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        let url = self.endpoint(UPLOAD)?;
        let bytes = file.read_bytes().await.map_err(|source| ApiError::Io {
            path: content_path(file),
            source,
        })?;

        debug!("POST {} ({} bytes as '{}')", url, bytes.len(), file.name());

        let part = Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str(part_mime(file.mime()))
            .map_err(|source| ApiError::Http {
                endpoint: url.path().to_string(),
                source,
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Http {
                endpoint: url.path().to_string(),
                source,
            })?;

        decode_json(url.path(), response).await
    }

    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertResponse, ApiError> {
        let url = self.endpoint(CONVERT)?;
        debug!(
            "POST {} (filename={}, format={}, dpi={}, zip={})",
            url, request.filename, request.format, request.dpi, request.zip
        );

        let response = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|source| ApiError::Http {
                endpoint: url.path().to_string(),
                source,
            })?;

        decode_json(url.path(), response).await
    }

    async fn download(&self, filename: &str, dest: &Path) -> Result<u64, ApiError> {
        let url = self.download_url(filename)?;
        let endpoint = url.path().to_string();
        debug!("GET {} → {}", url, dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let io_err = |source| ApiError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let mut out = tokio::fs::File::create(dest).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| ApiError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
            out.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        out.flush().await.map_err(io_err)?;

        Ok(written)
    }

    async fn cleanup(&self) -> Result<CleanupResponse, ApiError> {
        let url = self.endpoint(CLEANUP)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Http {
                endpoint: url.path().to_string(),
                source,
            })?;

        decode_json(url.path(), response).await
    }
}

/// Decode a JSON reply regardless of its status code.
async fn decode_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(|source| ApiError::Http {
        endpoint: endpoint.to_string(),
        source,
    })?;

    serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        status,
        detail: e.to_string(),
    })
}

/// Content type for the upload part.
///
/// Intake accepts any hint mentioning `pdf`; one that is not a well-formed
/// MIME type (e.g. a bare `"pdf"`) is sent as [`PDF_MIME`].
fn part_mime(hint: &str) -> &str {
    if Part::text("").mime_str(hint).is_ok() {
        hint
    } else {
        debug!("MIME hint '{}' is not a valid type; sending {}", hint, PDF_MIME);
        PDF_MIME
    }
}

fn content_path(file: &SelectedFile) -> PathBuf {
    match file.content() {
        FileContent::Path(p) => p.clone(),
        FileContent::Memory(_) => PathBuf::from(file.name()),
    }
}
