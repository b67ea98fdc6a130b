//! Configuration types for the conversion client.
//!
//! Two structs, two lifetimes:
//!
//! * [`ClientConfig`] — fixed for the life of an [`crate::app::App`]: where the
//!   server lives, how big an upload may be, how long error banners stay up,
//!   where downloads land. Built via [`ClientConfigBuilder`].
//! * [`ConversionOptions`] — the user-facing knobs (format, DPI, archive)
//!   read from the view at the moment `convert` runs. Never persisted.

use crate::error::ClientError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Largest accepted upload: 20 MiB.
pub const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// How long an error banner stays visible before auto-dismissal.
pub const ERROR_DISMISS_MS: u64 = 5000;

/// Server address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// DPI the server uses when the option is left at its default.
pub const DEFAULT_DPI: u32 = 150;

/// Configuration for a conversion client session.
///
/// # Example
/// ```rust
/// use pdf2img_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:8080")
///     .download_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Root of the conversion server. Always ends with `/` so endpoint paths
    /// join underneath it rather than replacing its last segment.
    pub base_url: Url,

    /// Per-request timeout in seconds. Default: `None` (transport default).
    pub request_timeout_secs: Option<u64>,

    /// Upload size limit in bytes. Default: [`MAX_FILE_SIZE`].
    pub max_file_size: u64,

    /// Error banner lifetime in milliseconds. Default: [`ERROR_DISMISS_MS`].
    pub error_dismiss_ms: u64,

    /// Directory downloads are saved into. Default: current directory.
    pub download_dir: PathBuf,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            max_file_size: MAX_FILE_SIZE,
            error_dismiss_ms: ERROR_DISMISS_MS,
            download_dir: PathBuf::from("."),
            user_agent: concat!("pdf2img-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_file_size", &self.max_file_size)
            .field("error_dismiss_ms", &self.error_dismiss_ms)
            .field("download_dir", &self.download_dir)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
            base_url: None,
        }
    }

    /// Banner lifetime as a [`Duration`].
    pub fn error_dismiss_after(&self) -> Duration {
        Duration::from_millis(self.error_dismiss_ms)
    }
}

fn default_base_url() -> Url {
    // A literal that always parses; the fallback is unreachable in practice.
    Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!("default base URL is valid"))
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
    base_url: Option<String>,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn error_dismiss_ms(mut self, ms: u64) -> Self {
        self.config.error_dismiss_ms = ms;
        self
    }

    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.download_dir = dir.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ClientConfig, ClientError> {
        if let Some(raw) = self.base_url.take() {
            self.config.base_url = parse_base_url(&raw)?;
        }
        let c = &self.config;
        if c.max_file_size == 0 {
            return Err(ClientError::InvalidConfig(
                "Maximum file size must be ≥ 1 byte".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(ClientError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Parse a server root, forcing a trailing slash.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ClientError::InvalidConfig(format!("Invalid server URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidConfig(format!(
            "Server URL must be http or https, got '{other}'"
        ))),
    }
}

// ── Conversion options ───────────────────────────────────────────────────

/// Image format the server should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Wire value sent in the convert request.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected png or jpeg)"
            ))),
        }
    }
}

/// User-chosen options for one conversion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    format: OutputFormat,
    dpi: u32,
    zip: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            dpi: DEFAULT_DPI,
            zip: false,
        }
    }
}

impl ConversionOptions {
    /// Validated constructor: DPI must be a positive integer.
    pub fn new(format: OutputFormat, dpi: u32, zip: bool) -> Result<Self, ClientError> {
        if dpi == 0 {
            return Err(ClientError::InvalidConfig("DPI must be ≥ 1".into()));
        }
        Ok(Self { format, dpi, zip })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Whether the server should package all pages into one archive.
    pub fn zip(&self) -> bool {
        self.zip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.max_file_size, 20_971_520);
        assert_eq!(c.error_dismiss_after(), Duration::from_secs(5));
        assert_eq!(c.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(c.request_timeout_secs, None);
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let c = ClientConfig::builder()
            .base_url("https://convert.example.com/api")
            .build()
            .unwrap();
        assert_eq!(c.base_url.as_str(), "https://convert.example.com/api/");
        assert_eq!(
            c.base_url.join("upload").unwrap().as_str(),
            "https://convert.example.com/api/upload"
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(ClientConfig::builder().base_url("not a url").build().is_err());
        assert!(ClientConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .is_err());
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(ClientConfig::builder().max_file_size(0).build().is_err());
        assert!(ClientConfig::builder()
            .request_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert!("tiff".parse::<OutputFormat>().is_err());
        assert_eq!(
            serde_json::to_string(&OutputFormat::Jpeg).unwrap(),
            "\"jpeg\""
        );
    }

    #[test]
    fn options_require_positive_dpi() {
        assert!(ConversionOptions::new(OutputFormat::Png, 0, false).is_err());
        let o = ConversionOptions::new(OutputFormat::Jpeg, 300, true).unwrap();
        assert_eq!(o.dpi(), 300);
        assert!(o.zip());
        assert_eq!(ConversionOptions::default().dpi(), DEFAULT_DPI);
    }
}
