//! JSON bodies exchanged with the conversion server.
//!
//! Every response carries a `success` flag, but error replies from the server
//! (HTTP 400/404/500) omit it and only set `error`, so `success` defaults to
//! `false` when absent.

use crate::config::{ConversionOptions, OutputFormat};
use serde::{Deserialize, Serialize};

/// Reply to `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    /// Server-assigned staged identifier, fed into the convert call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// The sanitised name the server saw before staging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub filename: String,
    pub format: OutputFormat,
    pub dpi: u32,
    pub zip: bool,
}

impl ConvertRequest {
    /// Pair a staged filename with the options read at convert time.
    pub fn new(staged_filename: impl Into<String>, options: &ConversionOptions) -> Self {
        Self {
            filename: staged_filename.into(),
            format: options.format(),
            dpi: options.dpi(),
            zip: options.zip(),
        }
    }
}

/// Reply to `POST /convert`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    #[serde(default)]
    pub success: bool,
    /// Output filenames in page order.
    #[serde(default)]
    pub files: Vec<String>,
    /// Present only when packaging was requested and succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to `POST /cleanup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_reply_without_success_flag() {
        let r: UploadResponse =
            serde_json::from_str(r#"{"error": "No file selected"}"#).unwrap();
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("No file selected"));
        assert_eq!(r.filename, None);
    }

    #[test]
    fn upload_success_reply() {
        let r: UploadResponse = serde_json::from_str(
            r#"{"success": true, "filename": "ab12_doc.pdf", "original_name": "doc.pdf"}"#,
        )
        .unwrap();
        assert!(r.success);
        assert_eq!(r.filename.as_deref(), Some("ab12_doc.pdf"));
        assert_eq!(r.original_name.as_deref(), Some("doc.pdf"));
    }

    #[test]
    fn convert_request_body_shape() {
        let opts = ConversionOptions::new(OutputFormat::Jpeg, 200, true).unwrap();
        let body = serde_json::to_value(ConvertRequest::new("ab12_doc.pdf", &opts)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "filename": "ab12_doc.pdf",
                "format": "jpeg",
                "dpi": 200,
                "zip": true
            })
        );
    }

    #[test]
    fn convert_reply_keeps_page_order() {
        let r: ConvertResponse = serde_json::from_str(
            r#"{"success": true, "files": ["page_1.png", "page_2.png", "page_3.png"], "count": 3}"#,
        )
        .unwrap();
        assert_eq!(r.files, ["page_1.png", "page_2.png", "page_3.png"]);
        assert_eq!(r.zip_file, None);
        assert_eq!(r.count, Some(3));
    }
}
