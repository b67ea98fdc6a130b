//! File intake: describe a user-chosen file and validate it for upload.
//!
//! Validation is shallow: the MIME hint must mention `pdf` and the size must
//! fit the upload limit. Anything deeper (page count, encryption)
//! is the server's business.

use crate::error::ClientError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// MIME type reported for PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// Where the bytes of a [`SelectedFile`] come from.
#[derive(Debug, Clone)]
pub enum FileContent {
    /// Read from disk when the upload starts.
    Path(PathBuf),
    /// Already in memory (drag & drop from another app, tests).
    Memory(Arc<[u8]>),
}

/// The user's chosen input file.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    size: u64,
    mime: String,
    content: FileContent,
}

impl SelectedFile {
    /// Describe an in-memory file. The size is the length of `bytes`.
    pub fn from_bytes(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime: mime.into(),
            content: FileContent::Memory(bytes),
        }
    }

    /// Describe a file on disk without reading it fully.
    ///
    /// The MIME hint comes from the extension; files without a known
    /// extension are sniffed for the `%PDF` magic bytes.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let unreadable = |source| ClientError::FileUnreadable {
            path: path.clone(),
            source,
        };

        let meta = tokio::fs::metadata(&path).await.map_err(unreadable)?;
        if !meta.is_file() {
            return Err(unreadable(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let mime = match mime_from_extension(&path) {
            Some(mime) => mime.to_string(),
            None => sniff_mime(&path).await.map_err(unreadable)?.to_string(),
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Described {} ({} bytes, {})", path.display(), meta.len(), mime);

        Ok(Self {
            name,
            size: meta.len(),
            mime,
            content: FileContent::Path(path),
        })
    }

    /// Construct a description with an explicit size, e.g. from a file picker
    /// that reports metadata separately from the content.
    pub fn with_metadata(
        name: impl Into<String>,
        size: u64,
        mime: impl Into<String>,
        content: FileContent,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
            content,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// The reported MIME type; a hint, never verified against the content.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Load the full content for upload.
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            FileContent::Path(p) => tokio::fs::read(p).await,
            FileContent::Memory(b) => Ok(b.to_vec()),
        }
    }
}

/// Check a file against the intake rules.
///
/// Type is checked before size, so an oversized PNG reports `InvalidType`.
pub fn validate_file(file: &SelectedFile, max_size: u64) -> Result<(), ClientError> {
    if !file.mime.to_ascii_lowercase().contains("pdf") {
        return Err(ClientError::InvalidType {
            mime: file.mime.clone(),
        });
    }
    if file.size > max_size {
        return Err(ClientError::TooLarge {
            size: file.size,
            limit: max_size,
        });
    }
    Ok(())
}

/// Best-effort MIME guess from the extension, as a browser file picker does.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => PDF_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };
    Some(mime)
}

async fn sniff_mime(path: &Path) -> std::io::Result<&'static str> {
    use tokio::io::AsyncReadExt;

    let mut f = tokio::fs::File::open(path).await?;
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        let n = f.read(&mut magic[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == magic.len() && &magic == b"%PDF" {
        Ok(PDF_MIME)
    } else {
        Ok("application/octet-stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_of_size(size: usize) -> SelectedFile {
        SelectedFile::from_bytes("doc.pdf", PDF_MIME, vec![0u8; size])
    }

    #[test]
    fn accepts_pdf_at_the_limit() {
        let f = pdf_of_size(20 * 1024 * 1024);
        assert!(validate_file(&f, 20 * 1024 * 1024).is_ok());
    }

    #[test]
    fn rejects_pdf_one_byte_over() {
        let f = pdf_of_size(20 * 1024 * 1024 + 1);
        let err = validate_file(&f, 20 * 1024 * 1024).unwrap_err();
        assert!(matches!(err, ClientError::TooLarge { .. }), "got: {err:?}");
    }

    #[test]
    fn rejects_non_pdf_types() {
        for mime in ["image/png", "text/plain", "", "application/octet-stream"] {
            let f = SelectedFile::from_bytes("x", mime, vec![1u8, 2, 3]);
            let err = validate_file(&f, 1024).unwrap_err();
            assert!(matches!(err, ClientError::InvalidType { .. }), "{mime}: {err:?}");
        }
    }

    #[test]
    fn type_is_checked_before_size() {
        let f = SelectedFile::from_bytes("big.png", "image/png", vec![0u8; 64]);
        let err = validate_file(&f, 8).unwrap_err();
        assert!(matches!(err, ClientError::InvalidType { .. }));
    }

    #[test]
    fn pdf_variants_are_accepted() {
        for mime in ["application/pdf", "application/x-pdf", "APPLICATION/PDF"] {
            let f = SelectedFile::from_bytes("a.pdf", mime, vec![0u8; 4]);
            assert!(validate_file(&f, 1024).is_ok(), "{mime}");
        }
    }

    #[test]
    fn extension_mapping() {
        assert_eq!(mime_from_extension(Path::new("a/b/Report.PDF")), Some(PDF_MIME));
        assert_eq!(mime_from_extension(Path::new("scan.jpg")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("README")), None);
    }

    #[test]
    fn from_path_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7\n%%EOF\n").unwrap();

        let f = tokio_test::block_on(SelectedFile::from_path(&path)).unwrap();
        assert_eq!(f.name(), "report.pdf");
        assert_eq!(f.size(), 15);
        assert_eq!(f.mime(), PDF_MIME);
    }

    #[test]
    fn from_path_sniffs_extensionless_files() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("scan");
        std::fs::write(&pdf, b"%PDF-1.4 body").unwrap();
        let other = dir.path().join("notes");
        std::fs::write(&other, b"hello").unwrap();

        let f = tokio_test::block_on(SelectedFile::from_path(&pdf)).unwrap();
        assert_eq!(f.mime(), PDF_MIME);
        let f = tokio_test::block_on(SelectedFile::from_path(&other)).unwrap();
        assert_eq!(f.mime(), "application/octet-stream");
    }

    #[test]
    fn from_path_missing_file() {
        let err = tokio_test::block_on(SelectedFile::from_path("/definitely/not/here.pdf"))
            .unwrap_err();
        assert!(matches!(err, ClientError::FileUnreadable { .. }));
    }
}
