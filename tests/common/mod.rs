//! Shared test doubles: a recording view and a scripted conversion server.

#![allow(dead_code)]

use pdf2img_client::api::{CleanupResponse, ConvertRequest, ConvertResponse, UploadResponse};
use pdf2img_client::intake::PDF_MIME;
use pdf2img_client::{
    ApiError, App, ClientConfig, ConversionApi, ConversionOptions, ResultItem, SelectedFile,
    Theme, View,
};
use prefs_store::{KeyValueStore, MemoryStore};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

// ── Recording view ───────────────────────────────────────────────────────────

/// One call made on the view, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ApplyTheme(Theme),
    DropHighlight(bool),
    ShowPreview(String),
    HidePreview,
    OptionsVisible(bool),
    ResetInput,
    Loading(bool),
    ConvertEnabled(bool),
    ClearResults,
    ArchiveControl(Option<String>),
    AppendItem(ResultItem),
    ResultsVisible(bool),
    ScrollResults,
    ShowError(String),
    HideError,
}

/// A [`View`] that remembers every call.
#[derive(Default)]
pub struct RecordingView {
    calls: Mutex<Vec<Call>>,
    options: Mutex<ConversionOptions>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_options(options: ConversionOptions) -> Arc<Self> {
        let view = Self::default();
        *view.options.lock().unwrap() = options;
        Arc::new(view)
    }

    pub fn set_options(&self, options: ConversionOptions) {
        *self.options.lock().unwrap() = options;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn items(&self) -> Vec<ResultItem> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AppendItem(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ShowError(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// The last value passed to a boolean setter selected by `pick`.
    pub fn last_flag(&self, pick: impl Fn(&Call) -> Option<bool>) -> Option<bool> {
        self.calls().iter().rev().find_map(pick)
    }

    pub fn is_loading(&self) -> bool {
        self.last_flag(|c| match c {
            Call::Loading(v) => Some(*v),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn convert_enabled(&self) -> bool {
        self.last_flag(|c| match c {
            Call::ConvertEnabled(v) => Some(*v),
            _ => None,
        })
        .unwrap_or(true)
    }

    pub fn results_visible(&self) -> bool {
        self.last_flag(|c| match c {
            Call::ResultsVisible(v) => Some(*v),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn last_theme(&self) -> Option<Theme> {
        self.calls().iter().rev().find_map(|c| match c {
            Call::ApplyTheme(t) => Some(*t),
            _ => None,
        })
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl View for RecordingView {
    fn apply_theme(&self, theme: Theme) {
        self.push(Call::ApplyTheme(theme));
    }

    fn set_drop_highlight(&self, active: bool) {
        self.push(Call::DropHighlight(active));
    }

    fn show_file_preview(&self, file: &SelectedFile) {
        self.push(Call::ShowPreview(file.name().to_string()));
    }

    fn hide_file_preview(&self) {
        self.push(Call::HidePreview);
    }

    fn set_options_visible(&self, visible: bool) {
        self.push(Call::OptionsVisible(visible));
    }

    fn reset_file_input(&self) {
        self.push(Call::ResetInput);
    }

    fn read_options(&self) -> ConversionOptions {
        *self.options.lock().unwrap()
    }

    fn set_loading(&self, loading: bool) {
        self.push(Call::Loading(loading));
    }

    fn set_convert_enabled(&self, enabled: bool) {
        self.push(Call::ConvertEnabled(enabled));
    }

    fn clear_results(&self) {
        self.push(Call::ClearResults);
    }

    fn set_archive_control(&self, archive: Option<&str>) {
        self.push(Call::ArchiveControl(archive.map(str::to_string)));
    }

    fn append_result_item(&self, item: &ResultItem) {
        self.push(Call::AppendItem(item.clone()));
    }

    fn set_results_visible(&self, visible: bool) {
        self.push(Call::ResultsVisible(visible));
    }

    fn scroll_results_into_view(&self) {
        self.push(Call::ScrollResults);
    }

    fn show_error(&self, message: &str) {
        self.push(Call::ShowError(message.to_string()));
    }

    fn hide_error(&self) {
        self.push(Call::HideError);
    }
}

// ── Scripted server ──────────────────────────────────────────────────────────

/// What a scripted endpoint answers.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Json(T),
    /// The request never got an answer (connection refused, timeout…).
    Unreachable,
}

/// A [`ConversionApi`] that answers from a script and counts calls.
pub struct ScriptedApi {
    pub upload_reply: Mutex<Reply<UploadResponse>>,
    pub convert_reply: Mutex<Reply<ConvertResponse>>,
    pub cleanup_reply: Mutex<Reply<CleanupResponse>>,
    /// Files the download endpoint knows about, with their content.
    pub hosted: Mutex<Vec<(String, Vec<u8>)>>,
    pub upload_calls: AtomicUsize,
    pub convert_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub cleanup_calls: AtomicUsize,
    pub convert_requests: Mutex<Vec<ConvertRequest>>,
    /// When set, `upload` waits for a notification before answering.
    pub upload_gate: Option<Arc<Notify>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self {
            upload_reply: Mutex::new(Reply::Json(UploadResponse {
                success: true,
                filename: Some("a1b2c3_doc.pdf".into()),
                original_name: Some("doc.pdf".into()),
                error: None,
            })),
            convert_reply: Mutex::new(Reply::Json(ConvertResponse {
                success: true,
                files: vec!["p1.png".into(), "p2.png".into()],
                zip_file: None,
                count: Some(2),
                error: None,
            })),
            cleanup_reply: Mutex::new(Reply::Json(CleanupResponse {
                success: true,
                error: None,
            })),
            hosted: Mutex::new(Vec::new()),
            upload_calls: AtomicUsize::new(0),
            convert_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            cleanup_calls: AtomicUsize::new(0),
            convert_requests: Mutex::new(Vec::new()),
            upload_gate: None,
        }
    }
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload(self, reply: Reply<UploadResponse>) -> Self {
        *self.upload_reply.lock().unwrap() = reply;
        self
    }

    pub fn with_convert(self, reply: Reply<ConvertResponse>) -> Self {
        *self.convert_reply.lock().unwrap() = reply;
        self
    }

    pub fn with_cleanup(self, reply: Reply<CleanupResponse>) -> Self {
        *self.cleanup_reply.lock().unwrap() = reply;
        self
    }

    pub fn hosting(self, name: &str, bytes: &[u8]) -> Self {
        self.hosted
            .lock()
            .unwrap()
            .push((name.to_string(), bytes.to_vec()));
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.upload_gate = Some(gate);
        self
    }

    pub fn uploads(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn converts(&self) -> usize {
        self.convert_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn cleanups(&self) -> usize {
        self.cleanup_calls.load(Ordering::SeqCst)
    }
}

fn unreachable_error(endpoint: &str) -> ApiError {
    ApiError::Decode {
        endpoint: endpoint.to_string(),
        status: 502,
        detail: "connection reset".into(),
    }
}

impl ConversionApi for ScriptedApi {
    async fn upload(&self, _file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }
        match self.upload_reply.lock().unwrap().clone() {
            Reply::Json(r) => Ok(r),
            Reply::Unreachable => Err(unreachable_error("/upload")),
        }
    }

    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertResponse, ApiError> {
        self.convert_calls.fetch_add(1, Ordering::SeqCst);
        self.convert_requests.lock().unwrap().push(request.clone());
        match self.convert_reply.lock().unwrap().clone() {
            Reply::Json(r) => Ok(r),
            Reply::Unreachable => Err(unreachable_error("/convert")),
        }
    }

    async fn download(&self, filename: &str, dest: &Path) -> Result<u64, ApiError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let body = self
            .hosted
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, bytes)| bytes.clone());
        let Some(body) = body else {
            return Err(ApiError::Status {
                endpoint: format!("/download/{filename}"),
                status: 404,
            });
        };
        tokio::fs::write(dest, &body)
            .await
            .map_err(|source| ApiError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        Ok(body.len() as u64)
    }

    async fn cleanup(&self) -> Result<CleanupResponse, ApiError> {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        match self.cleanup_reply.lock().unwrap().clone() {
            Reply::Json(r) => Ok(r),
            Reply::Unreachable => Err(unreachable_error("/cleanup")),
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Route library logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn pdf(name: &str, size: usize) -> SelectedFile {
    SelectedFile::from_bytes(name, PDF_MIME, vec![b'%'; size])
}

pub fn config_in(dir: &Path) -> ClientConfig {
    ClientConfig::builder().download_dir(dir).build().unwrap()
}

pub fn app_with<A: ConversionApi>(
    api: A,
    view: Arc<RecordingView>,
    dir: &Path,
) -> App<A, RecordingView> {
    init_tracing();
    let prefs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    App::new(config_in(dir), api, view, prefs)
}
