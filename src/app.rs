//! The client session: state, event dispatch, and the convert flow.
//!
//! [`App`] owns everything a single page session needs (selected file, live
//! result, theme, error banner) and exposes one method per user action.
//! Display surfaces either call those methods directly or feed [`UiEvent`]s
//! to [`App::dispatch`].
//!
//! ## Re-entrancy
//!
//! All methods take `&self`, so two `convert()` calls can overlap when the
//! app is shared between tasks. The session's in-flight flag rejects the
//! second one with [`ClientError::ConversionInProgress`] before any request is
//! made, and the convert control stays disabled while a conversion runs.
//!
//! The selection can still change while the requests run. A result is only
//! stored and rendered if the selection it was converted from is still the
//! current one; otherwise it is just returned to the caller.

use crate::api::ConversionApi;
use crate::config::ClientConfig;
use crate::convert::run_conversion;
use crate::download::trigger_download;
use crate::error::ClientError;
use crate::intake::{validate_file, SelectedFile};
use crate::notifier::ErrorNotifier;
use crate::results::display_results;
use crate::session::{ConversionResult, Session, UiState};
use crate::theme::{self, Theme};
use crate::view::{UiEvent, View};
use prefs_store::KeyValueStore;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// One client session bound to a server (`A`) and a display surface (`V`).
pub struct App<A: ConversionApi, V: View + 'static> {
    config: ClientConfig,
    api: A,
    view: Arc<V>,
    prefs: Arc<dyn KeyValueStore>,
    notifier: ErrorNotifier<V>,
    session: Mutex<Session>,
    theme: Mutex<Theme>,
}

impl<A: ConversionApi, V: View + 'static> App<A, V> {
    pub fn new(config: ClientConfig, api: A, view: Arc<V>, prefs: Arc<dyn KeyValueStore>) -> Self {
        let notifier = ErrorNotifier::new(Arc::clone(&view), config.error_dismiss_after());
        Self {
            config,
            api,
            view,
            prefs,
            notifier,
            session: Mutex::new(Session::new()),
            theme: Mutex::new(Theme::default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    // ── Derived state ────────────────────────────────────────────────────

    /// Current UI state, computed from the session and the error banner.
    pub fn ui_state(&self) -> UiState {
        UiState {
            phase: self.lock_session().phase(),
            error: self.notifier.current(),
        }
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.lock_session().selected().cloned()
    }

    pub fn last_result(&self) -> Option<ConversionResult> {
        self.lock_session().last_result().cloned()
    }

    // ── Theme ────────────────────────────────────────────────────────────

    pub fn theme(&self) -> Theme {
        *lock(&self.theme)
    }

    /// Apply the stored theme, or `system` when none is stored.
    pub fn init_theme(&self, system: Theme) -> Theme {
        let resolved = theme::init_theme(self.prefs.as_ref(), system, self.view.as_ref());
        *lock(&self.theme) = resolved;
        resolved
    }

    /// Flip, persist and apply the theme.
    pub fn toggle_theme(&self) -> Theme {
        let mut current = lock(&self.theme);
        *current = theme::toggle_theme(*current, self.prefs.as_ref(), self.view.as_ref());
        info!("Theme switched to {}", *current);
        *current
    }

    // ── File intake ──────────────────────────────────────────────────────

    /// Validate and stage `file`; on failure the banner shows why.
    pub fn select_file(&self, file: SelectedFile) -> Result<(), ClientError> {
        if let Err(e) = validate_file(&file, self.config.max_file_size) {
            info!("Rejected {} ({}, {} bytes): {}", file.name(), file.mime(), file.size(), e);
            self.notifier.show_error(&e.to_string());
            return Err(e);
        }

        info!("Selected {} ({} bytes)", file.name(), file.size());
        self.view.show_file_preview(&file);
        self.view.set_options_visible(true);
        self.lock_session().stage(file);
        self.notifier.hide_error();
        Ok(())
    }

    /// Clear the selection and everything shown for it. Idempotent.
    pub fn remove_file(&self) {
        self.lock_session().clear();
        self.view.reset_file_input();
        self.view.hide_file_preview();
        self.view.set_options_visible(false);
        self.view.set_results_visible(false);
        self.notifier.hide_error();
        debug!("Selection cleared");
    }

    /// Handle a drop: un-highlight, then select the first file if any.
    pub fn drop_files(&self, files: Vec<SelectedFile>) -> Result<(), ClientError> {
        self.view.set_drop_highlight(false);
        match files.into_iter().next() {
            Some(first) => self.select_file(first),
            None => Ok(()),
        }
    }

    // ── Conversion ───────────────────────────────────────────────────────

    /// Upload the selected file, convert it, and render the result.
    ///
    /// Every error is shown in the banner and returned.
    pub async fn convert(&self) -> Result<ConversionResult, ClientError> {
        let outcome = self.run_convert().await;
        if let Err(ref e) = outcome {
            self.notifier.show_error(&e.to_string());
        }
        outcome
    }

    async fn run_convert(&self) -> Result<ConversionResult, ClientError> {
        let (file, epoch) = {
            let mut session = self.lock_session();
            let Some(file) = session.selected().cloned() else {
                return Err(ClientError::NoFileSelected);
            };
            let Some(epoch) = session.begin_conversion() else {
                warn!("Convert requested while a conversion is running");
                return Err(ClientError::ConversionInProgress);
            };
            (file, epoch)
        };

        let _in_flight = InFlight::engage(self.view.as_ref(), &self.session);
        self.view.set_results_visible(false);
        self.notifier.hide_error();

        let options = self.view.read_options();
        let result = run_conversion(&self.api, &file, &options).await?;

        // The selection may have been removed or replaced while the requests ran.
        let stored = self.lock_session().store_result(epoch, result.clone());
        if stored {
            display_results(self.view.as_ref(), &result);
        } else {
            info!("Selection changed during conversion of {}; result not displayed", file.name());
        }
        Ok(result)
    }

    // ── Downloads ────────────────────────────────────────────────────────

    /// Save `/download/{filename}` into the download directory.
    ///
    /// Failures are returned, not shown in the banner.
    pub async fn download(&self, filename: &str) -> Result<PathBuf, ClientError> {
        trigger_download(&self.api, &self.config.download_dir, filename)
            .await
            .inspect_err(|e| warn!("Download of {} failed: {}", filename, e))
    }

    /// Download the live result's archive; `Ok(None)` when there is none.
    pub async fn download_all(&self) -> Result<Option<PathBuf>, ClientError> {
        let archive = self
            .lock_session()
            .last_result()
            .and_then(|r| r.archive.clone());

        match archive {
            Some(name) => self.download(&name).await.map(Some),
            None => {
                debug!("Download-all requested without an archive");
                Ok(None)
            }
        }
    }

    /// Download every page of the live result, in page order.
    pub async fn download_pages(&self) -> Result<Vec<PathBuf>, ClientError> {
        let files = self
            .lock_session()
            .last_result()
            .map(|r| r.files.clone())
            .unwrap_or_default();

        let mut saved = Vec::with_capacity(files.len());
        for name in &files {
            saved.push(self.download(name).await?);
        }
        Ok(saved)
    }

    // ── Housekeeping ─────────────────────────────────────────────────────

    /// Ask the server to purge staged uploads and outputs.
    pub async fn cleanup(&self) -> Result<(), ClientError> {
        let outcome = match self.api.cleanup().await {
            Ok(reply) if reply.success => Ok(()),
            Ok(reply) => Err(ClientError::cleanup_failed(reply.error.as_deref())),
            Err(e) => {
                warn!("Cleanup request failed: {}", e);
                Err(ClientError::cleanup_failed(None))
            }
        };
        match outcome {
            Ok(()) => info!("Server storage cleaned up"),
            Err(ref e) => self.notifier.show_error(&e.to_string()),
        }
        outcome
    }

    // ── Error banner ─────────────────────────────────────────────────────

    pub fn show_error(&self, message: &str) {
        self.notifier.show_error(message);
    }

    pub fn hide_error(&self) {
        self.notifier.hide_error();
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// Route one UI event to its handler.
    pub async fn dispatch(&self, event: UiEvent) -> Result<(), ClientError> {
        debug!("Event: {:?}", event);
        match event {
            UiEvent::FileChosen(file) => self.select_file(file),
            UiEvent::DragOver => {
                self.view.set_drop_highlight(true);
                Ok(())
            }
            UiEvent::DragLeave => {
                self.view.set_drop_highlight(false);
                Ok(())
            }
            UiEvent::FileDropped(files) => self.drop_files(files),
            UiEvent::RemoveFile => {
                self.remove_file();
                Ok(())
            }
            UiEvent::Convert => self.convert().await.map(drop),
            UiEvent::DownloadAll => self.download_all().await.map(drop),
            UiEvent::Download(filename) => self.download(&filename).await.map(drop),
            UiEvent::ToggleTheme => {
                self.toggle_theme();
                Ok(())
            }
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loading state for the duration of one conversion.
///
/// Dropping it hides the loading indicator, re-enables the convert control
/// and clears the session's in-flight flag, whichever way `convert` exits.
struct InFlight<'a, V: View + ?Sized> {
    view: &'a V,
    session: &'a Mutex<Session>,
}

impl<'a, V: View + ?Sized> InFlight<'a, V> {
    fn engage(view: &'a V, session: &'a Mutex<Session>) -> Self {
        view.set_convert_enabled(false);
        view.set_loading(true);
        Self { view, session }
    }
}

impl<V: View + ?Sized> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.view.set_loading(false);
        self.view.set_convert_enabled(true);
        lock(self.session).end_conversion();
    }
}
