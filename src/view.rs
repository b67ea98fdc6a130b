//! UI abstraction and the events it emits.
//!
//! A display surface (terminal, web page, test double) implements [`View`];
//! the [`crate::app::App`] decides *what* to show and calls these methods to
//! show it. User input flows the other way as [`UiEvent`]s passed to
//! [`crate::app::App::dispatch`], so no business rule lives in a UI callback.
//!
//! # Threading
//!
//! Methods take `&self` and may be called from a tokio worker (the error
//! banner's dismissal timer), hence the `Send + Sync` bound. Implementations
//! keep their mutable state behind a lock.

use crate::config::ConversionOptions;
use crate::intake::SelectedFile;
use crate::results::ResultItem;
use crate::theme::Theme;

/// A display surface for the conversion client.
pub trait View: Send + Sync {
    /// Switch the visual root to `theme`.
    fn apply_theme(&self, theme: Theme);

    /// Highlight the drop zone while a file is dragged over it.
    fn set_drop_highlight(&self, active: bool) {
        let _ = active;
    }

    /// Show the name (and size) of the staged file.
    fn show_file_preview(&self, file: &SelectedFile);

    fn hide_file_preview(&self);

    /// Reveal or hide the format / DPI / archive controls.
    fn set_options_visible(&self, visible: bool);

    /// Forget whatever the file-input control last reported.
    fn reset_file_input(&self) {}

    /// Current values of the option controls, read once per conversion.
    fn read_options(&self) -> ConversionOptions;

    /// Show or hide the loading indicator.
    fn set_loading(&self, loading: bool);

    /// Enable or disable the convert control.
    fn set_convert_enabled(&self, enabled: bool) {
        let _ = enabled;
    }

    /// Remove every rendered result item.
    fn clear_results(&self);

    /// Show the "download all" control bound to `archive`, or hide it on `None`.
    fn set_archive_control(&self, archive: Option<&str>);

    /// Append one page card to the results list.
    fn append_result_item(&self, item: &ResultItem);

    fn set_results_visible(&self, visible: bool);

    /// Bring the results region into view.
    fn scroll_results_into_view(&self) {}

    /// Show `message` in the error banner.
    fn show_error(&self, message: &str);

    /// Hide the error banner; hiding a hidden banner is a no-op.
    fn hide_error(&self);
}

/// User input, as delivered by a display surface.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A file was picked through the file-input control.
    FileChosen(SelectedFile),
    /// Something is being dragged over the drop zone.
    DragOver,
    /// The drag left the drop zone without dropping.
    DragLeave,
    /// Files were dropped; only the first one is used.
    FileDropped(Vec<SelectedFile>),
    /// The remove-file control was clicked.
    RemoveFile,
    /// The convert control was clicked.
    Convert,
    /// The "download all" control was clicked.
    DownloadAll,
    /// A per-page download control was clicked.
    Download(String),
    /// The theme toggle was clicked.
    ToggleTheme,
}
