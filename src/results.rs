//! Results rendering: turn a [`ConversionResult`] into page cards.
//!
//! [`ResultsModel::from_result`] is the pure part; [`display_results`] pushes
//! the model into a [`View`]. Rendering always starts from an empty list, so
//! showing the same result twice produces the same screen.

use crate::api::download_path;
use crate::session::ConversionResult;
use crate::view::View;
use serde::Serialize;

/// One rendered page card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    /// 1-based position in the result.
    pub page: usize,
    /// Filename the card's download control fetches.
    pub filename: String,
    /// Server-relative download path for `filename`.
    pub download_path: String,
}

impl ResultItem {
    /// Card caption, e.g. `"Page 2"`.
    pub fn label(&self) -> String {
        format!("Page {}", self.page)
    }
}

/// Everything the results region displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsModel {
    /// Target of the "download all" control; hidden when `None`.
    pub archive: Option<String>,
    pub items: Vec<ResultItem>,
}

impl ResultsModel {
    pub fn from_result(result: &ConversionResult) -> Self {
        let items = result
            .files
            .iter()
            .enumerate()
            .map(|(idx, filename)| ResultItem {
                page: idx + 1,
                filename: filename.clone(),
                download_path: download_path(filename),
            })
            .collect();

        Self {
            archive: result.archive.clone(),
            items,
        }
    }
}

/// Render `result` into `view`: clear, archive control, cards, reveal, scroll.
pub fn display_results<V: View + ?Sized>(view: &V, result: &ConversionResult) -> ResultsModel {
    let model = ResultsModel::from_result(result);

    view.clear_results();
    view.set_archive_control(model.archive.as_deref());
    for item in &model.items {
        view.append_result_item(item);
    }
    view.set_results_visible(true);
    view.scroll_results_into_view();

    model
}
