//! The client's working set and the UI state derived from it.
//!
//! Only three facts are stored: the selected file, whether a conversion is in
//! flight, and the live result. A selection epoch, bumped whenever the
//! selection changes, ties each result to the selection it was made from. The phase shown to the user is computed from
//! them (plus the notifier's visible message) every time it is asked for, so
//! it can never drift out of sync with the data.

use crate::intake::SelectedFile;
use serde::{Deserialize, Serialize};

/// A successful conversion, as kept by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Output filenames in page order.
    pub files: Vec<String>,
    /// Archive holding every page, when packaging was requested.
    pub archive: Option<String>,
}

impl ConversionResult {
    pub fn new(files: Vec<String>, archive: Option<String>) -> Self {
        Self { files, archive }
    }

    pub fn page_count(&self) -> usize {
        self.files.len()
    }
}

/// Session state owned by [`crate::app::App`].
#[derive(Debug, Default)]
pub struct Session {
    selected: Option<SelectedFile>,
    /// Incremented on every `stage` and `clear`.
    epoch: u64,
    in_flight: bool,
    last_result: Option<ConversionResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn last_result(&self) -> Option<&ConversionResult> {
        self.last_result.as_ref()
    }

    pub fn is_converting(&self) -> bool {
        self.in_flight
    }

    /// Replace the selected file.
    pub(crate) fn stage(&mut self, file: SelectedFile) {
        self.selected = Some(file);
        self.epoch += 1;
    }

    /// Drop the selected file and the result produced from it.
    pub(crate) fn clear(&mut self) {
        self.selected = None;
        self.last_result = None;
        self.epoch += 1;
    }

    /// Mark a conversion as started, dropping the previous result.
    ///
    /// Returns the selection epoch the conversion belongs to, or `None` (and
    /// changes nothing) when one is already running.
    pub(crate) fn begin_conversion(&mut self) -> Option<u64> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.last_result = None;
        Some(self.epoch)
    }

    pub(crate) fn end_conversion(&mut self) {
        self.in_flight = false;
    }

    /// Keep `result` as the live result if the selection it was converted
    /// from (`epoch`) is still the current one.
    pub(crate) fn store_result(&mut self, epoch: u64, result: ConversionResult) -> bool {
        if epoch != self.epoch || self.selected.is_none() {
            return false;
        }
        self.last_result = Some(result);
        true
    }

    /// Derive the UI phase from the stored facts.
    pub fn phase(&self) -> Phase {
        if self.in_flight {
            Phase::Converting
        } else if self.selected.is_some() && self.last_result.is_some() {
            Phase::Results
        } else if self.selected.is_some() {
            Phase::FileStaged
        } else {
            Phase::Idle
        }
    }
}

/// Where the user is in the select → convert → download flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing selected.
    Idle,
    /// A valid file is selected and options are shown.
    FileStaged,
    /// Upload/convert requests are running; the loading indicator is shown.
    Converting,
    /// The last conversion succeeded and its results are displayed.
    Results,
}

/// Full UI state: a phase with an optional error banner layered on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub phase: Phase,
    pub error: Option<String>,
}

impl UiState {
    pub fn error_shown(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::PDF_MIME;

    fn file() -> SelectedFile {
        SelectedFile::from_bytes("doc.pdf", PDF_MIME, vec![0u8; 8])
    }

    #[test]
    fn phase_follows_facts() {
        let mut s = Session::new();
        assert_eq!(s.phase(), Phase::Idle);

        s.stage(file());
        assert_eq!(s.phase(), Phase::FileStaged);

        let epoch = s.begin_conversion().unwrap();
        assert_eq!(s.phase(), Phase::Converting);

        assert!(s.store_result(epoch, ConversionResult::new(vec!["page_1.png".into()], None)));
        s.end_conversion();
        assert_eq!(s.phase(), Phase::Results);

        s.clear();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.last_result().is_none());
    }

    #[test]
    fn begin_conversion_is_exclusive() {
        let mut s = Session::new();
        s.stage(file());
        assert!(s.begin_conversion().is_some());
        assert!(s.begin_conversion().is_none());
        s.end_conversion();
        assert!(s.begin_conversion().is_some());
    }

    #[test]
    fn new_attempt_drops_previous_result() {
        let mut s = Session::new();
        s.stage(file());
        let epoch = s.begin_conversion().unwrap();
        s.store_result(epoch, ConversionResult::new(vec!["old.png".into()], None));
        s.end_conversion();
        assert!(s.begin_conversion().is_some());
        assert!(s.last_result().is_none());
    }

    #[test]
    fn result_of_a_replaced_selection_is_discarded() {
        let mut s = Session::new();
        s.stage(file());
        let epoch = s.begin_conversion().unwrap();

        s.clear();
        s.stage(file());
        s.end_conversion();

        assert!(!s.store_result(epoch, ConversionResult::new(vec!["a.png".into()], None)));
        assert!(s.last_result().is_none());
        assert_eq!(s.phase(), Phase::FileStaged);
    }

    #[test]
    fn result_after_removal_is_discarded() {
        let mut s = Session::new();
        s.stage(file());
        let epoch = s.begin_conversion().unwrap();
        s.clear();

        assert!(!s.store_result(epoch, ConversionResult::new(vec!["a.png".into()], None)));
        assert_eq!(s.phase(), Phase::Converting);
    }
}
