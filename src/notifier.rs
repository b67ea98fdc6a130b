//! Transient error banner with automatic dismissal.
//!
//! Every [`ErrorNotifier::show_error`] bumps a generation counter and
//! schedules a dismissal on the tokio runtime. When the timer fires it only
//! hides the banner if no newer message has been shown in the meantime, so a
//! stale timer cannot cut a fresh message short.
//!
//! The generation, the visible message and the matching view call all change
//! under one lock, so the timer's check-and-hide cannot interleave with a
//! concurrent `show_error` on a multi-threaded runtime.

use crate::view::View;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Shows errors in a [`View`] and hides them after a fixed delay.
pub struct ErrorNotifier<V: View + 'static> {
    view: Arc<V>,
    dismiss_after: Duration,
    banner: Arc<Mutex<Banner>>,
}

#[derive(Default)]
struct Banner {
    generation: u64,
    message: Option<String>,
}

fn lock(banner: &Mutex<Banner>) -> MutexGuard<'_, Banner> {
    banner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V: View + 'static> ErrorNotifier<V> {
    pub fn new(view: Arc<V>, dismiss_after: Duration) -> Self {
        Self {
            view,
            dismiss_after,
            banner: Arc::new(Mutex::new(Banner::default())),
        }
    }

    /// Display `message` and schedule its dismissal.
    ///
    /// Outside a tokio runtime no timer can be scheduled; the banner then
    /// stays until the next [`ErrorNotifier::hide_error`].
    pub fn show_error(&self, message: &str) {
        let generation = {
            let mut banner = lock(&self.banner);
            banner.generation += 1;
            banner.message = Some(message.to_string());
            self.view.show_error(message);
            banner.generation
        };
        debug!("Error banner #{}: {}", generation, message);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime; error banner #{} will not auto-dismiss", generation);
            return;
        };

        let view = Arc::clone(&self.view);
        let banner = Arc::clone(&self.banner);
        let delay = self.dismiss_after;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut banner = lock(&banner);
            if banner.generation == generation {
                banner.message = None;
                view.hide_error();
            }
        });
    }

    /// Hide the banner. Idempotent.
    pub fn hide_error(&self) {
        let mut banner = lock(&self.banner);
        banner.generation += 1;
        banner.message = None;
        self.view.hide_error();
    }

    /// The message currently on screen, if any.
    pub fn current(&self) -> Option<String> {
        lock(&self.banner).message.clone()
    }
}
