//! The status page and its mounted lifetime.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::probe::HealthProbe;
use crate::state::DisplayState;

/// Heading shown at the top of the page.
pub const TITLE: &str = "BRRRR Radar";

/// A status page that has not been mounted yet.
///
/// The page itself holds no state; each [`mount`](StatusPage::mount) starts
/// a fresh lifetime with its own request.
pub struct StatusPage<P> {
    probe: Arc<P>,
}

impl<P: HealthProbe + 'static> StatusPage<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe: Arc::new(probe),
        }
    }

    /// Mounts the page and starts its single health request.
    ///
    /// The returned handle reports `loading...` until the request settles.
    /// Must be called from within a Tokio runtime.
    pub fn mount(&self) -> MountedStatusPage {
        let (tx, rx) = watch::channel(DisplayState::Loading);
        let probe = Arc::clone(&self.probe);

        let task = tokio::spawn(async move {
            let outcome = probe.check().await;
            if let Err(err) = &outcome {
                tracing::warn!(error = %err, "backend health check failed");
            }
            tx.send_replace(DisplayState::from_probe(&outcome));
        });

        tracing::debug!("status page mounted");
        MountedStatusPage { state: rx, task }
    }
}

/// A mounted status page.
///
/// Dropping the handle unmounts the page: a request still in flight is
/// abandoned and its result is never applied.
pub struct MountedStatusPage {
    state: watch::Receiver<DisplayState>,
    task: JoinHandle<()>,
}

impl MountedStatusPage {
    /// The value currently displayed.
    pub fn state(&self) -> DisplayState {
        *self.state.borrow()
    }

    /// Waits for the health request to settle and returns the final value.
    pub async fn settled(&mut self) -> DisplayState {
        let settled = self
            .state
            .wait_for(DisplayState::is_settled)
            .await
            .map(|state| *state);
        // Err means the probe task went away without reporting (it panicked).
        settled.unwrap_or_else(|_| self.state())
    }

    /// Renders the page as plain text.
    pub fn render(&self) -> String {
        format!("{TITLE}\n\nBackend status: {}", self.state())
    }
}

impl Drop for MountedStatusPage {
    fn drop(&mut self) {
        self.task.abort();
    }
}
