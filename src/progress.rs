use crate::store::{ProjectStore, Transition};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// Owns the periodic progress task for one generation. Dropping the guard
/// aborts the task, so the timer is cleared however the generation ends.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Advances the synthetic progress value on a fixed cadence while the
/// generation slot is held. The loop stops on its own once the slot clears
/// (the tick transition is rejected).
pub fn spawn_progress_ticker(store: Arc<ProjectStore>) -> ProgressTicker {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(PROGRESS_TICK);
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            if store.apply(Transition::ProgressTicked).await.is_err() {
                break;
            }
        }
    });
    ProgressTicker { handle }
}
