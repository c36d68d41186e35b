use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Observable boolean "a load is in progress" flag.
///
/// Cheap to clone; every clone drives the same channel. Consumers poll
/// [`is_active`](Self::is_active) or await changes on [`subscribe`](Self::subscribe).
#[derive(Clone, Debug)]
pub struct ProcessingSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ProcessingSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        *self.tx.borrow()
    }

    fn set(&self, active: bool) {
        self.tx.send_if_modified(|current| {
            let changed = *current != active;
            *current = active;
            changed
        });
    }
}

impl Default for ProcessingSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    /// Bumped on every begin/release so a stale delayed release is a no-op.
    epoch: u64,
    started: Option<Instant>,
    pending_release: Option<JoinHandle<()>>,
}

impl TrackerState {
    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending_release.take() {
            task.abort();
        }
    }
}

/// Raises a [`ProcessingSignal`] for the duration of a load and keeps it
/// raised for at least `min_visible` after a successful one.
#[derive(Debug)]
pub struct ProcessingTracker {
    signal: ProcessingSignal,
    min_visible: Duration,
    state: Arc<Mutex<TrackerState>>,
}

impl ProcessingTracker {
    pub fn new(signal: ProcessingSignal, min_visible: Duration) -> Self {
        Self {
            signal,
            min_visible,
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    pub fn signal(&self) -> &ProcessingSignal {
        &self.signal
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A load started. Supersedes any delayed release still pending.
    pub fn begin(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.cancel_pending();
        state.started = Some(Instant::now());
        self.signal.set(true);
    }

    /// The load succeeded. The signal drops once `min_visible` has elapsed
    /// since [`begin`](Self::begin); outside a tokio runtime it drops now.
    pub fn finish(&self) {
        let mut state = self.lock();
        let elapsed = state.started.map(|t| t.elapsed()).unwrap_or(self.min_visible);
        let remaining = self.min_visible.saturating_sub(elapsed);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) if !remaining.is_zero() => handle,
            _ => {
                state.started = None;
                self.signal.set(false);
                return;
            }
        };

        let epoch = state.epoch;
        let shared = Arc::clone(&self.state);
        let signal = self.signal.clone();
        debug!(remaining_ms = remaining.as_millis() as u64, "holding processing signal");
        state.cancel_pending();
        state.pending_release = Some(runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if state.epoch == epoch {
                state.started = None;
                state.pending_release = None;
                signal.set(false);
            }
        }));
    }

    /// Drop the signal immediately, ignoring the minimum duration. Used on
    /// failure and teardown.
    pub fn release_now(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.cancel_pending();
        state.started = None;
        self.signal.set(false);
    }
}

impl Drop for ProcessingTracker {
    fn drop(&mut self) {
        self.release_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn tracker() -> ProcessingTracker {
        ProcessingTracker::new(ProcessingSignal::new(), Duration::from_millis(200))
    }

    #[tokio::test(start_paused = true)]
    async fn finish_holds_for_minimum_duration() {
        let tracker = tracker();
        tracker.begin();
        sleep(Duration::from_millis(20)).await;
        tracker.finish();
        assert!(tracker.signal().is_active());

        sleep(Duration::from_millis(170)).await;
        assert!(tracker.signal().is_active());

        sleep(Duration::from_millis(20)).await;
        assert!(!tracker.signal().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_load_clears_on_finish() {
        let tracker = tracker();
        tracker.begin();
        sleep(Duration::from_millis(500)).await;
        tracker.finish();
        assert!(!tracker.signal().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn release_now_ignores_minimum() {
        let tracker = tracker();
        tracker.begin();
        tracker.finish();
        tracker.release_now();
        assert!(!tracker.signal().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn new_begin_supersedes_pending_release() {
        let tracker = tracker();
        tracker.begin();
        tracker.finish();
        sleep(Duration::from_millis(100)).await;
        tracker.begin();

        sleep(Duration::from_millis(300)).await;
        assert!(tracker.signal().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_transitions() {
        let tracker = tracker();
        let mut rx = tracker.signal().subscribe();
        tracker.begin();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        tracker.finish();
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }

    #[test]
    fn finish_without_runtime_clears_immediately() {
        let tracker = tracker();
        tracker.begin();
        tracker.finish();
        assert!(!tracker.signal().is_active());
    }

    #[test]
    fn drop_releases_signal() {
        let signal = ProcessingSignal::new();
        let tracker = ProcessingTracker::new(signal.clone(), Duration::from_millis(200));
        tracker.begin();
        assert!(signal.is_active());
        drop(tracker);
        assert!(!signal.is_active());
    }
}
