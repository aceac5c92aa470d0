//! Debounced full refetch.
//!
//! Several moves in quick succession should cost one refetch, not one per
//! move. [`RefetchBatcher::schedule`] restarts a quiet-interval timer on
//! every call; the refetch runs only once the timer survives a full
//! interval without being rescheduled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Something that can reload the board from the backend.
pub trait Refetch: Send + Sync + 'static {
    /// Runs one full refetch. Failures are reported by the implementor.
    fn refetch(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Default)]
struct Timer {
    /// Bumped on every schedule or cancel; a firing timer whose
    /// generation is stale does nothing.
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        self.handle.take().is_some_and(|handle| {
            handle.abort();
            true
        })
    }
}

/// Owns the cancellable debounce timer in front of a [`Refetch`].
///
/// Dropping the batcher cancels a pending timer.
#[derive(Debug)]
pub struct RefetchBatcher<R> {
    refetch: Arc<R>,
    quiet: Duration,
    timer: Arc<Mutex<Timer>>,
}

impl<R: Refetch> RefetchBatcher<R> {
    /// Creates a batcher that waits `quiet` after the last schedule.
    #[must_use]
    pub fn new(refetch: Arc<R>, quiet: Duration) -> Self {
        Self {
            refetch,
            quiet,
            timer: Arc::new(Mutex::new(Timer::default())),
        }
    }

    /// The quiet interval.
    #[must_use]
    pub const fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// Starts the quiet-interval timer, cancelling any pending one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self) {
        let mut timer = self.timer.lock();
        timer.cancel();
        let generation = timer.generation;
        let refetch = Arc::clone(&self.refetch);
        let shared = Arc::clone(&self.timer);
        let quiet = self.quiet;
        timer.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            {
                let mut timer = shared.lock();
                if timer.generation != generation {
                    return;
                }
                timer.handle = None;
            }
            tracing::debug!("quiet interval elapsed, refetching");
            refetch.refetch().await;
        }));
        tracing::debug!(quiet_ms = quiet.as_millis(), "refetch scheduled");
    }

    /// Cancels a pending timer. Returns `true` if one was pending.
    ///
    /// A refetch that already started is not interrupted.
    pub fn cancel(&self) -> bool {
        self.timer.lock().cancel()
    }

    /// Whether a timer is pending.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.timer.lock().handle.is_some()
    }

    /// Cancels any pending timer and refetches right away.
    pub async fn refetch_now(&self) {
        if self.cancel() {
            tracing::debug!("pending refetch superseded");
        }
        self.refetch.refetch().await;
    }
}

impl<R> Drop for RefetchBatcher<R> {
    fn drop(&mut self) {
        self.timer.lock().cancel();
    }
}
