//! Display refresh task and the coalescing signal that wakes it
//!
//! Producers never queue frames: any number of triggers before the task
//! runs collapse into one wake-up, and the task paints whatever the timer
//! holds at that moment. The task owns the display while it runs and hands
//! it back when it exits.

use std::{
    pin::pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::{
    sync::Notify,
    task::{JoinError, JoinHandle},
};
use tracing::{debug, error, info, trace, trace_span};

use crate::{
    drivers::DisplayDriver,
    error::DriverError,
    state::{PersistentState, TimerState},
};

/// What the refresh task should do after waking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Refresh,
    Shutdown,
}

/// Single-slot wake-up for the display task.
///
/// `pending` is the slot itself; `Notify` only wakes a task that found it
/// empty.
#[derive(Debug, Default)]
pub struct DisplayNotifier {
    notify: Notify,
    pending: AtomicBool,
    shutdown: AtomicBool,
    released: AtomicBool,
}

impl DisplayNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a repaint. Never blocks; safe from the tick context.
    pub fn trigger(&self) {
        if self.released.load(Ordering::Acquire) {
            trace!("Display refresh requested after release, ignored");
            return;
        }
        if self.pending.swap(true, Ordering::AcqRel) {
            trace!("Display refresh coalesced");
            return;
        }
        self.notify.notify_waiters();
    }

    /// Ask the display task to exit at its next wake-up, and wake it
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.pending.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Whether a wake-up is waiting to be consumed
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Whether the display task has let go of the signal for good
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    async fn wait(&self) -> Wake {
        loop {
            // Register before checking the slot so a trigger in between
            // still wakes us.
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            if self.pending.swap(false, Ordering::AcqRel) {
                return if self.shutdown.load(Ordering::Acquire) {
                    Wake::Shutdown
                } else {
                    Wake::Refresh
                };
            }
            notified.await;
        }
    }
}

/// Held by the display task; releases the signal on every exit path
struct NotifierLease<'a>(&'a DisplayNotifier);

impl Drop for NotifierLease<'_> {
    fn drop(&mut self) {
        self.0.released.store(true, Ordering::Release);
        debug!("Display notifier released");
    }
}

/// Paint the current state
pub fn render_current(
    state: &PersistentState,
    display: &mut dyn DisplayDriver,
) -> Result<TimerState, DriverError> {
    let _span = trace_span!("render").entered();
    let snapshot = state.snapshot();
    display.render(snapshot.remaining, snapshot.phase)?;
    Ok(snapshot)
}

/// Background task that repaints the display whenever notified.
///
/// Returns the display once shutdown is requested.
pub async fn display_refresh_task(
    state: Arc<PersistentState>,
    notifier: Arc<DisplayNotifier>,
    mut display: Box<dyn DisplayDriver>,
) -> Box<dyn DisplayDriver> {
    info!("Starting display refresh task");
    let _lease = NotifierLease(&notifier);

    loop {
        match notifier.wait().await {
            Wake::Shutdown => break,
            Wake::Refresh => {
                if let Err(e) = render_current(&state, display.as_mut()) {
                    error!("Failed to refresh display: {}", e);
                }
            }
        }
    }

    info!("Display refresh task exiting");
    display
}

/// Handle to the running display task
pub struct DisplayRefresh {
    notifier: Arc<DisplayNotifier>,
    handle: JoinHandle<Box<dyn DisplayDriver>>,
}

impl DisplayRefresh {
    pub fn spawn(
        state: Arc<PersistentState>,
        notifier: Arc<DisplayNotifier>,
        display: Box<dyn DisplayDriver>,
    ) -> Self {
        let task = display_refresh_task(state, Arc::clone(&notifier), display);
        Self { notifier, handle: tokio::spawn(task) }
    }

    /// Signal the task to exit, wait until it has and take the display back
    pub async fn shutdown(self) -> Result<Box<dyn DisplayDriver>, JoinError> {
        self.notifier.request_shutdown();
        self.handle.await
    }
}
