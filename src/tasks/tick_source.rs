//! 1 Hz countdown tick

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, trace_span};

use super::DisplayNotifier;
use crate::state::PersistentState;

/// One tick: decrement if eligible and request a repaint. Never blocks.
pub fn on_tick(state: &PersistentState, notifier: &DisplayNotifier) -> bool {
    let _span = trace_span!("tick").entered();
    match state.tick() {
        Some(_) => {
            notifier.trigger();
            true
        }
        None => false,
    }
}

/// Periodic source driving `on_tick`
#[derive(Debug)]
pub struct TickSource {
    handle: JoinHandle<()>,
}

impl TickSource {
    /// Schedule ticks every `period`, the first one `period` from now
    pub fn start(
        state: Arc<PersistentState>,
        notifier: Arc<DisplayNotifier>,
        period: Duration,
    ) -> Self {
        info!("Starting tick source every {:?}", period);
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            // A stalled clock only delays the countdown; no catch-up.
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                on_tick(&state, &notifier);
            }
        });
        Self { handle }
    }

    /// Cancel the schedule and wait until no tick can run any more.
    ///
    /// Returns `false` if the task had already died some other way.
    pub async fn stop(self) -> bool {
        self.handle.abort();
        match self.handle.await {
            Err(e) if !e.is_cancelled() => {
                error!("Tick source task failed: {}", e);
                false
            }
            _ => {
                debug!("Tick source stopped");
                true
            }
        }
    }
}
