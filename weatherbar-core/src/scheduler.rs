//! Drives the fetcher on startup, on a fixed interval and on demand.
//!
//! Only one fetch runs at a time. Manual refreshes requested while a fetch is
//! in flight collapse into a single pending refresh. Ticks stay aligned to the
//! moment the scheduler started; a tick that falls inside a slow fetch is
//! dropped and the next fetch waits for the following aligned tick.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

use crate::{
    display::DisplaySink,
    model::Coordinates,
    provider::{WeatherProvider, fetch_display},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Fetching,
}

/// What started a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Tick,
    Manual,
}

/// Longest accepted interval; longer values are clamped.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct Scheduler {
    provider: Arc<dyn WeatherProvider>,
    coords: Coordinates,
    interval: Duration,
    sink: Arc<dyn DisplaySink>,
}

impl Scheduler {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        coords: Coordinates,
        interval: Duration,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        Self {
            provider,
            coords,
            interval: interval.min(MAX_INTERVAL),
            sink,
        }
    }

    /// Start the polling task on the current runtime.
    ///
    /// The first fetch happens immediately; the first tick fires one full
    /// interval later. `interval` must be non-zero and is capped at [`MAX_INTERVAL`].
    pub fn spawn(self) -> SchedulerHandle {
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(self.run(refresh_rx, state_tx, cancel.clone()));

        SchedulerHandle {
            refresh_tx,
            state: state_rx,
            cancel,
            task,
        }
    }

    async fn run(
        self,
        mut refresh_rx: mpsc::Receiver<()>,
        state_tx: watch::Sender<SchedulerState>,
        cancel: CancellationToken,
    ) {
        let mut next_tick = Instant::now() + self.interval;
        let mut trigger = Trigger::Startup;

        loop {
            state_tx.send_replace(SchedulerState::Fetching);
            tracing::debug!(?trigger, coords = %self.coords, "fetching weather");

            // An in-flight fetch is abandoned on shutdown.
            let text = tokio::select! {
                _ = cancel.cancelled() => break,
                text = fetch_display(self.provider.as_ref(), self.coords) => text,
            };
            self.sink.show(text);
            state_tx.send_replace(SchedulerState::Idle);

            let now = Instant::now();
            while next_tick <= now {
                next_tick += self.interval;
            }

            // A queued manual refresh wins over a tick that is due at the same time.
            trigger = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(()) = refresh_rx.recv() => Trigger::Manual,
                _ = time::sleep_until(next_tick) => Trigger::Tick,
            };
        }

        state_tx.send_replace(SchedulerState::Idle);
        tracing::debug!("scheduler stopped");
    }
}

/// Control surface for a running [`Scheduler`].
///
/// Dropping the handle without calling [`SchedulerHandle::shutdown`] leaves the
/// task polling until the runtime goes away.
#[derive(Debug)]
pub struct SchedulerHandle {
    refresh_tx: mpsc::Sender<()>,
    state: watch::Receiver<SchedulerState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request a manual refresh. Returns `false` when one is already pending
    /// and this request was folded into it.
    pub fn refresh(&self) -> bool {
        match self.refresh_tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                tracing::debug!("refresh already pending");
                false
            }
            Err(TrySendError::Closed(())) => false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }

    /// Stop polling. A fetch still in flight is dropped without updating the sink.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "scheduler task ended abnormally");
        }
    }
}
