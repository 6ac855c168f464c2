//! Long-running update service: timer, preference subscriptions, and the
//! single worker that executes runs one at a time.

use std::{fmt, sync::Arc, time::Duration};

use bingwall_model::keys;
use parking_lot::Mutex;
use tokio::{
    sync::{Notify, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    orchestrator::UpdateOrchestrator,
    settings::{SettingChange, SettingsStore, Subscription},
};

/// Single-slot trigger queue.
///
/// At most one run is pending at any time. Triggers that arrive while one
/// is already pending are merged into it, and the merged run is forced if
/// any of them was.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    pending: Mutex<Option<bool>>,
    notify: Notify,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, force: bool) {
        {
            let mut pending = self.pending.lock();
            let merged = pending.unwrap_or(false) || force;
            if pending.is_some() {
                debug!(target: "bingwall::runtime", force = merged, "trigger coalesced");
            }
            *pending = Some(merged);
        }
        self.notify.notify_one();
    }

    /// Take the pending trigger, if any, without waiting.
    pub fn take(&self) -> Option<bool> {
        self.pending.lock().take()
    }

    /// Wait for the next trigger. Returns `None` once `shutdown` fires.
    pub async fn next(&self, shutdown: &CancellationToken) -> Option<bool> {
        loop {
            if let Some(force) = self.take() {
                return Some(force);
            }
            tokio::select! {
                _ = shutdown.cancelled() => return None,
                _ = self.notify.notified() => {}
            }
        }
    }
}

/// The running service. Dropping it without [`stop`](Self::stop) leaves the
/// tasks running until the runtime shuts down.
pub struct UpdateRuntime {
    store: Arc<dyn SettingsStore>,
    queue: Arc<TriggerQueue>,
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    subscriptions: Vec<Subscription>,
    completed: watch::Receiver<u64>,
}

impl fmt::Debug for UpdateRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRuntime")
            .field("tasks", &self.handles.len())
            .field("subscriptions", &self.subscriptions)
            .field("shutdown_cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl UpdateRuntime {
    /// Subscribe to preference changes, start the worker, and start the
    /// timer. The timer's first tick fires immediately, so a run is queued
    /// as soon as the service starts.
    pub fn start(
        orchestrator: UpdateOrchestrator,
        poll_interval: Duration,
    ) -> Self {
        let store = Arc::clone(orchestrator.store());
        let queue = Arc::new(TriggerQueue::new());
        let shutdown = CancellationToken::new();
        let (completed_tx, completed) = watch::channel(0u64);

        let subscriptions = keys::PREFERENCE_KEYS
            .iter()
            .map(|key| {
                let queue = Arc::clone(&queue);
                store.connect(
                    key,
                    Arc::new(move |change: &SettingChange| {
                        info!(
                            target: "bingwall::runtime",
                            key = %change.key,
                            value = ?change.value,
                            "preference changed, forcing update"
                        );
                        queue.push(true);
                    }),
                )
            })
            .collect::<Vec<_>>();

        let worker = tokio::spawn(worker_loop(
            orchestrator,
            Arc::clone(&queue),
            shutdown.clone(),
            completed_tx,
        ));
        let timer = tokio::spawn(timer_loop(
            poll_interval,
            Arc::clone(&queue),
            shutdown.clone(),
        ));

        info!(
            target: "bingwall::runtime",
            poll_interval = ?poll_interval,
            subscriptions = subscriptions.len(),
            "update runtime started"
        );

        Self {
            store,
            queue,
            shutdown,
            handles: vec![worker, timer],
            subscriptions,
            completed,
        }
    }

    /// Queue a run from outside the timer and subscriptions.
    pub fn trigger(&self, force: bool) {
        self.queue.push(force);
    }

    /// Number of runs finished so far, whatever their outcome.
    pub fn completed_runs(&self) -> watch::Receiver<u64> {
        self.completed.clone()
    }

    /// Disconnect every subscription, stop the tasks, and wait for them.
    ///
    /// A run already in progress is allowed to finish. The orchestrator,
    /// and with it the HTTP connection pool, is dropped before this returns.
    pub async fn stop(mut self) {
        for subscription in self.subscriptions.drain(..) {
            if !self.store.disconnect(&subscription) {
                warn!(
                    target: "bingwall::runtime",
                    %subscription,
                    "subscription was already disconnected"
                );
            }
        }

        self.shutdown.cancel();
        for handle in self.handles.drain(..) {
            if let Err(err) = handle.await {
                warn!(target: "bingwall::runtime", error = %err, "runtime task ended abnormally");
            }
        }
        info!(target: "bingwall::runtime", "update runtime stopped");
    }
}

async fn worker_loop(
    orchestrator: UpdateOrchestrator,
    queue: Arc<TriggerQueue>,
    shutdown: CancellationToken,
    completed: watch::Sender<u64>,
) {
    while let Some(force) = queue.next(&shutdown).await {
        orchestrator.run(force).await;
        completed.send_modify(|n| *n += 1);
    }
    debug!(target: "bingwall::runtime", "worker exiting");
}

async fn timer_loop(
    period: Duration,
    queue: Arc<TriggerQueue>,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => queue.push(false),
        }
    }
    debug!(target: "bingwall::runtime", "timer exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_triggers_merge_and_keep_force() {
        let queue = TriggerQueue::new();
        queue.push(false);
        queue.push(true);
        queue.push(false);
        assert_eq!(queue.take(), Some(true));
        assert_eq!(queue.take(), None);

        queue.push(false);
        assert_eq!(queue.take(), Some(false));
    }

    #[tokio::test]
    async fn next_wakes_for_push_and_stops_on_cancel() {
        let queue = Arc::new(TriggerQueue::new());
        let shutdown = CancellationToken::new();

        let pusher = Arc::clone(&queue);
        tokio::spawn(async move { pusher.push(true) });
        assert_eq!(queue.next(&shutdown).await, Some(true));

        shutdown.cancel();
        assert_eq!(queue.next(&shutdown).await, None);
    }
}
