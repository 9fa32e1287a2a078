//! Background worker that relays unpublished events from the store to a
//! publisher.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use catalog_core::clock::Clock;
use catalog_core::publisher::DomainEventPublisher;
use catalog_core::repository::EventStoreRepository;

/// Poll cadence used unless one is configured explicitly.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

struct Worker {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Periodically drains pending events from the store to a publisher.
///
/// Each tick processes the pending events in `occurred_on` order and halts
/// at the first failure; whatever remains is picked up again on the next
/// tick. Combined with idempotent publish marking this gives at-least-once
/// delivery without reordering.
pub struct PendingEventsPublisher {
    repository: Arc<dyn EventStoreRepository>,
    publisher: Arc<dyn DomainEventPublisher>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    worker: Mutex<Option<Worker>>,
}

impl PendingEventsPublisher {
    /// Creates a relay polling at [`DEFAULT_POLL_INTERVAL`].
    #[must_use]
    pub fn new(
        repository: Arc<dyn EventStoreRepository>,
        publisher: Arc<dyn DomainEventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_poll_interval(repository, publisher, clock, DEFAULT_POLL_INTERVAL)
    }

    /// Creates a relay polling at `poll_interval`.
    #[must_use]
    pub fn with_poll_interval(
        repository: Arc<dyn EventStoreRepository>,
        publisher: Arc<dyn DomainEventPublisher>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            repository,
            publisher,
            clock,
            poll_interval,
            worker: Mutex::new(None),
        }
    }

    /// Starts the polling loop. The first drain runs one full interval after
    /// the call. Starting an already running relay has no effect.
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return;
        }

        let repository = Arc::clone(&self.repository);
        let publisher = Arc::clone(&self.publisher);
        let clock = Arc::clone(&self.clock);
        let poll_interval = self.poll_interval;
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let first_tick = tokio::time::Instant::now() + poll_interval;
            let mut ticks = tokio::time::interval_at(first_tick, poll_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => {
                        tracing::debug!("pending events publisher stopped");
                        break;
                    }
                    _ = ticks.tick() => {
                        drain_pending_events(
                            repository.as_ref(),
                            publisher.as_ref(),
                            clock.as_ref(),
                        )
                        .await;
                    }
                }
            }
        });

        *worker = Some(Worker { stop_tx, task });
    }

    /// Stops the polling loop and waits for any in-flight drain to finish.
    /// Stopping an already stopped relay has no effect.
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        if let Some(Worker { stop_tx, task }) = worker.take() {
            let _ = stop_tx.send(());
            if task.await.is_err() {
                tracing::error!("pending events publisher task panicked");
            }
        }
    }

    /// Drains the current batch of pending events immediately, outside the
    /// polling schedule.
    pub async fn drain_once(&self) {
        drain_pending_events(
            self.repository.as_ref(),
            self.publisher.as_ref(),
            self.clock.as_ref(),
        )
        .await;
    }
}

async fn drain_pending_events(
    repository: &dyn EventStoreRepository,
    publisher: &dyn DomainEventPublisher,
    clock: &dyn Clock,
) {
    let pending = match repository.find_pending_events().await {
        Ok(pending) => pending,
        Err(error) => {
            tracing::warn!(%error, "failed to fetch pending events");
            return;
        }
    };
    if pending.is_empty() {
        return;
    }

    tracing::debug!(count = pending.len(), "draining pending events");
    for mut event in pending {
        if let Err(error) = publisher.publish(&event).await {
            tracing::warn!(%error, event_id = %event.event_id(), "failed to publish pending event");
            break;
        }
        event.mark_published(clock.now());
        if let Err(error) = repository.mark_as_published(&event).await {
            tracing::warn!(%error, event_id = %event.event_id(), "failed to mark event as published");
            break;
        }
        tracing::trace!(
            event_id = %event.event_id(),
            event_type = event.event_type(),
            "pending event published"
        );
    }
}
