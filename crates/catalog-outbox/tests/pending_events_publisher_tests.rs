//! Integration tests for `PendingEventsPublisher`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;
use catalog_core::repository::EventStoreRepository;
use catalog_event_store::memory_event_store::InMemoryEventStore;
use catalog_outbox::pending_events_publisher::PendingEventsPublisher;
use catalog_test_support::{FailingEventStore, FixedClock, RecordingEventPublisher};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Helper to build an unpublished `DomainEvent` with a controlled timestamp.
fn make_event(aggregate_id: Uuid, occurred_on: DateTime<Utc>) -> DomainEvent {
    DomainEvent::reconstruct(
        Uuid::new_v4(),
        aggregate_id,
        "Review".to_string(),
        "Created".to_string(),
        serde_json::json!({}),
        occurred_on,
        None,
    )
}

/// Store wrapper whose `mark_as_published` always fails.
struct MarkFailingStore {
    inner: InMemoryEventStore,
}

#[async_trait]
impl EventStoreRepository for MarkFailingStore {
    async fn load_history(
        &self,
        aggregate_id: Uuid,
        aggregate_type: &str,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        self.inner.load_history(aggregate_id, aggregate_type).await
    }

    async fn append_events(&self, events: &[DomainEvent]) -> Result<(), DomainError> {
        self.inner.append_events(events).await
    }

    async fn find_pending_events(&self) -> Result<Vec<DomainEvent>, DomainError> {
        self.inner.find_pending_events().await
    }

    async fn mark_as_published(&self, _event: &DomainEvent) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("write timeout".into()))
    }
}

// --- draining ---

#[tokio::test]
async fn test_drain_publishes_in_occurred_on_order_and_marks_events() {
    // Arrange
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    let publish_time = base_time() + chrono::Duration::minutes(5);
    let aggregate_id = Uuid::new_v4();
    let first = make_event(aggregate_id, base_time());
    let second = make_event(aggregate_id, base_time() + chrono::Duration::seconds(1));
    let third = make_event(aggregate_id, base_time() + chrono::Duration::seconds(2));
    store
        .append_events(&[third.clone(), first.clone(), second.clone()])
        .await
        .unwrap();
    let relay = PendingEventsPublisher::new(
        Arc::clone(&store) as Arc<dyn EventStoreRepository>,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(publish_time)),
    );

    // Act
    relay.drain_once().await;

    // Assert
    assert_eq!(publisher.published_events(), vec![first, second, third]);
    assert!(store.find_pending_events().await.unwrap().is_empty());
    let history = store.load_history(aggregate_id, "Review").await.unwrap();
    assert!(
        history
            .iter()
            .all(|e| e.published_at() == Some(publish_time))
    );
}

#[tokio::test]
async fn test_drain_halts_at_the_first_publish_failure() {
    // Arrange
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    let aggregate_id = Uuid::new_v4();
    let first = make_event(aggregate_id, base_time());
    let second = make_event(aggregate_id, base_time() + chrono::Duration::seconds(1));
    let third = make_event(aggregate_id, base_time() + chrono::Duration::seconds(2));
    store
        .append_events(&[first.clone(), second.clone(), third.clone()])
        .await
        .unwrap();
    publisher.fail_event(second.event_id());
    let relay = PendingEventsPublisher::new(
        Arc::clone(&store) as Arc<dyn EventStoreRepository>,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time() + chrono::Duration::minutes(5))),
    );

    // Act
    relay.drain_once().await;

    // Assert: the failed event and everything after it stay pending.
    assert_eq!(publisher.published_events(), vec![first.clone()]);
    assert_eq!(
        publisher.attempted_event_ids(),
        vec![first.event_id(), second.event_id()]
    );
    assert_eq!(
        store.find_pending_events().await.unwrap(),
        vec![second.clone(), third.clone()]
    );

    // Act: the next drain retries in the original order.
    publisher.clear_failures();
    relay.drain_once().await;

    // Assert
    assert_eq!(publisher.published_events(), vec![first, second, third]);
    assert!(store.find_pending_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_drain_halts_when_marking_fails() {
    // Arrange
    let inner = InMemoryEventStore::new();
    let store = Arc::new(MarkFailingStore {
        inner: inner.clone(),
    });
    let publisher = Arc::new(RecordingEventPublisher::new());
    let aggregate_id = Uuid::new_v4();
    let first = make_event(aggregate_id, base_time());
    let second = make_event(aggregate_id, base_time() + chrono::Duration::seconds(1));
    inner
        .append_events(&[first.clone(), second.clone()])
        .await
        .unwrap();
    let relay = PendingEventsPublisher::new(
        store,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time() + chrono::Duration::minutes(5))),
    );

    // Act
    relay.drain_once().await;

    // Assert: the first event went out but stays pending for a retry.
    assert_eq!(publisher.attempted_event_ids(), vec![first.event_id()]);
    assert_eq!(
        inner.find_pending_events().await.unwrap(),
        vec![first, second]
    );
}

#[tokio::test]
async fn test_drain_survives_a_fetch_failure() {
    // Arrange
    let publisher = Arc::new(RecordingEventPublisher::new());
    let relay = PendingEventsPublisher::new(
        Arc::new(FailingEventStore),
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time())),
    );

    // Act
    relay.drain_once().await;

    // Assert
    assert!(publisher.attempted_event_ids().is_empty());
}

// --- polling lifecycle ---

#[tokio::test(start_paused = true)]
async fn test_start_runs_the_first_drain_after_one_full_interval() {
    // Arrange
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    store
        .append_events(&[make_event(Uuid::new_v4(), base_time())])
        .await
        .unwrap();
    let relay = PendingEventsPublisher::with_poll_interval(
        Arc::clone(&store) as Arc<dyn EventStoreRepository>,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time())),
        Duration::from_secs(5),
    );

    // Act
    relay.start().await;
    tokio::time::sleep(Duration::from_secs(4)).await;

    // Assert: nothing before the first interval elapses.
    assert!(publisher.attempted_event_ids().is_empty());

    // Act
    tokio::time::sleep(Duration::from_secs(2)).await;

    // Assert
    assert_eq!(publisher.attempted_event_ids().len(), 1);

    relay.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_keeps_a_single_worker() {
    // Arrange
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    store
        .append_events(&[make_event(Uuid::new_v4(), base_time())])
        .await
        .unwrap();
    let relay = PendingEventsPublisher::with_poll_interval(
        Arc::clone(&store) as Arc<dyn EventStoreRepository>,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time())),
        Duration::from_secs(5),
    );

    // Act
    relay.start().await;
    relay.start().await;
    tokio::time::sleep(Duration::from_secs(6)).await;

    // Assert: one worker, one delivery attempt.
    assert_eq!(publisher.attempted_event_ids().len(), 1);

    relay.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_drains() {
    // Arrange
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    store
        .append_events(&[make_event(Uuid::new_v4(), base_time())])
        .await
        .unwrap();
    let relay = PendingEventsPublisher::with_poll_interval(
        Arc::clone(&store) as Arc<dyn EventStoreRepository>,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time())),
        Duration::from_secs(5),
    );

    // Act
    relay.start().await;
    relay.stop().await;
    tokio::time::sleep(Duration::from_secs(20)).await;

    // Assert
    assert!(publisher.attempted_event_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_twice_is_harmless() {
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    let relay = PendingEventsPublisher::with_poll_interval(
        Arc::clone(&store) as Arc<dyn EventStoreRepository>,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time())),
        Duration::from_secs(5),
    );

    relay.start().await;
    relay.stop().await;
    relay.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_restart_resumes_polling() {
    // Arrange
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    let first = make_event(Uuid::new_v4(), base_time());
    store.append_events(&[first.clone()]).await.unwrap();
    let relay = PendingEventsPublisher::with_poll_interval(
        Arc::clone(&store) as Arc<dyn EventStoreRepository>,
        Arc::clone(&publisher) as Arc<dyn catalog_core::publisher::DomainEventPublisher>,
        Arc::new(FixedClock(base_time())),
        Duration::from_secs(5),
    );

    // Act
    relay.start().await;
    tokio::time::sleep(Duration::from_secs(6)).await;
    relay.stop().await;

    let second = make_event(Uuid::new_v4(), base_time() + chrono::Duration::minutes(1));
    store.append_events(&[second.clone()]).await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;

    // Assert: nothing happens while stopped.
    assert_eq!(publisher.published_events(), vec![first.clone()]);

    // Act
    relay.start().await;
    tokio::time::sleep(Duration::from_secs(6)).await;

    // Assert
    assert_eq!(publisher.published_events(), vec![first, second]);

    relay.stop().await;
}
